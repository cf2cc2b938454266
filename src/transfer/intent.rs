//! Transfer intents
//!
//! A STOR request is resolved against the target's existence into one of four
//! operations before any data moves.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::fs::{File, OpenOptions};

use crate::error::ProtocolError;

/// Mode token given to STOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    New,
    Old,
    Append,
}

impl FromStr for StoreMode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NEW" => Ok(StoreMode::New),
            "OLD" => Ok(StoreMode::Old),
            "APP" => Ok(StoreMode::Append),
            _ => Err(ProtocolError::InvalidArguments("Invalid type, STOR aborted")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Create,
    NewGeneration,
    Overwrite,
    Append,
}

impl StoreOperation {
    pub fn resolve(mode: StoreMode, exists: bool) -> Self {
        match (mode, exists) {
            (_, false) => StoreOperation::Create,
            (StoreMode::New, true) => StoreOperation::NewGeneration,
            (StoreMode::Old, true) => StoreOperation::Overwrite,
            (StoreMode::Append, true) => StoreOperation::Append,
        }
    }

    /// Text of the SUCCESS response announcing the operation.
    pub fn announcement(self, mode: StoreMode) -> &'static str {
        match (self, mode) {
            (StoreOperation::NewGeneration, _) => "File exists, will create new generation of file",
            (StoreOperation::Overwrite, _) => "Will write over old file",
            (StoreOperation::Append, _) => "Will append to file",
            (StoreOperation::Create, StoreMode::New) => "File does not exist, will create new file",
            (StoreOperation::Create, StoreMode::Old) => "Will create new file",
            (StoreOperation::Create, StoreMode::Append) => "Will create file",
        }
    }

    pub fn open_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            StoreOperation::Append => options.append(true).create(true),
            StoreOperation::Create | StoreOperation::Overwrite => {
                options.write(true).create(true).truncate(true)
            }
            StoreOperation::NewGeneration => options.write(true).create_new(true),
        };
        options
    }
}

/// Upper bound on generation names skipped because another session took them
/// between settling and opening.
const MAX_OPEN_ATTEMPTS: usize = 32;

/// Everything needed to carry out one STOR once the client sends its size.
#[derive(Debug, Clone)]
pub struct TransferIntent {
    /// Name as requested by the client, relative to the current directory.
    pub filename: String,
    pub path: PathBuf,
    pub operation: StoreOperation,
    requested: PathBuf,
}

impl TransferIntent {
    pub fn new(filename: impl Into<String>, path: PathBuf, operation: StoreOperation) -> Self {
        Self {
            filename: filename.into(),
            requested: path.clone(),
            path,
            operation,
        }
    }

    /// Picks the first free generation name when the operation calls for one.
    ///
    /// Returns the name to report to the client and updates the target path.
    pub async fn settle_target(&mut self) -> io::Result<String> {
        if self.operation != StoreOperation::NewGeneration {
            return Ok(self.filename.clone());
        }

        let file_name = self
            .requested
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = self
            .requested
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut generation = 1u64;
        loop {
            let candidate = generation_name(&file_name, generation);
            let candidate_path = dir.join(&candidate);
            if !tokio::fs::try_exists(&candidate_path).await? {
                self.path = candidate_path;
                return Ok(match self.filename.rsplit_once('/') {
                    Some((prefix, _)) => format!("{prefix}/{candidate}"),
                    None => candidate,
                });
            }
            generation += 1;
        }
    }

    /// Settles the target and opens it for writing.
    ///
    /// A generation name created by a concurrent STOR after settling is
    /// skipped and the next free one is tried.
    pub async fn open_target(&mut self) -> io::Result<(String, File)> {
        let mut attempts = 1;
        loop {
            let name = self.settle_target().await?;
            match self.operation.open_options().open(&self.path).await {
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists
                        && attempts < MAX_OPEN_ATTEMPTS =>
                {
                    attempts += 1;
                }
                result => return result.map(|file| (name, file)),
            }
        }
    }
}

/// `report.txt` becomes `report(n).txt`; names without an extension get the
/// suffix appended.
pub fn generation_name(file_name: &str, generation: u64) -> String {
    match file_name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => format!("{base}({generation}).{ext}"),
        _ => format!("{file_name}({generation})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_operation_table() {
        use StoreOperation::{Create, NewGeneration, Overwrite};
        assert_eq!(StoreOperation::resolve(StoreMode::New, true), NewGeneration);
        assert_eq!(StoreOperation::resolve(StoreMode::New, false), Create);
        assert_eq!(StoreOperation::resolve(StoreMode::Old, true), Overwrite);
        assert_eq!(StoreOperation::resolve(StoreMode::Old, false), Create);
        assert_eq!(
            StoreOperation::resolve(StoreMode::Append, true),
            StoreOperation::Append
        );
        assert_eq!(StoreOperation::resolve(StoreMode::Append, false), Create);
    }

    #[test]
    fn generation_names() {
        assert_eq!(generation_name("report.txt", 1), "report(1).txt");
        assert_eq!(generation_name("archive.tar.gz", 3), "archive.tar(3).gz");
        assert_eq!(generation_name("README", 2), "README(2)");
        assert_eq!(generation_name(".profile", 1), ".profile(1)");
    }

    #[tokio::test]
    async fn settles_on_first_free_generation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.txt"), b"v0").unwrap();
        std::fs::write(dir.path().join("report(1).txt"), b"v1").unwrap();

        let mut intent = TransferIntent::new(
            "sub/report.txt",
            dir.path().join("report.txt"),
            StoreOperation::NewGeneration,
        );
        let name = intent.settle_target().await.unwrap();
        assert_eq!(name, "sub/report(2).txt");
        assert_eq!(intent.path, dir.path().join("report(2).txt"));

        std::fs::write(dir.path().join("report(2).txt"), b"v2").unwrap();
        assert_eq!(intent.settle_target().await.unwrap(), "sub/report(3).txt");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_generations_get_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.txt"), b"v0").unwrap();
        let intent = TransferIntent::new(
            "log.txt",
            dir.path().join("log.txt"),
            StoreOperation::NewGeneration,
        );

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let mut intent = intent.clone();
                tokio::spawn(async move { intent.open_target().await.map(|(name, _)| name) })
            })
            .collect();

        let mut names = Vec::new();
        for task in tasks {
            names.push(task.await.unwrap().unwrap());
        }
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 8);
        assert!(dir.path().join("log(8).txt").exists());
    }

    #[tokio::test]
    async fn other_operations_keep_their_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut intent = TransferIntent::new(
            "notes.txt",
            dir.path().join("notes.txt"),
            StoreOperation::Overwrite,
        );
        assert_eq!(intent.settle_target().await.unwrap(), "notes.txt");
        assert_eq!(intent.path, dir.path().join("notes.txt"));

        let (name, _file) = intent.open_target().await.unwrap();
        assert_eq!(name, "notes.txt");
        assert!(dir.path().join("notes.txt").is_file());
    }
}
