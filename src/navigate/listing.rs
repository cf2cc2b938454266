//! Directory listings for LIST
//!
//! The first line is the listed directory's virtual path; each entry
//! follows on its own line. Every line ends with CRLF.

use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use log::info;

use crate::error::{ProtocolError, StorageError};
use crate::storage::FsMetadata;

const TIMESTAMP_FORMAT: &str = "%Y.%m.%d AD at %H:%M:%S %:z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// `F`: names only
    Brief,
    /// `V`: modification time, owner and size for files
    Verbose,
}

impl FromStr for ListFormat {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "F" => Ok(ListFormat::Brief),
            "V" => Ok(ListFormat::Verbose),
            _ => Err(ProtocolError::InvalidArguments("Invalid Mode")),
        }
    }
}

/// Renders the listing of `real_path`, shown to the client as `virtual_path`.
pub async fn list_directory(
    real_path: &Path,
    virtual_path: &str,
    format: ListFormat,
    fs: &dyn FsMetadata,
) -> Result<String, StorageError> {
    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(real_path)
        .await
        .map_err(StorageError::Listing)?;
    while let Some(entry) = dir.next_entry().await.map_err(StorageError::Listing)? {
        let metadata = entry.metadata().await.map_err(StorageError::Listing)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, metadata));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut listing = format!("{virtual_path}\r\n");
    for (name, metadata) in &entries {
        if metadata.is_dir() {
            listing.push_str(&format!("{name}/\r\n"));
        } else if format == ListFormat::Brief {
            listing.push_str(&format!("{name}\r\n"));
        } else {
            let modified = metadata.modified().map_err(StorageError::Listing)?;
            listing.push_str(&format!(
                "{} {} {} {}\r\n",
                format_timestamp(modified),
                fs.owner_name(metadata),
                metadata.len(),
                name
            ));
        }
    }

    info!(
        "Listed directory {} (real: {}) - {} entries",
        virtual_path,
        real_path.display(),
        entries.len()
    );
    Ok(listing)
}

fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::Metadata;
    use std::io;

    struct FixedOwner;

    impl FsMetadata for FixedOwner {
        fn available_space(&self, _dir: &Path) -> io::Result<u64> {
            Ok(0)
        }

        fn owner_name(&self, _metadata: &Metadata) -> String {
            "tester".to_string()
        }
    }

    fn populated() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"12345").unwrap();
        std::fs::write(dir.path().join("a file.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        dir
    }

    #[tokio::test]
    async fn brief_listing_marks_directories() {
        let dir = populated();
        let listing = list_directory(dir.path(), "/", ListFormat::Brief, &FixedOwner)
            .await
            .unwrap();
        assert_eq!(listing, "/\r\na file.txt\r\nb.txt\r\nsub/\r\n");
    }

    #[tokio::test]
    async fn verbose_listing_has_owner_and_size() {
        let dir = populated();
        let listing = list_directory(dir.path(), "/docs", ListFormat::Verbose, &FixedOwner)
            .await
            .unwrap();
        let lines: Vec<&str> = listing.split("\r\n").collect();
        assert_eq!(lines[0], "/docs");
        assert!(lines[1].ends_with(" tester 0 a file.txt"));
        assert!(lines[2].ends_with(" tester 5 b.txt"));
        assert_eq!(lines[3], "sub/");
        assert_eq!(lines[4], "");
    }

    #[tokio::test]
    async fn missing_directory_is_a_listing_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_directory(&dir.path().join("gone"), "/gone", ListFormat::Brief, &FixedOwner)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Listing(_)));
    }

    #[test]
    fn parses_format_letters() {
        assert_eq!("f".parse::<ListFormat>().unwrap(), ListFormat::Brief);
        assert_eq!("V".parse::<ListFormat>().unwrap(), ListFormat::Verbose);
        assert!("X".parse::<ListFormat>().is_err());
    }
}
