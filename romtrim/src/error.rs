use std::path::PathBuf;

use romtrim_format::TrimError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot read metadata for `{}`", .path.display())]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open file `{}`", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot open archive `{}`", .path.display())]
    OpenArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Cannot read entry {index} in archive `{}`", .path.display())]
    EntryAt {
        path: PathBuf,
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Cannot read archive entry `{name}`")]
    ReadEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write archive entry `{name}`")]
    WriteEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot rewrite archive `{}`", .path.display())]
    RewriteArchive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Cannot replace archive `{}`", .path.display())]
    ReplaceArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot process directory entry")]
    ProcessDirEntry {
        #[source]
        source: jwalk::Error,
    },

    #[error("Cannot trim `{filename}`")]
    Trim {
        filename: String,
        #[source]
        source: TrimError,
    },

    #[error("Cannot restore modification time for `{}`", .path.display())]
    RestoreModified {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
