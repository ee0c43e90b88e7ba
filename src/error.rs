use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The resolved path could not be opened or read.
    #[error("failed to read {}", path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A line that is neither blank, a comment, nor a section header lacks a `name=value` shape.
    ///
    /// `path` is the file actually read. When an environment override redirected a bare name,
    /// this is the override's value rather than the requested name.
    #[error("unknown value in file {} in line {line}", path.display())]
    MalformedLine { path: PathBuf, line: usize },
}

impl ParseError {
    /// The file the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match *self {
            Self::ReadFailure { ref path, .. } | Self::MalformedLine { ref path, .. } => path,
        }
    }

    /// 1-based line number for malformed lines.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match *self {
            Self::MalformedLine { line, .. } => Some(line),
            Self::ReadFailure { .. } => None,
        }
    }
}
