use std::fmt;
use std::io::Error as IoError;
use std::path::PathBuf;

use serde_yaml::Error as SerdeYamlError;
use thiserror::Error;

/// document a parse error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Schema,
    Manifest,
    Config,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Manifest => write!(f, "manifest"),
            Self::Config => write!(f, "config"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Yaml error in {document}: {source}")]
    ParseError {
        document: Document,
        #[source]
        source: SerdeYamlError,
    },
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("More than one manifest found: {0:?}")]
    AmbiguousManifest(Vec<PathBuf>),
}

impl SyncError {
    pub fn parse(document: Document, source: SerdeYamlError) -> Self {
        Self::ParseError { document, source }
    }
}
