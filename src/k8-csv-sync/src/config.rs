use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::Document;
use crate::SyncError;

pub const DEFAULT_VERSION: &str = "v1";
pub const PLACEHOLDER_KIND: &str = "CustomResource";
pub const PLACEHOLDER_DESCRIPTION: &str = "Description required: fill in manually";

/// defaults applied when the schema leaves something out
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SyncConfig {
    /// version written to owned records when the schema declares none
    pub default_version: String,
    /// kind of a newly appended owned record when the schema declares none
    pub placeholder_kind: String,
    /// description of a newly appended owned record
    pub placeholder_description: String,
    /// set status descriptors on newly appended owned records
    pub insert_status_descriptors: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_version: DEFAULT_VERSION.to_owned(),
            placeholder_kind: PLACEHOLDER_KIND.to_owned(),
            placeholder_description: PLACEHOLDER_DESCRIPTION.to_owned(),
            insert_status_descriptors: true,
        }
    }
}

impl SyncConfig {
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, SyncError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => SyncError::MissingInput(path.to_path_buf()),
            _ => SyncError::IoError(err),
        })?;
        serde_yaml::from_reader(file).map_err(|err| SyncError::parse(Document::Config, err))
    }
}
