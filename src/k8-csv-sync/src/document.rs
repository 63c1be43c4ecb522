use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;
use tracing::info;

use k8_olm_types::ClusterServiceVersion;
use k8_olm_types::CustomResourceDefinition;

use crate::synchronize;
use crate::Document;
use crate::SyncConfig;
use crate::SyncError;

pub const CSV_SUFFIX: &str = ".clusterserviceversion.yaml";
const MANIFESTS_DIR: &str = "manifests";

#[derive(Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// nothing to do, manifest stays as it was
    Unchanged,
    /// serialized manifest
    Updated(String),
}

/// parse a document, `None` when it is empty at the top level
fn parse<T: DeserializeOwned>(text: &str, document: Document) -> Result<Option<T>, SyncError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: Value =
        serde_yaml::from_str(text).map_err(|err| SyncError::parse(document, err))?;
    if value.is_null() {
        return Ok(None);
    }
    serde_yaml::from_value(value)
        .map(Some)
        .map_err(|err| SyncError::parse(document, err))
}

/// Synchronize the manifest text against the schema text.
/// Either document being empty is not an error, the manifest is left untouched.
pub fn synchronize_documents(
    schema: &str,
    manifest: &str,
    config: &SyncConfig,
) -> Result<SyncOutcome, SyncError> {
    let crd: CustomResourceDefinition = match parse(schema, Document::Schema)? {
        Some(crd) => crd,
        None => {
            info!("schema is empty, skipping");
            return Ok(SyncOutcome::Unchanged);
        }
    };
    let csv: ClusterServiceVersion = match parse(manifest, Document::Manifest)? {
        Some(csv) => csv,
        None => {
            info!("manifest is empty, skipping");
            return Ok(SyncOutcome::Unchanged);
        }
    };

    if crd.declared_name().is_none() {
        info!("schema has no metadata.name, skipping");
        return Ok(SyncOutcome::Unchanged);
    }

    let csv = synchronize(&crd, csv, config);
    let text = serde_yaml::to_string(&csv).map_err(|err| SyncError::parse(Document::Manifest, err))?;
    Ok(SyncOutcome::Updated(text))
}

fn read_input(path: &Path) -> Result<String, SyncError> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => SyncError::MissingInput(path.to_path_buf()),
        _ => SyncError::IoError(err),
    })
}

/// Synchronize manifest file against schema file, rewriting the manifest in place.
/// Returns true if the manifest was written.
pub fn sync_files<S, M>(schema_path: S, manifest_path: M, config: &SyncConfig) -> Result<bool, SyncError>
where
    S: AsRef<Path>,
    M: AsRef<Path>,
{
    let schema_path = schema_path.as_ref();
    let manifest_path = manifest_path.as_ref();
    debug!(schema = %schema_path.display(), manifest = %manifest_path.display(), "reading");

    let schema = read_input(schema_path)?;
    let manifest = read_input(manifest_path)?;

    match synchronize_documents(&schema, &manifest, config)? {
        SyncOutcome::Unchanged => Ok(false),
        SyncOutcome::Updated(text) => {
            fs::write(manifest_path, text)?;
            info!(manifest = %manifest_path.display(), "manifest updated");
            Ok(true)
        }
    }
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.ends_with(CSV_SUFFIX));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// find the ClusterServiceVersion of a bundle version,
/// looks in `<bundle_dir>/<version>` and `<bundle_dir>/<version>/manifests`
pub fn locate_manifest<P: AsRef<Path>>(bundle_dir: P, version: &str) -> Result<PathBuf, SyncError> {
    let version_dir = bundle_dir.as_ref().join(version);

    let mut found = csv_files(&version_dir)?;
    found.extend(csv_files(&version_dir.join(MANIFESTS_DIR))?);

    match found.len() {
        0 => Err(SyncError::MissingInput(version_dir)),
        1 => Ok(found.remove(0)),
        _ => Err(SyncError::AmbiguousManifest(found)),
    }
}
