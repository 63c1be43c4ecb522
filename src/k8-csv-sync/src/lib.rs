mod config;
mod descriptors;
mod document;
mod error;
mod sync;

pub use config::SyncConfig;
pub use descriptors::derive_descriptors;
pub use descriptors::Curation;
pub use document::locate_manifest;
pub use document::sync_files;
pub use document::synchronize_documents;
pub use document::SyncOutcome;
pub use error::Document;
pub use error::SyncError;
pub use sync::synchronize;
