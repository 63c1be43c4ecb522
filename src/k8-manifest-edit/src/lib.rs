mod error;
mod image;
mod metadata;
mod stream;

pub use error::EditError;
pub use image::ImageRetarget;
pub use image::retarget_images;
pub use metadata::add_labels;
pub use metadata::strip_finalizers;
pub use stream::read_documents;
pub use stream::split_documents;
pub use stream::write_documents;
pub use stream::write_split;
