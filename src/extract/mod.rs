//! Extraction of match fields and image URLs from catalog responses.

mod attributes;
mod images;

pub use attributes::{extract_album, extract_artist};
pub use images::{extract_images, image_path, PRIMARY_CATEGORY};
