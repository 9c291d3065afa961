pub mod image_source;
pub mod repositories;
