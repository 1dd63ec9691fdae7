pub mod category;
pub mod media;
pub mod post;
pub mod upload;
