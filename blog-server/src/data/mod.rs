pub mod category_repository;
pub mod document;
pub mod post_repository;
pub mod store;
