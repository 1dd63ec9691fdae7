pub mod access;
pub mod category;
pub mod error;
pub mod file;
pub mod pagination;
pub mod post;
pub mod session;
pub mod slug;
pub mod tags;
