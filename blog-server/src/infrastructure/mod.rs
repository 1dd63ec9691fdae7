pub mod ai;
pub mod analytics;
pub mod appwrite;
pub mod config;
pub mod logging;
pub mod memory;
pub mod youtube;
