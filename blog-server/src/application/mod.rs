pub mod access_service;
pub mod ai_service;
pub mod category_service;
pub mod post_service;
pub mod upload_service;
pub mod video_service;
