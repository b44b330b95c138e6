pub mod from_url;
pub mod media;
pub mod upload_url;
