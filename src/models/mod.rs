// Data models module
pub mod credentials;
pub mod session;
pub mod video;
