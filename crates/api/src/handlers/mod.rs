pub mod logs;
pub mod preferences;
pub mod push;
pub mod subscription;
