// Storage library for the WOPI document host
// Exposes the FileStorage capability trait and its FTP-backed adapter

pub mod config;
pub mod errors;
pub mod storage;
pub mod telemetry;
