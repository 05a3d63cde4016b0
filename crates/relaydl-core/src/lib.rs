pub mod config;
pub mod logging;

pub mod checksum;
pub mod downloader;
pub mod error;
pub mod format;
pub mod http;
pub mod lookup;
pub mod relay;
pub mod retry;
pub mod session;
pub mod storage;
pub mod transport;
pub mod url_model;
