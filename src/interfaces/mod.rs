pub mod services;
pub mod storage;
