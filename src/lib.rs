pub mod app;
pub mod config;
pub mod shared;
pub mod storage;
pub mod submit;
pub mod validation;
pub mod wizard;
