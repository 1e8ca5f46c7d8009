// fintrack - typed client for a personal finance tracking API
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
