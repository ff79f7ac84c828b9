//! Ezzifly: flight booking client with an offline demo mode.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod profile;
pub mod search;
pub mod session;
pub mod storage;
pub mod wizard;

pub use error::{Error, Result};
