// src/lib.rs

//! Allsect site functions library
//!
//! Event-triggered handlers behind the Allsect recipe and blog site: search
//! indexing of published content, news collection and notification,
//! comments and database backups.

pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
