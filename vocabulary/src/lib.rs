//! Vocabulary library
//!
//! Offline cache of bilingual vocabularies kept in step with a remote
//! server, plus the headless state the presentation layer drives.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod services;
