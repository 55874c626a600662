//! npsites library
//!
//! Exposes the cache, data clients and session for the binary and for
//! integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod ui;
