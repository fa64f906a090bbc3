// ABOUTME: Library root for cipherdesk — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod backend;
pub mod cipher;
pub mod config;
pub mod console;
pub mod history;
pub mod logfmt;
pub mod protocol;
pub mod worker;
