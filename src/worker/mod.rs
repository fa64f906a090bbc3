// ABOUTME: Worker module — the child-process run loops behind the hidden subcommands.
// ABOUTME: The cipher worker answers line requests; the log worker appends records to a file.

pub mod cipher;
pub mod log;
