//! Library wrapper around the `jpath` CLI implementation.
//!
//! The CLI is exercised through its binary and the integration tests; compiling
//! `main.rs` as a module here lets `cargo test -p jpath-cli --lib` typecheck it
//! without building the binary test suite.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
