//! Library wrapper around the `srg` CLI implementation.
//!
//! Compiling the binary crate root (`main.rs`) as a module lets
//! `cargo test -p srg-cli --lib` typecheck the CLI without building the
//! integration tests.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
