//! progen CLI library.
//!
//! The command implementations live here so they can be exercised by
//! tests; the binary in `main.rs` only parses arguments and dispatches.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod commands;
