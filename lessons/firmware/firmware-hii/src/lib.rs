//! # HII Data Formats
//!
//! Host-testable pieces of the Human Interface Infrastructure used by the
//! HII lessons:
//!
//! * [`hex`]: the hex payload encodings of configuration strings.
//! * [`config`]: configuration request builders, element parsing and the
//!   console rendering of responses.
//! * [`keyword`]: `ProgressErr` bits of the keyword handler.
//! * [`package`]: exported package lists and their packages.
//! * [`strings`]: string packages, built and read back.

#![cfg_attr(not(any(test, doctest)), no_std)]
extern crate alloc;

pub mod config;
pub mod hex;
pub mod keyword;
pub mod package;
pub mod strings;
