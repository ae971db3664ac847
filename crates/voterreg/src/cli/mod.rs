//! CLI module for the voter-registration portal
//!
//! Operator utilities over record files and the local draft slot. Nothing
//! here talks to a hosted backend; `rehearse` runs against the in-process one.

pub mod config;
pub mod draft;
pub mod error;
pub mod fingerprint;
pub mod input;
pub mod rehearse;
pub mod resolve;
pub mod sample;
pub mod validate;
