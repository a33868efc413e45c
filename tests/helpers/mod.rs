//! Shared test helpers.

#![allow(dead_code)]

pub mod recording_client;
pub mod source_fixtures;
pub mod session_helpers;
