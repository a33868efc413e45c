//! Foundation types for the session layer.
//!
//! - [`Position`], [`Span`] - Line/column positions (LSP shaped)
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - Domain constants (file extensions, notification prefixes, delays)
//!
//! This module has NO dependencies on other crate modules.

pub mod constants;
mod position;

pub use position::{LineIndex, Position, Span};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
