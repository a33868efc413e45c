//! # syster-session
//!
//! Semantic model lifecycle and capability-request coordination for the
//! Syster language server.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! server    → Session, request coordinator, diagnostics, progress
//!   ↓
//! ide       → Capability handlers (completion, hover, goto-def, ...)
//!   ↓
//! workspace → Root resolution, deferred changes, buffer mirror
//!   ↓
//! model     → Immutable Model snapshots and the builder
//!   ↓
//! project   → Library loading from disk
//!   ↓
//! engine    → LanguageEngine boundary, structural engine, lexer
//!   ↓
//! core      → Cell / CombinedCell, text utilities
//!   ↓
//! base      → Primitives (Position, Span, LineIndex, constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → core → engine → project → model → ide → server)
// ============================================================================

/// Foundation types: Position, Span, LineIndex
pub mod base;

/// Observable value cells and text helpers
pub mod core;

/// Language engine boundary and the built-in structural engine
pub mod engine;

/// Library loading
pub mod project;

/// Semantic model snapshots
pub mod model;

/// Workspace root, buffer mirror, deferred changes
pub mod workspace;

/// Client configuration and session options
pub mod config;

/// IDE features: completion, hover, goto-definition, formatting, symbols
pub mod ide;

/// Session: event loop, request coordination, diagnostics
pub mod server;

// Re-export commonly needed items
pub use base::{LineIndex, Position, Span, TextRange, TextSize};
pub use config::{ClientConfiguration, SessionOptions};
pub use engine::{LanguageEngine, StructuralEngine};
pub use ide::Capability;
pub use model::Model;
pub use server::{Client, Session, SessionEvent, SessionHandle};
pub use workspace::BufferChange;
