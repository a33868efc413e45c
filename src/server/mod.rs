//! Session plumbing: inbound events, capability requests, diagnostics and
//! progress.
//!
//! ```text
//! SessionEvent ─▶ Session ─▶ Cell<Model> ─┐
//!                    │                    ├─▶ CombinedCell ─▶ RequestCoordinator ◀─ requests
//!                    └─▶ Cell<ClientConfiguration>
//! ```

mod client;
mod coordinator;
mod diagnostics;
mod error;
mod janitor;
mod notification;
mod progress;
mod session;

pub use client::{Client, Diagnostic, PublishDiagnostics};
pub use coordinator::RequestCoordinator;
pub use diagnostics::DiagnosticPublisher;
pub use error::{RequestError, SessionError};
pub use janitor::StaleDiagnosticJanitor;
pub use notification::TextNotification;
pub use progress::{ProgressEvent, ProgressGuard, ProgressKind, ProgressReporter, ProgressToken};
pub use session::{Session, SessionEvent, SessionHandle};
