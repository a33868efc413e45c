//! The session: single writer of the model and configuration cells.
//!
//! All inbound events go through [`Session::handle`], one at a time and in
//! arrival order. [`Session::spawn`] runs the same loop as a tokio task fed by
//! a channel; capability requests skip the channel and go straight to the
//! shared [`RequestCoordinator`], which answers them against immutable
//! snapshots.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::client::Client;
use super::coordinator::RequestCoordinator;
use super::diagnostics::DiagnosticPublisher;
use super::error::{RequestError, SessionError};
use super::janitor::StaleDiagnosticJanitor;
use super::notification::TextNotification;
use super::progress::{ProgressKind, ProgressReporter};
use crate::base::constants::BUILD_PROGRESS_TITLE;
use crate::config::{ClientConfiguration, SessionOptions};
use crate::core::{Cell, CombinedCell};
use crate::engine::LanguageEngine;
use crate::ide::{Capability, CapabilityHandler, default_handlers};
use crate::model::{Model, ModelBuilder};
use crate::project::LibraryLoader;
use crate::workspace::{
    Announcement, BufferChange, BufferSet, DeferredChangeQueue, RootResolver, WorkspaceRoot,
};

/// An inbound notification from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Buffer(BufferChange),
    /// The host says settings changed; the session asks for them.
    ConfigurationChanged,
    /// The host's answer to the configuration request.
    ConfigurationReceived(Value),
    /// A custom plain-text notification.
    Text(String),
    /// One-shot library root, consumed before the first rebuild.
    LibraryRoot(PathBuf),
}

pub struct Session {
    options: SessionOptions,
    client: Arc<dyn Client>,
    root: RootResolver,
    deferred: DeferredChangeQueue,
    buffers: BufferSet,
    builder: ModelBuilder,
    library_consumed: bool,
    model: Arc<Cell<Model>>,
    config: Arc<Cell<ClientConfiguration>>,
    combined: CombinedCell<Model, ClientConfiguration>,
    coordinator: RequestCoordinator,
    progress: ProgressReporter,
    publisher: DiagnosticPublisher,
    janitor: StaleDiagnosticJanitor,
}

impl Session {
    pub fn new(
        client: Arc<dyn Client>,
        engine: Arc<dyn LanguageEngine>,
        options: SessionOptions,
    ) -> Self {
        let model = Arc::new(Cell::new());
        let config = Arc::new(Cell::with_value(ClientConfiguration::default()));
        let combined = CombinedCell::new(&model, &config);

        let progress = ProgressReporter::new(Arc::clone(&client));
        let coordinator = RequestCoordinator::new(progress.clone());
        for (capability, handler) in default_handlers() {
            coordinator.register(capability, handler);
        }
        coordinator.attach(&combined);

        let janitor = StaleDiagnosticJanitor::new(Arc::clone(&client), Arc::clone(&model), &options);
        let library_path = options.library_path.clone();

        let mut session = Self {
            publisher: DiagnosticPublisher::new(Arc::clone(&client)),
            builder: ModelBuilder::new(engine),
            root: RootResolver::new(),
            deferred: DeferredChangeQueue::new(),
            buffers: BufferSet::new(),
            library_consumed: false,
            options,
            client,
            model,
            config,
            combined,
            coordinator,
            progress,
            janitor,
        };

        if let Some(path) = library_path {
            if let Err(error) = session.library_root(path) {
                tracing::error!("failed to load library: {error}");
            }
        }
        session
    }

    /// Add or replace a capability handler.
    pub fn register(&self, capability: Capability, handler: Arc<dyn CapabilityHandler>) {
        self.coordinator.register(capability, handler);
    }

    /// Process one event. Errors concern that event only; the session keeps
    /// serving its last consistent state.
    pub fn handle(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::Buffer(change) => match self.apply_change(change) {
                Err(SessionError::RootNotYetKnown(change)) => {
                    self.deferred.enqueue(*change);
                    Ok(())
                }
                result => result,
            },
            SessionEvent::ConfigurationChanged => {
                self.client.request_configuration();
                Ok(())
            }
            SessionEvent::ConfigurationReceived(value) => {
                let config = ClientConfiguration::from_value(value)?;
                tracing::debug!("configuration replaced");
                self.config.replace(config);
                Ok(())
            }
            SessionEvent::Text(text) => self.handle_text(&text),
            SessionEvent::LibraryRoot(path) => self.library_root(path),
        }
    }

    fn apply_change(&mut self, change: BufferChange) -> Result<(), SessionError> {
        let Some(root) = self.root.get() else {
            return Err(SessionError::RootNotYetKnown(Box::new(change)));
        };
        let in_root = root.contains_uri(change.uri());
        if !in_root {
            tracing::trace!(uri = change.uri(), "buffer outside the workspace root; mirrored only");
        }

        self.buffers.apply(change)?;
        if in_root {
            self.rebuild()?;
        }
        Ok(())
    }

    fn handle_text(&mut self, text: &str) -> Result<(), SessionError> {
        match TextNotification::parse(text) {
            TextNotification::WorkspaceUri(path) => self.announce_root(&path),
            TextNotification::StrongFilesChanged(uris) => {
                tracing::info!(count = uris.len(), "files removed or renamed on disk");
                let rebuilt = self.rebuild();
                self.janitor.schedule_erase(uris);
                rebuilt
            }
            TextNotification::Unknown(text) => {
                tracing::warn!(text = %text, "ignoring unknown text notification");
                Ok(())
            }
        }
    }

    fn announce_root(&mut self, raw: &str) -> Result<(), SessionError> {
        match self.root.announce(WorkspaceRoot::parse(raw))? {
            Announcement::Repeat => Ok(()),
            Announcement::First => {
                let buffers = &mut self.buffers;
                let report = self.deferred.drain_into(|change| buffers.apply(change));
                tracing::debug!(
                    applied = report.applied,
                    failed = report.failed,
                    "deferred buffer events replayed"
                );
                self.rebuild()
            }
        }
    }

    fn library_root(&mut self, path: PathBuf) -> Result<(), SessionError> {
        if self.library_consumed {
            tracing::warn!(path = %path.display(), "library root already set; ignoring");
            return Ok(());
        }
        self.library_consumed = true;

        let loader = LibraryLoader::with_path(path).with_extensions(self.options.extensions.clone());
        let library = loader.load(self.builder.engine().as_ref())?;
        tracing::info!(documents = library.len(), "library loaded");
        self.builder.set_library(Arc::new(library));

        // Arrived after the first rebuild: the current model lacks the library.
        if self.model.is_set() {
            self.rebuild()?;
        }
        Ok(())
    }

    /// Rebuild from every in-root buffer, publish the model, revalidate.
    ///
    /// On failure the previous model stays current and nothing is published.
    fn rebuild(&mut self) -> Result<(), SessionError> {
        let Some(root) = self.root.get() else {
            return Ok(());
        };
        let files = self.buffers.in_root(root);
        let base = self.model.current();

        let progress = self.progress.begin(ProgressKind::Build, BUILD_PROGRESS_TITLE);
        let model = match self.builder.build(&files, base.as_deref()) {
            Ok(model) => model,
            Err(error) => {
                progress.finish(Some("failed".to_string()));
                return Err(error.into());
            }
        };
        progress.finish(Some(format!("{} documents", model.len())));
        tracing::debug!(
            generation = model.generation(),
            documents = model.len(),
            "model rebuilt"
        );

        let model = self.model.replace(model);
        let config = self.config.current().unwrap_or_default();
        self.publisher.revalidate(&model, &config);
        Ok(())
    }

    pub fn model(&self) -> Option<Arc<Model>> {
        self.model.current()
    }

    pub fn configuration(&self) -> Arc<ClientConfiguration> {
        self.config.current().unwrap_or_default()
    }

    pub fn root(&self) -> Option<&WorkspaceRoot> {
        self.root.get()
    }

    pub fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    /// Number of `(Model, ClientConfiguration)` pairs emitted so far.
    pub fn context_emissions(&self) -> u64 {
        self.combined.emission_count()
    }

    /// Run the session as a tokio task.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = SessionHandle {
            sender,
            coordinator: self.coordinator.clone(),
        };
        (handle, tokio::spawn(self.run(receiver)))
    }

    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        tracing::info!("session started");
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Event(event) => {
                    if let Err(error) = self.handle(event) {
                        report(&error);
                    }
                }
                Command::Barrier(done) => {
                    let _ = done.send(());
                }
                Command::Shutdown => break,
            }
        }
        self.coordinator.close();
        tracing::info!("session stopped");
    }
}

fn report(error: &SessionError) {
    if error.is_invariant_violation() {
        tracing::error!("{error}");
    } else {
        tracing::warn!("{error}");
    }
}

enum Command {
    Event(SessionEvent),
    Barrier(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle to a spawned session.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<Command>,
    coordinator: RequestCoordinator,
}

impl SessionHandle {
    /// Queue an event behind every event sent before it.
    pub fn notify(&self, event: SessionEvent) -> Result<(), RequestError> {
        self.sender
            .send(Command::Event(event))
            .map_err(|_| RequestError::Shutdown)
    }

    /// Resolves once every event sent before this call has been processed.
    pub async fn settled(&self) -> Result<(), RequestError> {
        let (done, wait) = oneshot::channel();
        self.sender
            .send(Command::Barrier(done))
            .map_err(|_| RequestError::Shutdown)?;
        wait.await.map_err(|_| RequestError::Shutdown)
    }

    pub async fn request(
        &self,
        capability: &Capability,
        params: Value,
        cancel: CancellationToken,
    ) -> Result<Value, RequestError> {
        self.coordinator.request(capability, params, cancel).await
    }

    /// Like [`SessionHandle::request`], addressed by LSP method name.
    pub async fn request_method(
        &self,
        method: &str,
        params: Value,
        cancel: CancellationToken,
    ) -> Result<Value, RequestError> {
        let capability = Capability::from_method(method);
        self.coordinator.request(&capability, params, cancel).await
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(Command::Shutdown);
    }
}
