//! Revalidation pass: publish diagnostics for every document of a model.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::client::{Client, Diagnostic, PublishDiagnostics};
use crate::config::ClientConfiguration;
use crate::model::Model;

/// Publishes one diagnostic set per model document and clears URIs that
/// dropped out of the model since the previous pass.
pub struct DiagnosticPublisher {
    client: Arc<dyn Client>,
    published: FxHashSet<String>,
}

impl DiagnosticPublisher {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            client,
            published: FxHashSet::default(),
        }
    }

    /// Returns the number of notifications sent.
    pub fn revalidate(&mut self, model: &Model, config: &ClientConfiguration) -> usize {
        let limit = config.thresholds.max_problems_per_file;
        let mut current = FxHashSet::default();

        for document in model.documents() {
            let diagnostics: Vec<Diagnostic> = document
                .problems
                .iter()
                .take(limit)
                .map(Diagnostic::from)
                .collect();
            if document.problems.len() > limit {
                tracing::debug!(
                    uri = %document.uri,
                    problems = document.problems.len(),
                    limit,
                    "truncating diagnostics"
                );
            }
            self.client.publish_diagnostics(PublishDiagnostics {
                uri: document.uri.clone(),
                version: Some(document.version),
                diagnostics,
            });
            current.insert(document.uri.clone());
        }

        let mut gone: Vec<String> = self.published.difference(&current).cloned().collect();
        gone.sort();
        for uri in &gone {
            tracing::trace!(uri = %uri, "clearing diagnostics of document no longer in the model");
            self.client.publish_diagnostics(PublishDiagnostics::empty(uri.clone()));
        }

        let sent = current.len() + gone.len();
        tracing::debug!(generation = model.generation(), sent, "revalidation pass");
        self.published = current;
        sent
    }

    pub fn has_published(&self, uri: &str) -> bool {
        self.published.contains(uri)
    }
}
