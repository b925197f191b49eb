//! Diagnostics orchestration.
//!
//! The [`DiagnosticsOrchestrator`] owns one [`DiagnosticCollection`] per registered provider and
//! drives validation from document events:
//!
//! 1. A document without the provider's extension has its entry cleared; nothing runs.
//! 2. Otherwise the provider runs on a worker thread.
//! 3. Success (or a suppressed advisory) clears the entry.
//! 4. Failure is reduced to a short message, anchored, and published as the sole entry.
//!
//! Every event bumps a per-document generation. Completions are applied on the caller's thread
//! by [`DiagnosticsOrchestrator::pump`] / [`DiagnosticsOrchestrator::wait_idle`]; a completion
//! whose generation is no longer the latest for its `(provider, document)` is discarded, so a
//! slow stale run can never overwrite a fresher result.

use crate::error::{LifecycleError, ValidationError};
use crate::provider::{ValidatorKind, ValidatorProvider};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::Span;
use vet_core::{Diagnostic, DiagnosticCollection, Document};

/// Host events that trigger validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The active document was loaded.
    Opened,
    /// The document text changed.
    Changed,
    /// The user switched to this document.
    ActiveEditorChanged,
}

struct ProviderSlot {
    provider: Arc<dyn ValidatorProvider>,
    collection: DiagnosticCollection,
}

struct Completion {
    slot: usize,
    uri: String,
    generation: u64,
    document: Arc<dyn Document>,
    outcome: Result<String, ValidationError>,
}

/// What applying a completion did to its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The run succeeded; the entry was cleared.
    Passed,
    /// The run reported only a suppressed advisory; the entry was cleared.
    Suppressed,
    /// A diagnostic was published.
    Published(Diagnostic),
    /// A newer run for the same document superseded this one.
    Stale,
}

/// Fans document events out to providers and maintains their collections.
pub struct DiagnosticsOrchestrator {
    slots: Vec<ProviderSlot>,
    generations: HashMap<(usize, String), u64>,
    next_generation: u64,
    pending: usize,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    span: Span,
    active: bool,
}

impl DiagnosticsOrchestrator {
    /// Create an orchestrator with one collection per provider.
    pub fn new(providers: Vec<Arc<dyn ValidatorProvider>>) -> Self {
        let (tx, rx) = mpsc::channel();
        let slots = providers
            .into_iter()
            .map(|provider| ProviderSlot {
                collection: DiagnosticCollection::new(provider.identify().label()),
                provider,
            })
            .collect();

        Self {
            slots,
            generations: HashMap::new(),
            next_generation: 0,
            pending: 0,
            tx,
            rx,
            span: Span::none(),
            active: false,
        }
    }

    /// Parent every log event (including those from worker threads) on `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Start every provider.
    ///
    /// Providers started before a failure are stopped again, so a failed activation leaves
    /// nothing behind.
    pub fn activate(&mut self) -> Result<(), LifecycleError> {
        let _entered = self.span.enter();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Err(err) = slot.provider.on_start() {
                tracing::warn!(provider = %slot.provider.identify(), error = %err, "activation failed");
                for started in &self.slots[..index] {
                    started.provider.on_stop();
                }
                return Err(err);
            }
        }
        self.active = true;
        Ok(())
    }

    /// Stop every provider. Idempotent.
    pub fn deactivate(&mut self) {
        let _entered = self.span.enter();
        for slot in &self.slots {
            slot.provider.on_stop();
        }
        self.active = false;
    }

    /// Whether [`Self::activate`] succeeded and [`Self::deactivate`] has not run since.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Wait for in-flight runs, stop providers and clear every collection.
    pub fn shutdown(&mut self, timeout: Duration) {
        self.wait_idle(timeout);
        self.deactivate();
        for slot in &mut self.slots {
            slot.collection.clear();
        }
    }

    /// Handle a document event: clear or schedule validation for every provider.
    pub fn handle_event(&mut self, event: DocumentEvent, document: Arc<dyn Document>) {
        let span = self.span.clone();
        let _entered = span.enter();
        let uri = document.uri();
        tracing::debug!(?event, %uri, "document event");

        for index in 0..self.slots.len() {
            let generation = self.bump_generation(index, &uri);
            let slot = &mut self.slots[index];

            if !slot.provider.accepts(&*document) {
                tracing::trace!(provider = %slot.provider.identify(), %uri, "extension not handled");
                slot.collection.delete(&uri);
                continue;
            }

            let provider = Arc::clone(&slot.provider);
            let document = Arc::clone(&document);
            let tx = self.tx.clone();
            let span = self.span.clone();
            let uri = uri.clone();
            self.pending += 1;

            thread::spawn(move || {
                let _entered = span.enter();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    provider.run_validation(&*document)
                }))
                .unwrap_or_else(|payload| {
                    let reason = panic_reason(payload.as_ref());
                    tracing::error!(provider = %provider.identify(), %reason, "validator panicked");
                    Err(ValidationError::Panicked(reason))
                });
                let _ = tx.send(Completion {
                    slot: index,
                    uri,
                    generation,
                    document,
                    outcome,
                });
            });
        }
    }

    /// Apply every finished run without blocking, in completion order.
    pub fn pump(&mut self) -> Vec<ValidationOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            outcomes.push(self.apply(completion));
        }
        outcomes
    }

    /// Block until every scheduled run has been applied or `timeout` elapses.
    ///
    /// Returns `true` when nothing is pending anymore.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        while self.pending > 0 {
            let completion = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return false;
                    }
                    match self.rx.recv_timeout(remaining) {
                        Ok(completion) => completion,
                        Err(_) => return false,
                    }
                }
                None => match self.rx.recv() {
                    Ok(completion) => completion,
                    Err(_) => return false,
                },
            };
            self.apply(completion);
        }
        true
    }

    /// Number of scheduled runs not yet applied.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// The registered providers, in registration order.
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn ValidatorProvider>> {
        self.slots.iter().map(|slot| &slot.provider)
    }

    /// All collections, in provider registration order.
    pub fn collections(&self) -> impl Iterator<Item = &DiagnosticCollection> {
        self.slots.iter().map(|slot| &slot.collection)
    }

    /// The collection of the first provider of `kind`.
    pub fn collection(&self, kind: ValidatorKind) -> Option<&DiagnosticCollection> {
        self.slots
            .iter()
            .find(|slot| slot.provider.identify() == kind)
            .map(|slot| &slot.collection)
    }

    /// Mutable access to a collection (e.g. to subscribe to changes).
    pub fn collection_mut(&mut self, kind: ValidatorKind) -> Option<&mut DiagnosticCollection> {
        self.slots
            .iter_mut()
            .find(|slot| slot.provider.identify() == kind)
            .map(|slot| &mut slot.collection)
    }

    fn bump_generation(&mut self, slot: usize, uri: &str) -> u64 {
        self.next_generation += 1;
        self.generations
            .insert((slot, uri.to_string()), self.next_generation);
        self.next_generation
    }

    fn apply(&mut self, completion: Completion) -> ValidationOutcome {
        self.pending = self.pending.saturating_sub(1);
        let _entered = self.span.enter();

        let Completion {
            slot: index,
            uri,
            generation,
            document,
            outcome,
        } = completion;

        let latest = self.generations.get(&(index, uri.clone())).copied();
        let Some(slot) = self.slots.get_mut(index) else {
            return ValidationOutcome::Stale;
        };
        let kind = slot.provider.identify();

        if latest != Some(generation) {
            tracing::debug!(provider = %kind, %uri, generation, ?latest, "discarding superseded run");
            return ValidationOutcome::Stale;
        }

        let err = match outcome {
            Ok(_) => {
                tracing::debug!(provider = %kind, %uri, "validation passed");
                slot.collection.delete(&uri);
                return ValidationOutcome::Passed;
            }
            Err(err) => err,
        };

        let problem = err.problem();
        tracing::trace!(provider = %kind, %uri, %problem, "validation failed");

        if slot.provider.is_suppressed(&problem) {
            tracing::debug!(provider = %kind, %uri, "suppressed advisory");
            slot.collection.delete(&uri);
            return ValidationOutcome::Suppressed;
        }

        let message = slot.provider.reduce_message(&problem);
        let range = slot.provider.resolve_range(&*document, &problem);
        tracing::debug!(provider = %kind, %uri, %message, ?range, "publishing diagnostic");

        let diagnostic = Diagnostic::error(uri.clone(), range, kind.label(), message);
        slot.collection.set(uri, vec![diagnostic.clone()]);
        ValidationOutcome::Published(diagnostic)
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        reason.to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Drop for DiagnosticsOrchestrator {
    fn drop(&mut self) {
        if self.active {
            self.deactivate();
        }
    }
}
