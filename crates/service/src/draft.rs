//! The single persisted draft and the debounced task that writes it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regdesk_core::constants::DRAFT_KEY;
use regdesk_core::{Draft, FormSnapshot};
use regdesk_storage::KeyValueStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ServiceError;

#[derive(Clone)]
pub struct DraftStore {
    kv: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored draft, if any. Unreadable or corrupted drafts load as `None`.
    pub fn load(&self) -> Option<Draft> {
        let raw = match self.kv.get(DRAFT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read draft");
                return None;
            },
        };
        serde_json::from_str(&raw)
            .inspect_err(|e| tracing::warn!(error = %e, "Stored draft is corrupted, ignoring"))
            .ok()
    }

    pub fn save(&self, form: &FormSnapshot) -> Result<(), ServiceError> {
        self.save_at(form, Utc::now())
    }

    pub fn save_at(&self, form: &FormSnapshot, now: DateTime<Utc>) -> Result<(), ServiceError> {
        let draft = Draft { form: form.clone(), updated_at: now };
        self.kv.set(DRAFT_KEY, &serde_json::to_string(&draft)?)?;
        tracing::debug!("Draft saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), ServiceError> {
        self.kv.remove(DRAFT_KEY)?;
        Ok(())
    }
}

/// Handle to the background autosave task.
///
/// Every form change is sent through [`notify`](Self::notify). The task
/// waits for `debounce` of quiet, drops a value equal to the last one it
/// emitted, and saves the rest when they hold any text.
pub struct DraftAutosave {
    tx: mpsc::UnboundedSender<FormSnapshot>,
    task: JoinHandle<()>,
}

impl DraftAutosave {
    /// Starts the task on the current tokio runtime.
    #[must_use]
    pub fn spawn(store: DraftStore, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_autosave(store, debounce, rx));
        Self { tx, task }
    }

    pub fn notify(&self, form: FormSnapshot) {
        if self.tx.send(form).is_err() {
            tracing::debug!("Draft autosave already stopped");
        }
    }

    /// Stops the task. A value still inside the debounce window is dropped.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Draft autosave task failed");
        }
    }
}

async fn run_autosave(
    store: DraftStore,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<FormSnapshot>,
) {
    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);
    let mut pending: Option<FormSnapshot> = None;
    let mut last_emitted: Option<FormSnapshot> = None;

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(form) => {
                    pending = Some(form);
                    timer.as_mut().reset(Instant::now() + debounce);
                },
                None => break,
            },
            () = &mut timer, if pending.is_some() => {
                let Some(form) = pending.take() else { continue };
                if last_emitted.as_ref() == Some(&form) {
                    continue;
                }
                if form.has_content() {
                    if let Err(e) = store.save(&form) {
                        tracing::warn!(error = %e, "Draft autosave failed");
                    }
                }
                last_emitted = Some(form);
            },
        }
    }

    if pending.is_some() {
        tracing::debug!("Draft autosave stopped with an unsaved change");
    }
}
