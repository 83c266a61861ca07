//! Replaying publish/subscribe primitive.
//!
//! A [`Subject`] holds the latest value. Every new subscriber first receives
//! that value, then every later publish in the order it happened.

use std::sync::{Mutex, PoisonError};

use futures_util::stream::Stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Updates buffered per subscriber before it starts lagging.
pub const SUBJECT_CAPACITY: usize = 256;

/// Holds the current value and fans updates out to subscribers.
#[derive(Debug)]
pub struct Subject<T> {
    current: Mutex<T>,
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> Subject<T> {
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _) = broadcast::channel(SUBJECT_CAPACITY);
        Self { current: Mutex::new(initial), tx }
    }

    /// Copy of the current value.
    pub fn get(&self) -> T {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the current value and forwards it to every subscriber.
    pub fn publish(&self, value: T) {
        // The lock is held across the send so a concurrent `subscribe` sees
        // either the old value plus this update, or only the new value.
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = value.clone();
        let _ = self.tx.send(value);
    }

    /// New subscription that replays the current value first.
    pub fn subscribe(&self) -> Subscription<T> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        Subscription { replay: Some(current.clone()), rx: self.tx.subscribe() }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One subscriber's view of a [`Subject`].
#[derive(Debug)]
pub struct Subscription<T> {
    replay: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    /// Next value, waiting for a publish if none is queued.
    ///
    /// Returns `None` once the subject is dropped and the queue drained.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged behind, skipping to oldest retained update");
                },
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next queued value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(value) = self.replay.take() {
            return Some(value);
        }
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Some(value),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Subscriber lagged behind, skipping to oldest retained update");
                },
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Every queued value without waiting.
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// The subscription as a stream; ends when the subject is dropped.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        let mut sub = self;
        async_stream::stream! {
            while let Some(value) = sub.recv().await {
                yield value;
            }
        }
    }
}
