//! Change feeds and their subscriptions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, TryRecvError};
#[cfg(feature = "async")]
use tokio_stream::Stream;

use crate::error::{PrefError, PrefResult};
use crate::storage::PreferenceStore;

use super::registration::Registration;

/// Cold feed of changed keys.
///
/// Creating a feed registers nothing. Every call to [`subscribe`](Self::subscribe)
/// registers its own listener, so subscriptions are independent of each other.
#[derive(Clone)]
pub struct ChangeFeed {
    store: Arc<dyn PreferenceStore>,
}

impl ChangeFeed {
    pub(crate) fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Register a listener and return a blocking subscription.
    pub fn subscribe(&self) -> PrefResult<ChangeSubscription> {
        let (tx, rx) = unbounded::<String>();
        let registration = Registration::register(&self.store, move |key| {
            // The receiver is gone only while the subscription is being dropped.
            let _ = tx.send(key.to_string());
        })?;
        Ok(ChangeSubscription { rx, registration })
    }

    /// Register a listener and return a `Stream` subscription.
    #[cfg(feature = "async")]
    pub fn subscribe_async(&self) -> PrefResult<AsyncChangeSubscription> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        let registration = Registration::register(&self.store, move |key| {
            let _ = tx.send(key.to_string());
        })?;
        Ok(AsyncChangeSubscription {
            rx: tokio_stream::wrappers::UnboundedReceiverStream::new(rx),
            registration,
        })
    }
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed").finish_non_exhaustive()
    }
}

/// Blocking subscription to changed keys.
///
/// Keys arrive in the order the store reports them. Dropping the subscription
/// deregisters its listener.
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: Receiver<String>,
    registration: Registration,
}

impl ChangeSubscription {
    /// Whether the subscription still delivers keys.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.registration.is_cancelled()
    }

    /// Deregister the listener. Idempotent.
    ///
    /// Keys already queued are discarded.
    pub fn unsubscribe(&self) -> PrefResult<()> {
        self.registration.cancel()
    }

    /// Receive the next changed key (blocking).
    pub fn recv(&self) -> PrefResult<String> {
        self.ensure_active()?;
        let key = self.rx.recv().map_err(|_| PrefError::SubscriptionClosed)?;
        self.ensure_active()?;
        Ok(key)
    }

    /// Receive the next changed key, or `None` once `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> PrefResult<Option<String>> {
        self.ensure_active()?;
        let key = match self.rx.recv_timeout(timeout) {
            Ok(key) => key,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            Err(RecvTimeoutError::Disconnected) => return Err(PrefError::SubscriptionClosed),
        };
        self.ensure_active()?;
        Ok(Some(key))
    }

    /// Receive a queued key without blocking.
    pub fn try_recv(&self) -> PrefResult<Option<String>> {
        self.ensure_active()?;
        match self.rx.try_recv() {
            Ok(key) => Ok(Some(key)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PrefError::SubscriptionClosed),
        }
    }

    fn ensure_active(&self) -> PrefResult<()> {
        if self.registration.is_cancelled() {
            return Err(PrefError::SubscriptionClosed);
        }
        Ok(())
    }
}

impl Iterator for ChangeSubscription {
    type Item = String;

    /// Blocks until the next key; ends once the subscription is cancelled.
    fn next(&mut self) -> Option<String> {
        self.recv().ok()
    }
}

/// `Stream` subscription to changed keys.
///
/// Dropping the stream deregisters its listener.
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct AsyncChangeSubscription {
    rx: tokio_stream::wrappers::UnboundedReceiverStream<String>,
    registration: Registration,
}

#[cfg(feature = "async")]
impl AsyncChangeSubscription {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.registration.is_cancelled()
    }

    /// Deregister the listener. The stream ends on its next poll.
    pub fn unsubscribe(&self) -> PrefResult<()> {
        self.registration.cancel()
    }
}

#[cfg(feature = "async")]
impl Stream for AsyncChangeSubscription {
    type Item = String;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<String>> {
        if self.registration.is_cancelled() {
            return std::task::Poll::Ready(None);
        }
        std::pin::Pin::new(&mut self.rx).poll_next(cx)
    }
}
