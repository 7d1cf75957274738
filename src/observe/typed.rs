//! Typed feeds: one key, re-read on every change.

use std::fmt;
use std::time::{Duration, Instant};

#[cfg(feature = "async")]
use tokio_stream::Stream;

use crate::descriptor::Preference;
use crate::error::PrefResult;
use crate::preferences::TypedPreferences;

use super::stream::ChangeSubscription;
#[cfg(feature = "async")]
use super::stream::AsyncChangeSubscription;

/// Cold feed of one preference's value.
///
/// Built by [`TypedPreferences::observe`] and
/// [`TypedPreferences::get_and_observe`]. Each emission is a fresh `get`,
/// so it reflects the store at event time.
#[derive(Clone)]
pub struct PreferenceFeed<T> {
    prefs: TypedPreferences,
    key: String,
    default: T,
    emit_current: bool,
}

impl<T: Preference + Clone> PreferenceFeed<T> {
    pub(crate) fn new(
        prefs: TypedPreferences,
        key: String,
        default: T,
        emit_current: bool,
    ) -> Self {
        Self {
            prefs,
            key,
            default,
            emit_current,
        }
    }

    /// The observed key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether subscriptions start with the current value.
    #[must_use]
    pub const fn emits_current(&self) -> bool {
        self.emit_current
    }

    /// Register a listener and return a blocking subscription.
    ///
    /// The listener is registered before the current value is read, so a
    /// concurrent write is seen at least once (possibly twice).
    pub fn subscribe(&self) -> PrefResult<PreferenceSubscription<T>> {
        let changes = self.prefs.observe_preferences().subscribe()?;
        Ok(PreferenceSubscription {
            changes,
            pending: self.initial(),
            feed: self.clone(),
        })
    }

    /// Register a listener and return a `Stream` subscription.
    #[cfg(feature = "async")]
    pub fn subscribe_async(&self) -> PrefResult<AsyncPreferenceSubscription<T>> {
        let changes = self.prefs.observe_preferences().subscribe_async()?;
        Ok(AsyncPreferenceSubscription {
            changes,
            pending: self.initial(),
            feed: self.clone(),
        })
    }

    fn initial(&self) -> Option<PrefResult<T>> {
        self.emit_current.then(|| self.read())
    }

    fn read(&self) -> PrefResult<T> {
        self.prefs.get(&self.key, self.default.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for PreferenceFeed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceFeed")
            .field("key", &self.key)
            .field("default", &self.default)
            .field("emit_current", &self.emit_current)
            .finish_non_exhaustive()
    }
}

/// Blocking subscription to one preference.
///
/// Yields `PrefResult<T>`: a value that fails to decode is reported to the
/// subscriber instead of ending the subscription.
pub struct PreferenceSubscription<T> {
    changes: ChangeSubscription,
    pending: Option<PrefResult<T>>,
    feed: PreferenceFeed<T>,
}

impl<T: Preference + Clone> PreferenceSubscription<T> {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.changes.is_active()
    }

    /// Deregister the listener. Idempotent.
    pub fn unsubscribe(&self) -> PrefResult<()> {
        self.changes.unsubscribe()
    }

    /// Next value (blocking). The outer error means the subscription ended.
    pub fn recv(&mut self) -> PrefResult<PrefResult<T>> {
        if let Some(initial) = self.pending.take() {
            return Ok(initial);
        }
        loop {
            let key = self.changes.recv()?;
            if key == self.feed.key {
                return Ok(self.feed.read());
            }
        }
    }

    /// Next value, or `None` once `timeout` elapses.
    pub fn recv_timeout(&mut self, timeout: Duration) -> PrefResult<Option<PrefResult<T>>> {
        if let Some(initial) = self.pending.take() {
            return Ok(Some(initial));
        }
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.changes.recv_timeout(remaining)? {
                Some(key) if key == self.feed.key => return Ok(Some(self.feed.read())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
    }
}

impl<T: Preference + Clone> Iterator for PreferenceSubscription<T> {
    type Item = PrefResult<T>;

    fn next(&mut self) -> Option<PrefResult<T>> {
        self.recv().ok()
    }
}

impl<T: fmt::Debug> fmt::Debug for PreferenceSubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceSubscription")
            .field("key", &self.feed.key)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}

/// `Stream` subscription to one preference.
#[cfg(feature = "async")]
pub struct AsyncPreferenceSubscription<T> {
    changes: AsyncChangeSubscription,
    pending: Option<PrefResult<T>>,
    feed: PreferenceFeed<T>,
}

#[cfg(feature = "async")]
impl<T: Preference + Clone> AsyncPreferenceSubscription<T> {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.changes.is_active()
    }

    /// Deregister the listener. The stream ends on its next poll.
    pub fn unsubscribe(&self) -> PrefResult<()> {
        self.changes.unsubscribe()
    }
}

#[cfg(feature = "async")]
impl<T: Preference + Clone + Unpin> Stream for AsyncPreferenceSubscription<T> {
    type Item = PrefResult<T>;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<PrefResult<T>>> {
        use std::task::Poll;

        let this = self.get_mut();
        if let Some(initial) = this.pending.take() {
            return Poll::Ready(Some(initial));
        }
        loop {
            match std::pin::Pin::new(&mut this.changes).poll_next(cx) {
                Poll::Ready(Some(key)) if key == this.feed.key => {
                    return Poll::Ready(Some(this.feed.read()));
                }
                Poll::Ready(Some(_)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(feature = "async")]
impl<T: fmt::Debug> fmt::Debug for AsyncPreferenceSubscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPreferenceSubscription")
            .field("key", &self.feed.key)
            .field("changes", &self.changes)
            .finish_non_exhaustive()
    }
}
