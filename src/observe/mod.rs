//! Change observation.
//!
//! Feeds are cold: nothing is registered with the store until a feed is
//! subscribed. Each subscription owns exactly one listener registration and
//! gives it back when unsubscribed or dropped. Blocking subscriptions are
//! iterators backed by crossbeam channels; with the `async` feature the same
//! feeds also hand out `tokio_stream::Stream`s.

/// Listener registration guard.
mod registration;
/// Key-level feeds and subscriptions.
pub mod stream;
/// Value-level feeds for a single key.
pub mod typed;

pub use stream::{ChangeFeed, ChangeSubscription};
pub use typed::{PreferenceFeed, PreferenceSubscription};

#[cfg(feature = "async")]
pub use stream::AsyncChangeSubscription;
#[cfg(feature = "async")]
pub use typed::AsyncPreferenceSubscription;
