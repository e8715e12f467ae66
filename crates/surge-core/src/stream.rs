// ── Reactive resource streams ──
//
// Subscription type for consuming state changes of one resource.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::ResourceState;

/// A subscription to one resource's cached state.
///
/// Provides point-in-time snapshot access and change notification via
/// `changed()` or by converting to a `Stream`.
pub struct ResourceStream {
    current: Arc<ResourceState>,
    receiver: watch::Receiver<Arc<ResourceState>>,
}

impl ResourceStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<ResourceState>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation time or at the last `changed()`.
    pub fn current(&self) -> &Arc<ResourceState> {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Arc<ResourceState> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the coordinator has dropped the slot.
    pub async fn changed(&mut self) -> Option<Arc<ResourceState>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> ResourceWatchStream {
        ResourceWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot each time the resource changes.
pub struct ResourceWatchStream {
    inner: WatchStream<Arc<ResourceState>>,
}

impl Stream for ResourceWatchStream {
    type Item = Arc<ResourceState>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
