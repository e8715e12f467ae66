// ── Polling coordinator ──
//
// One slot per tracked resource: a watch channel holding the cached
// snapshot, a single-flight lock, and a timer task that refreshes on the
// resource's own interval. Resources never wait on each other.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use surge_api::SurgeClient;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{
    OutboundMode, RefreshPhase, ResourceError, ResourceHandle, ResourceId, ResourceKind,
    ResourceState, ResourceValue,
};
use crate::stream::ResourceStream;

/// Owns the refresh cycle and cached state of every tracked resource.
///
/// Cheaply cloneable: clones share the same slots and timers.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    client: Arc<SurgeClient>,
    slots: DashMap<ResourceId, Arc<Slot>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

struct Slot {
    handle: ResourceHandle,
    state: watch::Sender<Arc<ResourceState>>,
    /// Held for the whole of one refresh.
    in_flight: Arc<Mutex<()>>,
    /// Pinged by `refresh_now` to restart the timer period.
    rephase: Notify,
}

impl Slot {
    fn new(handle: ResourceHandle) -> Self {
        let (state, _) = watch::channel(Arc::new(ResourceState::uninitialized(handle.kind)));
        Self {
            handle,
            state,
            in_flight: Arc::new(Mutex::new(())),
            rephase: Notify::new(),
        }
    }

    fn snapshot(&self) -> Arc<ResourceState> {
        self.state.borrow().clone()
    }
}

impl Coordinator {
    pub fn new(client: Arc<SurgeClient>) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                client,
                slots: DashMap::new(),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Begin tracking `handle`.
    ///
    /// Awaits the first refresh, then hands the resource to its own timer
    /// task (first tick one full interval later). Starting a handle that
    /// is already tracked returns its current snapshot.
    pub async fn start(&self, handle: ResourceHandle) -> Result<Arc<ResourceState>, CoreError> {
        if self.is_stopped() {
            return Err(CoreError::Stopped);
        }

        let id = handle.id();
        let slot = match self.inner.slots.entry(id.clone()) {
            Entry::Occupied(existing) => return Ok(existing.get().snapshot()),
            Entry::Vacant(vacant) => {
                let slot = Arc::new(Slot::new(handle));
                vacant.insert(Arc::clone(&slot));
                slot
            }
        };

        let state = {
            let _guard = slot.in_flight.lock().await;
            refresh(&self.inner.client, &slot, &self.inner.cancel).await
        }
        .ok_or(CoreError::Stopped)?;

        let task = tokio::spawn(timer_task(
            Arc::clone(&self.inner.client),
            Arc::clone(&slot),
            self.inner.cancel.child_token(),
        ));
        self.inner.task_handles.lock().await.push(task);

        debug!(resource = %id, available = state.available, "resource tracked");
        Ok(state)
    }

    /// Cancel every timer and in-flight refresh, then wait for the timer
    /// tasks to finish. Cached snapshots stay readable.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            join_timer(handle).await;
        }
        debug!(resources = self.inner.slots.len(), "coordinator stopped");
    }

    /// Cancel without waiting. Used where `.await` is unavailable.
    pub(crate) fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Latest cached snapshot. Never blocks on network I/O.
    pub fn current_state(&self, id: &ResourceId) -> Result<Arc<ResourceState>, CoreError> {
        Ok(self.slot(id)?.snapshot())
    }

    pub fn subscribe(&self, id: &ResourceId) -> Result<ResourceStream, CoreError> {
        Ok(ResourceStream::new(self.slot(id)?.state.subscribe()))
    }

    pub fn is_tracked(&self, id: &ResourceId) -> bool {
        self.inner.slots.contains_key(id)
    }

    /// Tracked ids, sorted.
    pub fn tracked(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self.inner.slots.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    // ── Manual refresh ───────────────────────────────────────────────

    /// Refresh `id` immediately and return the new snapshot.
    ///
    /// Waits for any refresh already in flight, so the result always
    /// reflects remote state at or after the call. Restarts the
    /// resource's timer period.
    pub async fn refresh_now(&self, id: &ResourceId) -> Result<Arc<ResourceState>, CoreError> {
        if self.is_stopped() {
            return Err(CoreError::Stopped);
        }
        let slot = self.slot(id)?;
        let _guard = slot.in_flight.lock().await;
        slot.rephase.notify_one();
        refresh(&self.inner.client, &slot, &self.inner.cancel)
            .await
            .ok_or(CoreError::Stopped)
    }

    fn slot(&self, id: &ResourceId) -> Result<Arc<Slot>, CoreError> {
        self.inner
            .slots
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CoreError::UnknownResource { id: id.clone() })
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodic refresh of one resource.
///
/// A tick that finds a refresh already running is dropped rather than
/// queued.
async fn timer_task(client: Arc<SurgeClient>, slot: Arc<Slot>, cancel: CancellationToken) {
    let period = slot.handle.poll_interval;
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = slot.rephase.notified() => interval.reset(),
            _ = interval.tick() => {
                let Ok(_guard) = slot.in_flight.try_lock() else {
                    debug!(resource = %slot.handle.id(), "refresh in flight, tick dropped");
                    continue;
                };
                refresh(&client, &slot, &cancel).await;
            }
        }
    }
}

/// Wait for a timer task to exit. Returns `false` (after logging) if it
/// panicked instead of stopping cleanly.
async fn join_timer(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "timer task ended abnormally");
            false
        }
    }
}

/// Run one refresh and publish the outcome. The caller holds the slot's
/// single-flight lock.
///
/// Returns `None` if cancellation won the race; the fetched result is
/// discarded and the previous snapshot is restored.
async fn refresh(
    client: &SurgeClient,
    slot: &Slot,
    cancel: &CancellationToken,
) -> Option<Arc<ResourceState>> {
    let previous = slot.snapshot();
    slot.state.send_replace(Arc::new(previous.refreshing()));

    let result = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        result = fetch(client, &slot.handle) => Some(result),
    };
    let Some(result) = result else {
        slot.state.send_replace(previous);
        debug!(resource = %slot.handle.id(), "refresh discarded after stop");
        return None;
    };

    let next = match result {
        Ok(value) => {
            if previous.phase == RefreshPhase::Unavailable {
                info!(resource = %slot.handle.id(), "resource available again");
            }
            ResourceState::succeeded(value)
        }
        Err(e) => {
            log_failure(&slot.handle, &previous, &e);
            previous.failed(ResourceError::from(&e))
        }
    };

    let next = Arc::new(next);
    slot.state.send_replace(Arc::clone(&next));
    Some(next)
}

/// Warn when a resource goes unavailable; repeated failures are debug.
fn log_failure(handle: &ResourceHandle, previous: &ResourceState, err: &CoreError) {
    let id = handle.id();
    if previous.phase == RefreshPhase::Unavailable {
        debug!(resource = %id, error = %err, "refresh still failing");
    } else if handle.mac_only && err.is_not_found() {
        warn!(resource = %id, "feature not supported on this device");
    } else {
        warn!(resource = %id, kind = %err.kind(), error = %err, "refresh failed");
    }
}

/// One read of remote state for `handle`, shaped per kind.
async fn fetch(client: &SurgeClient, handle: &ResourceHandle) -> Result<ResourceValue, CoreError> {
    let value = match handle.kind {
        ResourceKind::Profile => {
            let (options, current) =
                tokio::try_join!(client.get_profiles(), client.get_current_profile())?;
            ResourceValue::Selection {
                options,
                current: Some(current),
            }
        }
        ResourceKind::OutboundMode => ResourceValue::Selection {
            options: OutboundMode::options(),
            current: Some(client.get_outbound_mode().await?),
        },
        ResourceKind::FeatureToggle => ResourceValue::Toggle {
            enabled: client.get_feature(&handle.key).await?,
        },
        ResourceKind::PolicyGroup => {
            let detail = client.get_policy_group(&handle.key).await?;
            ResourceValue::Selection {
                options: detail.policies,
                current: Some(detail.current),
            }
        }
        ResourceKind::Traffic => client.get_traffic().await?.into(),
    };
    Ok(value)
}
