// service/notification_hub.rs
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};

use crate::{
    config::Config,
    models::notificationmodel::Notification,
    service::fetch_state::{FetchSlot, FetchState},
    upstream::{BrokerApi, BrokerSession},
};

type NotificationSlot = Arc<Mutex<FetchSlot<Vec<Notification>>>>;
type Pollers = Arc<Mutex<HashMap<String, Poller>>>;

/// Background poll for one session. Dropping it stops the task.
struct Poller {
    id: u64,
    slot: NotificationSlot,
    last_read: Arc<Mutex<Instant>>,
    task: JoinHandle<()>,
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Keeps one notification poller per session token. A poller starts on the
/// first read, refreshes every `poll_interval`, and stops itself once nobody
/// has read it for `idle_timeout`.
pub struct NotificationHub {
    api: Arc<dyn BrokerApi>,
    poll_interval: Duration,
    idle_timeout: Duration,
    pollers: Pollers,
    next_id: AtomicU64,
}

impl NotificationHub {
    pub fn new(api: Arc<dyn BrokerApi>, config: &Config) -> Self {
        Self::with_timing(api, config.notification_poll_interval, config.notification_idle_timeout)
    }

    pub fn with_timing(api: Arc<dyn BrokerApi>, poll_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            api,
            poll_interval,
            idle_timeout,
            pollers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current notifications for `session`. The first call fetches inline and
    /// starts the poller; later calls return whatever the poller last stored.
    pub async fn latest(&self, session: &BrokerSession) -> FetchState<Vec<Notification>> {
        let key = session.fingerprint();

        let existing = {
            let pollers = lock(&self.pollers);
            pollers.get(&key).map(|poller| {
                *lock(&poller.last_read) = Instant::now();
                poller.slot.clone()
            })
        };
        if let Some(slot) = existing {
            return lock(&slot).state().clone();
        }

        let slot: NotificationSlot = Arc::new(Mutex::new(FetchSlot::new()));
        let ticket = lock(&slot).begin();
        let result = fetch(self.api.as_ref(), session).await;
        lock(&slot).complete(ticket, result);
        let state = lock(&slot).state().clone();

        self.start(key, session.clone(), slot);
        state
    }

    fn start(&self, key: String, session: BrokerSession, slot: NotificationSlot) {
        let mut pollers = lock(&self.pollers);
        // A concurrent first read may have won the race.
        if pollers.contains_key(&key) {
            return;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let last_read = Arc::new(Mutex::new(Instant::now()));
        let task = tokio::spawn(poll_loop(PollLoop {
            api: self.api.clone(),
            session,
            slot: slot.clone(),
            last_read: last_read.clone(),
            pollers: self.pollers.clone(),
            key: key.clone(),
            id,
            poll_interval: self.poll_interval,
            idle_timeout: self.idle_timeout,
        }));

        tracing::info!(session = %key, poller = id, "notification poller started");
        pollers.insert(key, Poller { id, slot, last_read, task });
    }

    /// Stop polling for `session`, e.g. on logout.
    pub fn stop(&self, session: &BrokerSession) -> bool {
        let removed = lock(&self.pollers).remove(&session.fingerprint());
        match removed {
            Some(poller) => {
                lock(&poller.slot).cancel();
                true
            }
            None => false,
        }
    }

    pub fn active_sessions(&self) -> usize {
        lock(&self.pollers).len()
    }
}

impl Drop for NotificationHub {
    fn drop(&mut self) {
        lock(&self.pollers).clear();
    }
}

async fn fetch(api: &dyn BrokerApi, session: &BrokerSession) -> Result<Vec<Notification>, String> {
    api.notifications(session).await.map_err(|e| {
        tracing::warn!(session = %session.fingerprint(), "notification fetch failed: {}", e);
        e.display_message()
    })
}

struct PollLoop {
    api: Arc<dyn BrokerApi>,
    session: BrokerSession,
    slot: NotificationSlot,
    last_read: Arc<Mutex<Instant>>,
    pollers: Pollers,
    key: String,
    id: u64,
    poll_interval: Duration,
    idle_timeout: Duration,
}

async fn poll_loop(ctx: PollLoop) {
    let mut ticker = interval_at(Instant::now() + ctx.poll_interval, ctx.poll_interval);

    loop {
        ticker.tick().await;

        let idle = lock(&ctx.last_read).elapsed();
        if idle >= ctx.idle_timeout {
            lock(&ctx.slot).cancel();
            let removed = {
                let mut pollers = lock(&ctx.pollers);
                match pollers.get(&ctx.key) {
                    Some(poller) if poller.id == ctx.id => pollers.remove(&ctx.key),
                    _ => None,
                }
            };
            tracing::info!(session = %ctx.key, poller = ctx.id, "notification poller idle, stopping");
            drop(removed);
            return;
        }

        let ticket = lock(&ctx.slot).begin();
        let result = fetch(ctx.api.as_ref(), &ctx.session).await;
        if !lock(&ctx.slot).complete(ticket, result) {
            tracing::debug!(session = %ctx.key, "discarded stale notification response");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::dashboard_service::tests::FakeApi;

    fn note(id: &str) -> Notification {
        Notification {
            id: id.to_string(),
            title: "New enquiry".to_string(),
            message: String::new(),
            read: false,
            created_at: None,
        }
    }

    fn hub(api: Arc<FakeApi>) -> NotificationHub {
        NotificationHub::with_timing(api, Duration::from_secs(30), Duration::from_secs(90))
    }

    fn notification_calls(api: &FakeApi) -> usize {
        api.calls().iter().filter(|c| *c == "notifications").count()
    }

    #[tokio::test(start_paused = true)]
    async fn first_read_fetches_inline() {
        let api = Arc::new(FakeApi { notifications: vec![note("n1")], ..FakeApi::default() });
        let hub = hub(api.clone());

        let state = hub.latest(&BrokerSession::new("t")).await;
        assert_eq!(state.loaded().map(Vec::len), Some(1));
        assert_eq!(notification_calls(&api), 1);
        assert_eq!(hub.active_sessions(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_refreshes_on_interval() {
        let api = Arc::new(FakeApi { notifications: vec![note("n1")], ..FakeApi::default() });
        let hub = hub(api.clone());
        let session = BrokerSession::new("t");

        hub.latest(&session).await;
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(notification_calls(&api), 2);

        // Served from the slot, no extra fetch
        let state = hub.latest(&session).await;
        assert_eq!(state.name(), "loaded");
        assert_eq!(notification_calls(&api), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_poll_independently() {
        let api = Arc::new(FakeApi::default());
        let hub = hub(api.clone());

        hub.latest(&BrokerSession::new("a")).await;
        hub.latest(&BrokerSession::new("b")).await;
        assert_eq!(hub.active_sessions(), 2);

        assert!(hub.stop(&BrokerSession::new("a")));
        assert!(!hub.stop(&BrokerSession::new("a")));
        assert_eq!(hub.active_sessions(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_poller_stops_itself() {
        let api = Arc::new(FakeApi::default());
        let hub = hub(api.clone());

        hub.latest(&BrokerSession::new("t")).await;
        tokio::time::sleep(Duration::from_secs(100)).await;

        assert_eq!(hub.active_sessions(), 0);
        // inline fetch plus the ticks at 30s and 60s
        assert_eq!(notification_calls(&api), 3);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(notification_calls(&api), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_is_errored_with_message() {
        let api = Arc::new(FakeApi::failing());
        let hub = hub(api);

        let state = hub.latest(&BrokerSession::new("t")).await;
        assert_eq!(state, FetchState::Errored("Failed to load data".to_string()));
    }
}
