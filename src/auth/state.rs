//! Anti-forgery `state` values for the authorization redirect

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

const STATE_TTL: Duration = Duration::from_secs(600);

/// States handed out by `/auth` and not yet seen on the callback
#[derive(Debug)]
pub struct StateStore {
    pending: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(STATE_TTL)
    }
}

impl StateStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Create and remember a fresh random state
    pub async fn issue(&self) -> String {
        let state = Uuid::new_v4().to_string();
        let now = Instant::now();

        let mut pending = self.pending.lock().await;
        pending.retain(|_, issued| now.duration_since(*issued) < self.ttl);
        pending.insert(state.clone(), now);
        state
    }

    /// Consume `state`. Each state is accepted at most once and only within the TTL.
    pub async fn consume(&self, state: &str) -> bool {
        let mut pending = self.pending.lock().await;
        match pending.remove(state) {
            Some(issued) => issued.elapsed() < self.ttl,
            None => false,
        }
    }
}
