//! Upload pacing, kept apart from the uploaders so providers' limits can be
//! tuned without touching transport code.

use crate::config::PacingConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lowest refill rate a bucket runs at; keeps waits finite for zero or
/// negative rates coming from unvalidated configs.
const MIN_REFILL_PER_SEC: f64 = 0.001;

struct TokenBucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, refill_per_sec: f64) -> Self {
        let capacity = f64::from(capacity.max(1));
        // NaN 也會落到下限
        let refill_per_sec = if refill_per_sec > MIN_REFILL_PER_SEC {
            refill_per_sec
        } else {
            MIN_REFILL_PER_SEC
        };
        Self {
            capacity,
            tokens: capacity,
            refill_per_sec,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_token(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_per_sec)
        }
    }
}

#[derive(Default)]
struct PacerState {
    successes: u64,
    bucket: Option<TokenBucket>,
}

pub struct Pacer {
    policy: PacingConfig,
    state: Mutex<PacerState>,
}

impl Pacer {
    pub fn new(policy: PacingConfig) -> Self {
        let bucket = match &policy {
            PacingConfig::TokenBucket {
                capacity,
                refill_per_sec,
            } => Some(TokenBucket::new(*capacity, *refill_per_sec)),
            _ => None,
        };

        Self {
            policy,
            state: Mutex::new(PacerState {
                successes: 0,
                bucket,
            }),
        }
    }

    /// Waits for a token when a token bucket is configured.
    pub async fn before_upload(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                match state.bucket.as_mut() {
                    None => return,
                    Some(bucket) => {
                        if bucket.try_acquire() {
                            return;
                        }
                        bucket.time_until_token()
                    }
                }
            };
            tracing::debug!("Rate limit: waiting {:?} for an upload slot", wait);
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    /// Called once per record, after its upload finished or failed.
    pub async fn after_record(&self, uploaded: bool) {
        match &self.policy {
            PacingConfig::Fixed { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            }
            PacingConfig::Batch { every, pause_secs } => {
                if !uploaded || *every == 0 {
                    return;
                }
                let successes = {
                    let mut state = self.state.lock().await;
                    state.successes += 1;
                    state.successes
                };
                if successes % u64::from(*every) == 0 {
                    tracing::info!(
                        "⏸️ Rate limit control: {} uploads done, pausing for {} seconds...",
                        successes,
                        pause_secs
                    );
                    tokio::time::sleep(Duration::from_secs(*pause_secs)).await;
                }
            }
            PacingConfig::None | PacingConfig::TokenBucket { .. } => {}
        }
    }
}
