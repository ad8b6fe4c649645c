use crate::utils::error::Result;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with exponential backoff: the wait after attempt `n`
/// (zero-based) is `backoff_base * 2^n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// 執行 `op` 直到成功、遇到不可重試的錯誤，或用完嘗試次數。
/// 最後一次失敗後不再等待。
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!("{} succeeded on attempt {}", label, attempt + 1);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "⚠️ Attempt {}/{} for {} failed: {} (retrying in {:?})",
                    attempt + 1,
                    attempts,
                    label,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!("⚠️ Giving up on {} after {} attempts: {}", label, attempts, e);
                }
                return Err(e);
            }
        }
    }
}
