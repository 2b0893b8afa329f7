//! 指数退避重试
//!
//! 代理（Broker）对消费者失败的投递按 `RetryPolicy` 重试；
//! 不可重试的错误（如解码失败）立即放弃。
//!
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// 重试策略
///
/// - `max_retries`：首次尝试之外的最大重试次数
/// - `initial_delay_ms`：第一次重试前的等待
/// - `max_delay_ms`：退避上限
/// - `multiplier`：每次重试等待的放大倍数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 30_000,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// 不重试
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// 第 `attempt` 次重试（从 0 开始）前的等待：`initial * multiplier^attempt`，不超过上限
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let initial = self.initial_delay_ms as f64;
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_ms = (initial * self.multiplier.powi(exp)).min(self.max_delay_ms as f64);
        if delay_ms.is_finite() && delay_ms >= 0.0 {
            Duration::from_millis(delay_ms as u64)
        } else {
            Duration::from_millis(self.max_delay_ms)
        }
    }
}

/// 重试耗尽（或遇到不可重试错误）时返回的最后一次错误
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// 实际执行次数（含首次）
    pub attempts: usize,
    pub error: E,
}

/// 以指数退避执行异步操作
///
/// `is_retryable` 返回 false 的错误不再重试。
pub async fn retry_with_backoff<F, Fut, T, E, R>(
    policy: &RetryPolicy,
    is_retryable: R,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        match operation(attempt + 1).await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if !is_retryable(&error) || attempt >= policy.max_retries {
                    return Err(RetryExhausted {
                        attempts: attempt + 1,
                        error,
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
