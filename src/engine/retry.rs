//! # 引擎调用重试策略
//!
//! 只对瞬时错误（收敛失败、超时）重试；非法成分和授权/会话错误立即返回。
//!
//! ## 依赖关系
//! - 被 `config.rs` 反序列化
//! - 被 `batch/runner.rs` 使用

use super::EngineError;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

fn default_initial_ms() -> u64 {
    1000
}

fn default_factor() -> f64 {
    2.0
}

/// 重试策略
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum RetryPolicy {
    /// 不重试
    #[default]
    None,
    /// 固定间隔重试 `attempts` 次
    Fixed {
        attempts: u32,
        #[serde(default)]
        delay_ms: u64,
    },
    /// 指数退避重试 `attempts` 次
    Backoff {
        attempts: u32,
        #[serde(default = "default_initial_ms")]
        initial_ms: u64,
        #[serde(default = "default_factor")]
        factor: f64,
    },
}

impl RetryPolicy {
    /// 首次失败后最多重试的次数
    pub fn retries(&self) -> u32 {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Fixed { attempts, .. } | RetryPolicy::Backoff { attempts, .. } => {
                *attempts
            }
        }
    }

    /// 第 `retry` 次重试（从 1 开始）前的等待时间
    pub fn delay(&self, retry: u32) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { delay_ms, .. } => Duration::from_millis(*delay_ms),
            RetryPolicy::Backoff {
                initial_ms, factor, ..
            } => {
                let exp = retry.saturating_sub(1) as i32;
                let ms = *initial_ms as f64 * factor.max(1.0).powi(exp);
                Duration::from_millis(ms.min(u64::MAX as f64) as u64)
            }
        }
    }

    /// 执行 `op`，瞬时错误按策略重试
    ///
    /// 返回最终结果和实际尝试次数。
    pub fn run<T, F>(&self, label: &str, mut op: F) -> (Result<T, EngineError>, u32)
    where
        F: FnMut() -> Result<T, EngineError>,
    {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return (Ok(value), attempt),
                Err(e) if e.is_transient() && attempt <= self.retries() => {
                    let delay = self.delay(attempt);
                    warn!(
                        point = label,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient engine error, retrying: {}",
                        e
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(e) => return (Err(e), attempt),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_none_never_retries() {
        let calls = Cell::new(0);
        let (result, attempts) = RetryPolicy::None.run("p", || -> Result<(), EngineError> {
            calls.set(calls.get() + 1);
            Err(EngineError::Convergence("no".into()))
        });
        assert!(result.is_err());
        assert_eq!(attempts, 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_fixed_retries_transient_until_success() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::Fixed {
            attempts: 3,
            delay_ms: 0,
        };
        let (result, attempts) = policy.run("p", || {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(EngineError::Timeout("slow".into()))
            } else {
                Ok(42)
            }
        });
        assert_eq!(result, Ok(42));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_fixed_gives_up_after_attempts() {
        let policy = RetryPolicy::Fixed {
            attempts: 2,
            delay_ms: 0,
        };
        let (result, attempts) =
            policy.run("p", || -> Result<(), EngineError> { Err(EngineError::Convergence("no".into())) });
        assert!(result.is_err());
        assert_eq!(attempts, 3);
    }

    #[test]
    fn test_non_transient_is_not_retried() {
        let policy = RetryPolicy::Fixed {
            attempts: 5,
            delay_ms: 0,
        };
        let (result, attempts) = policy.run("p", || -> Result<(), EngineError> {
            Err(EngineError::Session("license expired".into()))
        });
        assert_eq!(result, Err(EngineError::Session("license expired".into())));
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_backoff_delays_grow() {
        let policy = RetryPolicy::Backoff {
            attempts: 3,
            initial_ms: 100,
            factor: 2.0,
        };
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
    }

    #[test]
    fn test_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            retry: RetryPolicy,
        }
        let w: Wrapper = toml::from_str("[retry]\npolicy = \"backoff\"\nattempts = 2\n").unwrap();
        assert_eq!(
            w.retry,
            RetryPolicy::Backoff {
                attempts: 2,
                initial_ms: 1000,
                factor: 2.0
            }
        );
    }
}
