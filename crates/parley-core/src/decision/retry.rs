//! RetryPolicy - 推論呼び出しのタイムアウトとバックオフ

use std::time::Duration;

use tracing::warn;

use crate::domain::{AgentId, GameConfig, TransportError};
use crate::ports::{InferenceClient, InferenceRequest};

/// RetryPolicy は通信失敗時の再試行方針
///
/// ゲームでは固定間隔（`multiplier = 1.0`）を使い、設定ファイルもそれだけを
/// 公開しています。指数バックオフが欲しい呼び出し側のために multiplier を残しています。
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 初回を含む総試行回数（最低 1）
    pub max_attempts: u32,

    /// 2 回目の試行までの待ち時間
    pub base_delay: Duration,

    /// 試行ごとに掛けるバックオフ倍率
    pub multiplier: f64,

    /// 1 回の試行ごとの締め切り
    pub timeout: Duration,
}

impl RetryPolicy {
    /// 毎回同じ間隔で再試行
    pub fn fixed(max_attempts: u32, delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: delay,
            multiplier: 1.0,
            timeout,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::fixed(
            config.transport_attempts,
            config.transport_retry_delay(),
            config.request_timeout(),
        )
    }

    /// `attempts` 回失敗した後の待ち時間（1 始まり）
    ///
    /// delay = base_delay * multiplier^(attempts - 1)
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let base_secs = self.base_delay.as_secs_f64();
        let exponent = attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        Duration::from_secs_f64(base_secs * self.multiplier.powi(exponent))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

/// `client` が応答するか、方針の回数を使い切るまで呼び出す
///
/// タイムアウトも他の通信エラーと同じく 1 回の失敗として数えます。
/// 最後の試行の原因は [`TransportError::Exhausted`] に包んで返します。
pub async fn complete_with_retry(
    client: &dyn InferenceClient,
    request: &InferenceRequest,
    policy: &RetryPolicy,
    agent: &AgentId,
) -> Result<String, TransportError> {
    let mut last = TransportError::Request("no attempt made".to_string());
    for attempt in 1..=policy.max_attempts {
        let outcome = tokio::time::timeout(policy.timeout, client.complete(request)).await;
        let err = match outcome {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(err)) => err,
            Err(_elapsed) => TransportError::Timeout(policy.timeout),
        };
        warn!(
            agent = %agent,
            attempt,
            max_attempts = policy.max_attempts,
            error = %err,
            "inference call failed"
        );
        last = err;
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.next_delay(attempt)).await;
        }
    }
    Err(TransportError::Exhausted {
        attempts: policy.max_attempts,
        last: Box::new(last),
    })
}
