//! Errors - 聞き取りと設定のエラー分類
//!
//! - `TransportError`: 推論サービスがテキストを返せなかった
//! - `ParleyError`: core の呼び出し側が受け取るエラー

use std::time::Duration;

use thiserror::Error;

/// TransportError はリモート推論サービスとの通信エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Request(String),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    /// リトライ層の全試行が失敗（`last` は最後の原因）
    #[error("no response after {attempts} attempts (last error: {last})")]
    Exhausted { attempts: u32, last: Box<TransportError> },
}

/// ParleyError は core のドメインエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParleyError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("no decision could be extracted after {prompts} prompts")]
    AmbiguousResponse { prompts: u32 },

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

impl ParleyError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ParleyError::ConfigurationInvalid(message.into())
    }
}
