//! InferenceClient port - リモートのテキスト生成の抽象化
//!
//! core が必要とするのは「ターンを渡してテキストを受け取る」ことだけです。
//! タイムアウトとリトライは `decision::retry` が上に重ねるので、
//! 実装は 1 回の呼び出しで 1 回だけ試行します。

use async_trait::async_trait;

use crate::domain::{Role, TransportError, Turn};

/// InferenceRequest は 1 回の生成リクエスト（全ターンとサンプリング設定）
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl InferenceRequest {
    /// 最後の user ターンのテキスト
    pub fn last_user_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }
}

/// InferenceClient は会話から生成テキストを返すリモートサービス
///
/// # Thread Safety
/// - `Send + Sync` を要求（1 ラウンド内で両エージェントが同時に呼べる）
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// 応答の生成を 1 回だけ試みる
    async fn complete(&self, request: &InferenceRequest) -> Result<String, TransportError>;
}
