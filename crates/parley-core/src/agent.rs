//! Agent - 卓の一席
//!
//! 会話コンテキストと履歴エントリを排他的に所有します。
//! RoundOrchestrator は 1 回の聞き取りの間だけ各エージェントを可変借用するため、
//! 2 つの席が可変状態を共有することはありません。

use std::sync::Arc;

use tracing::debug;

use crate::decision::retry::{RetryPolicy, complete_with_retry};
use crate::domain::{AgentId, AgentIdentity, Conversation, HistoryEntry, TransportError};
use crate::ports::{InferenceClient, InferenceRequest};

pub struct Agent {
    identity: AgentIdentity,
    conversation: Conversation,
    history: Vec<HistoryEntry>,
    /// 現在のピリオドが始まる `history` 上の位置
    episode_start: usize,
    client: Arc<dyn InferenceClient>,
}

impl Agent {
    pub fn new(identity: AgentIdentity, client: Arc<dyn InferenceClient>) -> Self {
        let conversation = Conversation::new(identity.system_prompt.clone());
        Self {
            identity,
            conversation,
            history: Vec::new(),
            episode_start: 0,
            client,
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.identity.id
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// ゲーム開始からの全エントリ
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// 現在のピリオドのエントリのみ
    pub fn episode_history(&self) -> &[HistoryEntry] {
        &self.history[self.episode_start..]
    }

    pub(crate) fn begin_episode(&mut self) {
        self.episode_start = self.history.len();
    }

    pub(crate) fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// `prompt` を user ターンとして追加し、コンテキスト全体に対する応答を要求
    ///
    /// 成功時は応答を assistant ターンとして追加します。失敗時は user ターンが
    /// 残るだけで、それ以外は何も追加されません。
    pub async fn ask(
        &mut self,
        prompt: impl Into<String>,
        max_tokens: u32,
        policy: &RetryPolicy,
    ) -> Result<String, TransportError> {
        self.conversation.push_user(prompt);
        let request = InferenceRequest {
            model: self.identity.model.clone(),
            turns: self.conversation.turns().to_vec(),
            temperature: self.identity.temperature,
            max_tokens,
        };
        debug!(
            agent = %self.identity.id,
            turns = request.turns.len(),
            max_tokens,
            "requesting completion"
        );
        let text = complete_with_retry(self.client.as_ref(), &request, policy, &self.identity.id).await?;
        self.conversation.push_assistant(text.clone());
        Ok(text)
    }

    /// コンテキストを system ターンまで戻し、`carried` があれば user ターンとして続ける
    pub(crate) fn reset_context(&mut self, carried: Option<String>) {
        self.conversation.reset(true);
        if let Some(text) = carried {
            self.conversation.push_user(text);
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.identity.id)
            .field("model", &self.identity.model)
            .field("turns", &self.conversation.len())
            .field("history", &self.history.len())
            .finish()
    }
}
