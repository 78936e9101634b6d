//! ForcedDecisionProtocol - 強制決定プロトコル
//!
//! 1 人のエージェントを最初のプロンプトから終端の
//! [`ElicitationState`] まで進めます。聞く → 抽出する → 曖昧なら強制プロンプトで
//! 聞き直す、を強制回数の上限まで繰り返します。通信エラーはリトライ層で
//! 再試行済みなので、その時点で聞き取りを打ち切ります。

use tracing::{debug, warn};

use crate::agent::Agent;
use crate::domain::{Action, ElicitationState, GameConfig, ParleyError, Resolution};
use crate::prompt::FORCING_PROMPT;

use super::extractor::{DecisionExtractor, KeywordExtractor};
use super::retry::RetryPolicy;

/// Elicitation は 1 回の聞き取りの結果
#[derive(Debug, Clone, PartialEq)]
pub struct Elicitation {
    /// 常に終端状態（`Resolved` か `Failed`）
    pub state: ElicitationState,
    /// 最後に受け取った応答テキスト
    pub response: Option<String>,
    /// 送ったプロンプト数（最初の 1 回 + 強制プロンプト）
    pub prompts_issued: u32,
    /// 失敗理由（解決した場合は `None`）
    pub failure: Option<ParleyError>,
}

impl Elicitation {
    pub fn action(&self) -> Option<Action> {
        match self.state {
            ElicitationState::Resolved { action, .. } => Some(action),
            _ => None,
        }
    }

    /// 最終的な行動・推論テキスト・解決種別を返す
    ///
    /// 強制で得た回答には `[FORCED DECISION AFTER n RETRIES]` を前置します。
    /// 失敗した場合は `fallback` を採用し、テキストは
    /// `[FALLBACK TO <ACTION>: <cause>]` に最後の応答を続けたものになります。
    pub fn settle(self, fallback: Action) -> (Action, String, Resolution) {
        let response = self.response.unwrap_or_default();
        match self.state {
            ElicitationState::Resolved {
                action,
                forced_after: 0,
            } => (action, response, Resolution::Clear),
            ElicitationState::Resolved {
                action,
                forced_after,
            } => (
                action,
                format!("[FORCED DECISION AFTER {forced_after} RETRIES]\n{response}"),
                Resolution::Forced {
                    retries: forced_after,
                },
            ),
            ElicitationState::Initial | ElicitationState::RetryPrompting(_) | ElicitationState::Failed => {
                let cause = self
                    .failure
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "elicitation did not finish".to_string());
                let mut reasoning = format!("[FALLBACK TO {fallback}: {cause}]");
                if !response.is_empty() {
                    reasoning.push('\n');
                    reasoning.push_str(&response);
                }
                (fallback, reasoning, Resolution::Fallback { cause })
            }
        }
    }
}

/// ForcedDecisionProtocol は自由記述の応答を確定した行動に変える
///
/// # 学習ポイント
/// - 明示的な状態機械（`ElicitationState`）でループを駆動
/// - 抽出器を型パラメータ `E` で差し替え可能にする
#[derive(Debug, Clone)]
pub struct ForcedDecisionProtocol<E = KeywordExtractor> {
    extractor: E,
    max_forced_retries: u32,
    token_limit: u32,
    policy: RetryPolicy,
}

impl ForcedDecisionProtocol<KeywordExtractor> {
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            KeywordExtractor,
            config.forced_retries,
            config.decision_token_limit,
            RetryPolicy::from_config(config),
        )
    }
}

impl<E: DecisionExtractor> ForcedDecisionProtocol<E> {
    pub fn new(extractor: E, max_forced_retries: u32, token_limit: u32, policy: RetryPolicy) -> Self {
        Self {
            extractor,
            max_forced_retries,
            token_limit,
            policy,
        }
    }

    /// `prompt` から始めて `agent` の決定を聞き取る
    pub async fn run(&self, agent: &mut Agent, prompt: String) -> Elicitation {
        let mut state = ElicitationState::Initial;
        let mut response = None;
        let mut prompts_issued = 0;
        let mut next_prompt = prompt;

        loop {
            prompts_issued += 1;
            match agent.ask(next_prompt, self.token_limit, &self.policy).await {
                Ok(text) => {
                    let extraction = self.extractor.extract(&text);
                    debug!(agent = %agent.id(), prompts_issued, ?extraction, "response read");
                    state = state.on_extraction(extraction, self.max_forced_retries);
                    response = Some(text);
                }
                Err(err) => {
                    warn!(agent = %agent.id(), prompts_issued, error = %err, "elicitation failed on transport");
                    return Elicitation {
                        state: state.on_transport_failure(),
                        response,
                        prompts_issued,
                        failure: Some(err.into()),
                    };
                }
            }

            match state {
                ElicitationState::Resolved { .. } => {
                    return Elicitation {
                        state,
                        response,
                        prompts_issued,
                        failure: None,
                    };
                }
                ElicitationState::Failed => {
                    warn!(agent = %agent.id(), prompts_issued, "no clear decision after forcing");
                    return Elicitation {
                        state,
                        response,
                        prompts_issued,
                        failure: Some(ParleyError::AmbiguousResponse {
                            prompts: prompts_issued,
                        }),
                    };
                }
                ElicitationState::RetryPrompting(n) => {
                    warn!(
                        agent = %agent.id(),
                        attempt = n,
                        max = self.max_forced_retries,
                        "ambiguous response, forcing decision"
                    );
                    next_prompt = FORCING_PROMPT.to_string();
                }
                ElicitationState::Initial => next_prompt = FORCING_PROMPT.to_string(),
            }
        }
    }
}
