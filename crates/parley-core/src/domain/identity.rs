//! AgentIdentity - 席の不変な記述

use serde::{Deserialize, Serialize};

use super::ids::AgentId;

/// エージェントが誰で、どのサービスに支えられているか。ゲーム中は変わらない
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub id: AgentId,
    pub model: String,
    /// 推論サービスのベース URL（例: `http://localhost:11434`）
    pub endpoint: String,
    pub temperature: f32,
    pub system_prompt: String,
}

impl AgentIdentity {
    pub fn new(
        id: AgentId,
        model: impl Into<String>,
        endpoint: impl Into<String>,
        temperature: f32,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id,
            model: model.into(),
            endpoint: endpoint.into(),
            temperature,
            system_prompt: system_prompt.into(),
        }
    }
}
