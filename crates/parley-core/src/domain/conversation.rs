//! Conversation - エージェントごとのターンログ（毎リクエストで送信）

use serde::{Deserialize, Serialize};

/// ターンの発言者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Conversation は 1 人のエージェントが所有する追記専用のターンログ
///
/// # 不変条件
/// - system ターンは高々 1 つで、置けるのは先頭だけ
/// - 途中のターンは消さない。縮めるのは `reset` だけ
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    system_prompt: Option<String>,
    turns: Vec<Turn>,
}

impl Conversation {
    /// 会話を開始。空白だけのシステムプロンプトなら system ターンは作らない
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = Some(system_prompt.into()).filter(|s| !s.trim().is_empty());
        let turns = system_prompt
            .iter()
            .map(|s| Turn::new(Role::System, s.clone()))
            .collect();
        Self {
            system_prompt,
            turns,
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(Role::User, text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::new(Role::Assistant, text));
    }

    /// ログを消去。`keep_system` なら system ターンは残す
    pub fn reset(&mut self, keep_system: bool) {
        self.turns.clear();
        if keep_system && let Some(system) = &self.system_prompt {
            self.turns.push(Turn::new(Role::System, system.clone()));
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// 発言者を順に並べたもの（assert やデバッグログ用）
    pub fn roles(&self) -> Vec<Role> {
        self.turns.iter().map(|t| t.role).collect()
    }
}
