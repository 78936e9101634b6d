//! ドメイン識別子
//!
//! - `GameId` は ULID ベース（生成時刻でソート可能、調整なしで生成可能。
//!   `ports::id_generator` を参照）
//! - `AgentId` は人間向けの短いラベル（`agent_0`, `agent_1`）で、
//!   プロンプト・ログ・記録で使う

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// GameId は 1 回のゲームの識別子
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(Ulid);

impl GameId {
    const PREFIX: &'static str = "game-";

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for GameId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

/// AgentId は席のラベル
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 席 `index` のデフォルトラベル
    pub fn seat(index: usize) -> Self {
        Self(format!("agent_{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
