//! Action - 各ラウンドで選べる行動

use std::fmt;

use serde::{Deserialize, Serialize};

/// 互いに排他な 2 つの手のどちらか
///
/// エージェントへの問いかけと同じ `COOPERATE` / `DEFECT` で記録されるよう、
/// SCREAMING_SNAKE_CASE でシリアライズします。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Cooperate,
    Defect,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Cooperate, Action::Defect];

    /// エージェントが最終行に書くべきキーワード
    pub fn keyword(self) -> &'static str {
        match self {
            Action::Cooperate => "COOPERATE",
            Action::Defect => "DEFECT",
        }
    }

    /// もう一方の行動のキーワード
    pub fn other(self) -> Action {
        match self {
            Action::Cooperate => Action::Defect,
            Action::Defect => Action::Cooperate,
        }
    }

    /// 履歴の文章で使う過去形（"You cooperated"）
    pub fn past_tense(self) -> &'static str {
        match self {
            Action::Cooperate => "cooperated",
            Action::Defect => "defected",
        }
    }

    pub fn is_cooperate(self) -> bool {
        matches!(self, Action::Cooperate)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Extraction は自由記述から決定を読み取った結果
///
/// 曖昧さはエラーではなく値です。聞き直すかどうかは呼び出し側が決めます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Clear(Action),
    Ambiguous,
}

impl Extraction {
    pub fn action(self) -> Option<Action> {
        match self {
            Extraction::Clear(action) => Some(action),
            Extraction::Ambiguous => None,
        }
    }
}
