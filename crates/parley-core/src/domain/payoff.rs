//! PayoffMatrix - 同時手番ジレンマの利得表

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::errors::ParleyError;

/// 4 つの利得値（T, R, P, S）
///
/// 生成は [`PayoffMatrix::new`] 経由のみで、ジレンマの順序条件を強制します。
/// デシリアライズも同じ検査を通ります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPayoffs", into = "RawPayoffs")]
pub struct PayoffMatrix {
    temptation: i32,
    reward: i32,
    punishment: i32,
    sucker: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPayoffs {
    temptation: i32,
    reward: i32,
    punishment: i32,
    sucker: i32,
}

impl PayoffMatrix {
    /// 検証済みの利得表を作成
    ///
    /// `T > R > P > S` かつ `2R > T + S` が必要
    pub fn new(temptation: i32, reward: i32, punishment: i32, sucker: i32) -> Result<Self, ParleyError> {
        if !(temptation > reward && reward > punishment && punishment > sucker) {
            return Err(ParleyError::ConfigurationInvalid(format!(
                "payoffs must satisfy T > R > P > S (got T={temptation}, R={reward}, P={punishment}, S={sucker})"
            )));
        }
        if 2 * i64::from(reward) <= i64::from(temptation) + i64::from(sucker) {
            return Err(ParleyError::ConfigurationInvalid(format!(
                "payoffs must satisfy 2R > T + S (got 2*{reward} <= {temptation} + {sucker})"
            )));
        }
        Ok(Self {
            temptation,
            reward,
            punishment,
            sucker,
        })
    }

    pub fn temptation(&self) -> i32 {
        self.temptation
    }

    pub fn reward(&self) -> i32 {
        self.reward
    }

    pub fn punishment(&self) -> i32 {
        self.punishment
    }

    pub fn sucker(&self) -> i32 {
        self.sucker
    }

    /// `(first, second)` の利得の組（同じ順序で返す）
    pub fn payoffs(&self, first: Action, second: Action) -> (i32, i32) {
        match (first, second) {
            (Action::Cooperate, Action::Cooperate) => (self.reward, self.reward),
            (Action::Cooperate, Action::Defect) => (self.sucker, self.temptation),
            (Action::Defect, Action::Cooperate) => (self.temptation, self.sucker),
            (Action::Defect, Action::Defect) => (self.punishment, self.punishment),
        }
    }

    /// 1 ラウンドで得られる最大の利得
    pub fn max_per_round(&self) -> i32 {
        self.temptation
    }

    /// 1 ラウンドで得られる最小の利得
    pub fn min_per_round(&self) -> i32 {
        self.sucker
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self {
            temptation: 5,
            reward: 3,
            punishment: 1,
            sucker: 0,
        }
    }
}

impl TryFrom<RawPayoffs> for PayoffMatrix {
    type Error = ParleyError;

    fn try_from(raw: RawPayoffs) -> Result<Self, Self::Error> {
        Self::new(raw.temptation, raw.reward, raw.punishment, raw.sucker)
    }
}

impl From<PayoffMatrix> for RawPayoffs {
    fn from(m: PayoffMatrix) -> Self {
        Self {
            temptation: m.temptation,
            reward: m.reward,
            punishment: m.punishment,
            sucker: m.sucker,
        }
    }
}
