//! Records - ゲーム中に生成される記録
//!
//! core の出力境界です。一度作ったら変更せず、外部でも保存・分析できるよう
//! シリアライズ可能にしています。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::ids::{AgentId, GameId};

/// 1 人の席から見た 1 ラウンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub my_action: Action,
    pub opp_action: Action,
    pub my_payoff: i32,
    pub opp_payoff: i32,
}

/// Resolution は行動の得られ方
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// 最初のプロンプトで明確な決定が得られた
    Clear,
    /// `retries` 回の強制プロンプトの後に明確な決定が得られた
    Forced { retries: u32 },
    /// 聞き取りに失敗し、設定されたフォールバック行動を使った
    Fallback { cause: String },
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }

    pub fn is_forced(&self) -> bool {
        matches!(self, Resolution::Forced { .. })
    }
}

/// Move は 1 ラウンドのうち 1 人分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub action: Action,
    pub payoff: i32,
    /// このラウンド後のゲーム通算スコア
    pub score: i64,
    pub reasoning: String,
    pub resolution: Resolution,
}

/// RoundRecord は終了したラウンド（`moves[0]` が agent 0、`moves[1]` が agent 1）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// ゲーム全体での番号（1 始まり）
    pub round: usize,
    /// エピソード番号（1 始まり）
    pub episode: usize,
    /// エピソード内での番号（1 始まり）
    pub round_in_episode: usize,
    pub moves: [Move; 2],
}

impl RoundRecord {
    /// 席 `seat`（0 か 1）から見たラウンド
    pub fn history_entry(&self, seat: usize) -> HistoryEntry {
        let me = &self.moves[seat];
        let opp = &self.moves[1 - seat];
        HistoryEntry {
            my_action: me.action,
            opp_action: opp.action,
            my_payoff: me.payoff,
            opp_payoff: opp.payoff,
        }
    }
}

/// 1 エピソード分のエージェント別集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeAgentStats {
    pub episode_score: i64,
    pub cooperations: usize,
    pub cooperation_rate: f64,
    pub reflection: String,
}

/// EpisodeRecord は終了したエピソードとそのラウンド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// エピソード番号（1 始まり）
    pub episode: usize,
    pub agents: [EpisodeAgentStats; 2],
    pub rounds: Vec<RoundRecord>,
}

impl EpisodeRecord {
    pub fn new(episode: usize, rounds: Vec<RoundRecord>, reflections: [String; 2]) -> Self {
        let [r0, r1] = reflections;
        let stats = |seat: usize, reflection: String| {
            let cooperations = rounds
                .iter()
                .filter(|r| r.moves[seat].action.is_cooperate())
                .count();
            EpisodeAgentStats {
                episode_score: rounds.iter().map(|r| i64::from(r.moves[seat].payoff)).sum(),
                cooperations,
                cooperation_rate: rate(cooperations, rounds.len()),
                reflection,
            }
        };
        let agents = [stats(0, r0), stats(1, r1)];
        Self {
            episode,
            agents,
            rounds,
        }
    }
}

/// AgentSummary はゲーム終了時のエージェント別集計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: AgentId,
    pub model: String,
    pub final_score: i64,
    pub cooperations: usize,
    pub cooperation_rate: f64,
    pub forced_decisions: usize,
    pub fallbacks: usize,
    /// 最終エピソードの振り返り
    pub reflection: String,
}

/// GameResult は終了したゲームの成果物すべて
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: GameId,
    pub timestamp: DateTime<Utc>,
    pub total_rounds: usize,
    pub elapsed_seconds: f64,
    pub agents: [AgentSummary; 2],
    pub episodes: Vec<EpisodeRecord>,
}

impl GameResult {
    /// 実行順の全ラウンド
    pub fn rounds(&self) -> impl Iterator<Item = &RoundRecord> {
        self.episodes.iter().flat_map(|e| e.rounds.iter())
    }
}

/// `count / total`（total が 0 なら 0.0）
pub(crate) fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(action: Action, payoff: i32, score: i64) -> Move {
        Move {
            action,
            payoff,
            score,
            reasoning: String::new(),
            resolution: Resolution::Clear,
        }
    }

    fn round(n: usize, a: (Action, i32), b: (Action, i32)) -> RoundRecord {
        RoundRecord {
            round: n,
            episode: 1,
            round_in_episode: n,
            moves: [mv(a.0, a.1, 0), mv(b.0, b.1, 0)],
        }
    }

    #[test]
    fn history_entry_is_perspective_swapped() {
        let r = round(1, (Action::Cooperate, 0), (Action::Defect, 5));
        let e0 = r.history_entry(0);
        let e1 = r.history_entry(1);
        assert_eq!(e0.my_action, Action::Cooperate);
        assert_eq!(e0.opp_payoff, 5);
        assert_eq!(e1.my_action, Action::Defect);
        assert_eq!(e1.my_payoff, 5);
        assert_eq!(e1.opp_action, e0.my_action);
    }

    #[test]
    fn episode_stats_aggregate_rounds() {
        let rounds = vec![
            round(1, (Action::Cooperate, 3), (Action::Cooperate, 3)),
            round(2, (Action::Cooperate, 0), (Action::Defect, 5)),
            round(3, (Action::Defect, 1), (Action::Defect, 1)),
            round(4, (Action::Cooperate, 3), (Action::Cooperate, 3)),
        ];
        let ep = EpisodeRecord::new(1, rounds, ["r0".into(), "r1".into()]);
        assert_eq!(ep.agents[0].episode_score, 7);
        assert_eq!(ep.agents[1].episode_score, 12);
        assert_eq!(ep.agents[0].cooperations, 3);
        assert_eq!(ep.agents[0].cooperation_rate, 0.75);
        assert_eq!(ep.agents[1].cooperation_rate, 0.5);
        assert_eq!(ep.agents[1].reflection, "r1");
    }

    #[test]
    fn resolution_is_tagged() {
        let v = serde_json::to_value(Resolution::Forced { retries: 2 }).unwrap();
        assert_eq!(v["kind"], "forced");
        assert_eq!(v["retries"], 2);
    }

    #[test]
    fn rate_handles_empty_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(1, 4), 0.25);
    }
}
