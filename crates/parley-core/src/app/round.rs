//! RoundOrchestrator - 1 回の同時手番
//!
//! 両エージェントへの聞き取りは 1 つの join の中で並行に行います。
//! 利得・スコア・履歴に触れるのは、両者の行動が確定した後だけです。

use tracing::{info, warn};

use crate::agent::Agent;
use crate::decision::{DecisionExtractor, ForcedDecisionProtocol, KeywordExtractor};
use crate::domain::{Action, GameConfig, Move, PayoffMatrix, Resolution, RoundRecord};
use crate::prompt::round_prompt;

pub struct RoundOrchestrator<E = KeywordExtractor> {
    protocol: ForcedDecisionProtocol<E>,
    payoffs: PayoffMatrix,
    history_window: usize,
    rounds_per_episode: usize,
    fallback: Action,
    scores: [i64; 2],
}

impl RoundOrchestrator<KeywordExtractor> {
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(ForcedDecisionProtocol::from_config(config), config)
    }
}

impl<E: DecisionExtractor> RoundOrchestrator<E> {
    pub fn new(protocol: ForcedDecisionProtocol<E>, config: &GameConfig) -> Self {
        Self {
            protocol,
            payoffs: config.payoffs,
            history_window: config.history_window,
            rounds_per_episode: config.rounds_per_episode,
            fallback: config.fallback_action,
            scores: [0, 0],
        }
    }

    /// ゲーム通算スコア（agent 0 が先）
    pub fn scores(&self) -> [i64; 2] {
        self.scores
    }

    /// ピリオド `episode` のラウンド `round_in_episode` を実行
    ///
    /// どちらも 1 始まりで、0 は渡せません。
    pub async fn play(
        &mut self,
        agents: &mut [Agent; 2],
        episode: usize,
        round_in_episode: usize,
    ) -> RoundRecord {
        debug_assert!(episode >= 1 && round_in_episode >= 1, "period and round are 1-based");
        let round = (episode - 1) * self.rounds_per_episode + round_in_episode;
        let [a0, a1] = agents;

        let p0 = round_prompt(episode, round_in_episode, a0.episode_history(), self.history_window);
        let p1 = round_prompt(episode, round_in_episode, a1.episode_history(), self.history_window);

        let (e0, e1) = tokio::join!(self.protocol.run(a0, p0), self.protocol.run(a1, p1));

        let (act0, why0, res0) = e0.settle(self.fallback);
        let (act1, why1, res1) = e1.settle(self.fallback);
        for (agent, resolution) in [(&*a0, &res0), (&*a1, &res1)] {
            if let Resolution::Fallback { cause } = resolution {
                warn!(agent = %agent.id(), round, action = %self.fallback, %cause, "using fallback action");
            }
        }

        let (pay0, pay1) = self.payoffs.payoffs(act0, act1);
        self.scores[0] += i64::from(pay0);
        self.scores[1] += i64::from(pay1);

        let record = RoundRecord {
            round,
            episode,
            round_in_episode,
            moves: [
                Move {
                    action: act0,
                    payoff: pay0,
                    score: self.scores[0],
                    reasoning: why0,
                    resolution: res0,
                },
                Move {
                    action: act1,
                    payoff: pay1,
                    score: self.scores[1],
                    reasoning: why1,
                    resolution: res1,
                },
            ],
        };
        a0.record(record.history_entry(0));
        a1.record(record.history_entry(1));

        info!(
            round,
            episode,
            round_in_episode,
            agent_0 = %act0,
            agent_1 = %act1,
            payoff_0 = pay0,
            payoff_1 = pay1,
            score_0 = self.scores[0],
            score_1 = self.scores[1],
            "round complete"
        );
        record
    }
}
