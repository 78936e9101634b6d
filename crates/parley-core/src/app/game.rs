//! Game - 全ピリオドの実行と結果レコードの組み立て

use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::agent::Agent;
use crate::decision::{DecisionExtractor, KeywordExtractor};
use crate::domain::{AgentSummary, EpisodeRecord, GameConfig, GameResult, records};
use crate::ports::{Clock, IdGenerator};

use super::episode::EpisodeOrchestrator;

/// Game は組み立て済みのゲーム
///
/// [`super::GameBuilder`] で構築し、[`Game::play`] で消費します。
pub struct Game<E = KeywordExtractor> {
    pub(crate) config: GameConfig,
    pub(crate) agents: [Agent; 2],
    pub(crate) episodes: EpisodeOrchestrator<E>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl<E: DecisionExtractor> Game<E> {
    pub fn agents(&self) -> &[Agent; 2] {
        &self.agents
    }

    /// 全ピリオドを順に実行し、記録を返す
    pub async fn play(mut self) -> GameResult {
        let game_id = self.ids.generate_game_id();
        let timestamp = self.clock.now();
        let started = Instant::now();
        info!(
            %game_id,
            agent_0 = %self.agents[0].identity().model,
            agent_1 = %self.agents[1].identity().model,
            episodes = self.config.num_episodes,
            rounds_per_episode = self.config.rounds_per_episode,
            "game started"
        );

        let mut episodes = Vec::with_capacity(self.config.num_episodes);
        for episode in 1..=self.config.num_episodes {
            episodes.push(self.episodes.play(&mut self.agents, episode).await);
        }

        let scores = self.episodes.scores();
        let agents = [
            summarize(&self.agents[0], 0, scores[0], &episodes),
            summarize(&self.agents[1], 1, scores[1], &episodes),
        ];
        let elapsed_seconds = started.elapsed().as_secs_f64();
        info!(
            %game_id,
            score_0 = scores[0],
            score_1 = scores[1],
            elapsed_seconds,
            "game complete"
        );

        GameResult {
            game_id,
            timestamp,
            total_rounds: self.config.total_rounds(),
            elapsed_seconds,
            agents,
            episodes,
        }
    }
}

fn summarize(agent: &Agent, seat: usize, final_score: i64, episodes: &[EpisodeRecord]) -> AgentSummary {
    let moves: Vec<_> = episodes
        .iter()
        .flat_map(|e| e.rounds.iter())
        .map(|r| &r.moves[seat])
        .collect();
    let cooperations = moves.iter().filter(|m| m.action.is_cooperate()).count();
    AgentSummary {
        id: agent.id().clone(),
        model: agent.identity().model.clone(),
        final_score,
        cooperations,
        cooperation_rate: records::rate(cooperations, moves.len()),
        forced_decisions: moves.iter().filter(|m| m.resolution.is_forced()).count(),
        fallbacks: moves.iter().filter(|m| m.resolution.is_fallback()).count(),
        reflection: episodes
            .last()
            .map(|e| e.agents[seat].reflection.clone())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GameBuilder;
    use crate::domain::{AgentId, AgentIdentity, Resolution, Role};
    use crate::impls::ScriptedClient;
    use crate::ports::{FixedClock, InferenceClient};
    use chrono::{TimeZone, Utc};

    fn config(episodes: usize, rounds: usize) -> GameConfig {
        GameConfig {
            num_episodes: episodes,
            rounds_per_episode: rounds,
            transport_attempts: 1,
            transport_retry_delay_ms: 0,
            ..GameConfig::default()
        }
    }

    fn identity(i: usize) -> AgentIdentity {
        AgentIdentity::new(AgentId::seat(i), format!("model-{i}"), "http://localhost:11434", 0.7, "sys")
    }

    fn game(config: GameConfig, c0: Arc<dyn InferenceClient>, c1: Arc<dyn InferenceClient>) -> Game {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        GameBuilder::new(config)
            .agent(identity(0), c0)
            .agent(identity(1), c1)
            .clock(Arc::new(FixedClock::new(at)))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn always_cooperating_game_scores_reward_every_round() {
        let result = game(
            config(1, 3),
            Arc::new(ScriptedClient::repeating("COOPERATE")),
            Arc::new(ScriptedClient::repeating("COOPERATE")),
        )
        .play()
        .await;

        assert_eq!(result.total_rounds, 3);
        assert_eq!(result.rounds().count(), 3);
        for summary in &result.agents {
            assert_eq!(summary.final_score, 9);
            assert_eq!(summary.cooperations, 3);
            assert_eq!(summary.cooperation_rate, 1.0);
            assert_eq!(summary.fallbacks, 0);
        }
        assert_eq!(result.agents[1].model, "model-1");
        assert_eq!(
            result.timestamp,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
        );
        assert!(result.game_id.to_string().starts_with("game-"));
    }

    #[tokio::test]
    async fn rounds_are_numbered_across_periods() {
        let result = game(
            config(2, 3),
            Arc::new(ScriptedClient::repeating("DEFECT")),
            Arc::new(ScriptedClient::repeating("COOPERATE")),
        )
        .play()
        .await;

        let numbers: Vec<usize> = result.rounds().map(|r| r.round).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(result.episodes.len(), 2);
        assert_eq!(result.episodes[1].rounds[0].round_in_episode, 1);
        assert_eq!(result.agents[0].final_score, 30);
        assert_eq!(result.agents[1].final_score, 0);
        assert_eq!(result.agents[1].cooperation_rate, 1.0);
        let last = result.rounds().last().map(|r| r.moves[0].score);
        assert_eq!(last, Some(30));
    }

    #[tokio::test]
    async fn forced_and_fallback_decisions_are_counted() {
        // ラウンド 1: 曖昧→明確、ラウンド 2: 3 回とも曖昧
        let c0 = ScriptedClient::repeating("I am not sure")
            .with_reply("cooperate or defect?")
            .with_reply("DEFECT");
        let result = game(
            config(1, 2),
            Arc::new(c0),
            Arc::new(ScriptedClient::repeating("COOPERATE")),
        )
        .play()
        .await;

        let summary = &result.agents[0];
        assert_eq!(summary.forced_decisions, 1);
        assert_eq!(summary.fallbacks, 1);

        let moves: Vec<_> = result.rounds().map(|r| &r.moves[0]).collect();
        assert_eq!(moves[0].resolution, Resolution::Forced { retries: 1 });
        assert!(moves[0].reasoning.starts_with("[FORCED DECISION AFTER 1 RETRIES]"));
        assert!(moves[1].reasoning.starts_with("[FALLBACK TO DEFECT: "));
    }

    #[tokio::test]
    async fn final_reflection_is_reported() {
        let reflective = |text: &'static str| {
            Arc::new(ScriptedClient::responding(move |req| {
                if req.last_user_text().unwrap_or_default().contains("COMPLETE") {
                    Ok(text.to_string())
                } else {
                    Ok("COOPERATE".to_string())
                }
            }))
        };
        let client = reflective("trust pays");
        let result = game(config(2, 2), client.clone(), reflective("agreed")).play().await;

        assert_eq!(result.agents[0].reflection, "trust pays");
        assert_eq!(result.agents[1].reflection, "agreed");
        assert_eq!(result.episodes[0].agents[0].reflection, "trust pays");

        // ピリオド 2 はピリオド 1 の振り返りを持ち越した新しいコンテキストで始まる
        let requests = client.requests().await;
        let opening = requests
            .iter()
            .find(|r| r.last_user_text().is_some_and(|t| t.starts_with("PERIOD 2, ROUND 1:")))
            .map(|r| r.turns.iter().map(|t| t.role).collect::<Vec<_>>());
        assert_eq!(opening, Some(vec![Role::System, Role::User, Role::User]));
    }

    #[tokio::test]
    async fn result_serializes_to_json() {
        let result = game(
            config(1, 1),
            Arc::new(ScriptedClient::repeating("COOPERATE")),
            Arc::new(ScriptedClient::repeating("DEFECT")),
        )
        .play()
        .await;

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["agents"][0]["id"], "agent_0");
        assert_eq!(json["episodes"][0]["rounds"][0]["moves"][1]["action"], "DEFECT");
        assert_eq!(json["episodes"][0]["rounds"][0]["moves"][0]["resolution"]["kind"], "clear");
    }
}
