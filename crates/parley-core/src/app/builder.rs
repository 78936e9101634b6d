//! GameBuilder - ゲームの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: リクエストを 1 件も送る前に `build()` で弾く
//! - 型パラメータの差し替え（`extractor()` で `GameBuilder<X>` に変わる）

use std::sync::Arc;

use crate::agent::Agent;
use crate::decision::{DecisionExtractor, ForcedDecisionProtocol, KeywordExtractor, RetryPolicy};
use crate::domain::{AgentIdentity, GameConfig, ParleyError};
use crate::ports::{Clock, IdGenerator, InferenceClient, SystemClock, UlidGenerator};

use super::episode::EpisodeOrchestrator;
use super::game::Game;
use super::round::RoundOrchestrator;

/// GameBuilder は [`Game`] を構築
///
/// # 使用例
/// ```ignore
/// let game = GameBuilder::new(config)
///     .agent(identity_0, client_0)
///     .agent(identity_1, client_1)
///     .build()?;
/// let result = game.play().await;
/// ```
pub struct GameBuilder<E = KeywordExtractor> {
    config: GameConfig,
    extractor: E,
    agents: Vec<(AgentIdentity, Arc<dyn InferenceClient>)>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はゲーム構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("a game needs exactly 2 agents, got {0}")]
    AgentCount(usize),

    #[error(transparent)]
    InvalidConfig(#[from] ParleyError),
}

impl GameBuilder<KeywordExtractor> {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            extractor: KeywordExtractor,
            agents: Vec::with_capacity(2),
            clock: None,
            ids: None,
        }
    }
}

impl<E: DecisionExtractor> GameBuilder<E> {
    /// エージェントを着席させる。呼び出し順に agent 0、agent 1 の席が埋まる
    pub fn agent(mut self, identity: AgentIdentity, client: Arc<dyn InferenceClient>) -> Self {
        self.agents.push((identity, client));
        self
    }

    /// 別の DecisionExtractor を使う
    pub fn extractor<X: DecisionExtractor>(self, extractor: X) -> GameBuilder<X> {
        GameBuilder {
            config: self.config,
            extractor,
            agents: self.agents,
            clock: self.clock,
            ids: self.ids,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// 検証してすべてを組み立てる
    ///
    /// # エラー
    /// - `GameConfig::validate` が失敗したら `BuildError::InvalidConfig`
    /// - 着席がちょうど 2 人でなければ `BuildError::AgentCount`
    pub fn build(self) -> Result<Game<E>, BuildError> {
        self.config.validate()?;

        let [first, second]: [(AgentIdentity, Arc<dyn InferenceClient>); 2] = self
            .agents
            .try_into()
            .map_err(|agents: Vec<_>| BuildError::AgentCount(agents.len()))?;
        let agents = [Agent::new(first.0, first.1), Agent::new(second.0, second.1)];

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(clock.clone())));

        let protocol = ForcedDecisionProtocol::new(
            self.extractor,
            self.config.forced_retries,
            self.config.decision_token_limit,
            RetryPolicy::from_config(&self.config),
        );
        let rounds = RoundOrchestrator::new(protocol, &self.config);
        let episodes = EpisodeOrchestrator::new(rounds, &self.config);

        Ok(Game {
            config: self.config,
            agents,
            episodes,
            clock,
            ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, AgentId, Extraction};
    use crate::impls::ScriptedClient;

    struct AlwaysCooperate;

    impl DecisionExtractor for AlwaysCooperate {
        fn extract(&self, _response: &str) -> Extraction {
            Extraction::Clear(Action::Cooperate)
        }
    }

    fn identity(i: usize) -> AgentIdentity {
        AgentIdentity::new(AgentId::seat(i), "m", "http://localhost:11434", 0.7, "sys")
    }

    fn client() -> Arc<dyn InferenceClient> {
        Arc::new(ScriptedClient::repeating("COOPERATE"))
    }

    #[test]
    fn build_success() {
        let game = GameBuilder::new(GameConfig::default())
            .agent(identity(0), client())
            .agent(identity(1), client())
            .build()
            .unwrap();
        assert_eq!(game.agents()[1].id().as_str(), "agent_1");
    }

    #[tokio::test]
    async fn custom_extractor_decides_every_round() {
        let config = GameConfig {
            num_episodes: 1,
            rounds_per_episode: 3,
            ..GameConfig::default()
        };
        let defector: Arc<dyn InferenceClient> = Arc::new(ScriptedClient::repeating("DEFECT"));
        let result = GameBuilder::new(config)
            .extractor(AlwaysCooperate)
            .agent(identity(0), defector.clone())
            .agent(identity(1), defector)
            .build()
            .unwrap()
            .play()
            .await;

        for agent in &result.agents {
            assert_eq!(agent.final_score, 9);
            assert_eq!(agent.cooperation_rate, 1.0);
        }
    }

    #[test]
    fn build_with_one_agent_fails() {
        let err = GameBuilder::new(GameConfig::default())
            .agent(identity(0), client())
            .build()
            .err();
        assert!(matches!(err, Some(BuildError::AgentCount(1))));
    }

    #[test]
    fn build_with_three_agents_fails() {
        let err = GameBuilder::new(GameConfig::default())
            .agent(identity(0), client())
            .agent(identity(1), client())
            .agent(identity(2), client())
            .build()
            .err();
        assert!(matches!(err, Some(BuildError::AgentCount(3))));
    }

    #[test]
    fn invalid_config_is_rejected_before_play() {
        let config = GameConfig {
            num_episodes: 0,
            ..GameConfig::default()
        };
        let err = GameBuilder::new(config)
            .agent(identity(0), client())
            .agent(identity(1), client())
            .build()
            .err();
        assert!(matches!(
            err,
            Some(BuildError::InvalidConfig(ParleyError::ConfigurationInvalid(_)))
        ));
    }
}
