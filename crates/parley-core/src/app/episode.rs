//! EpisodeOrchestrator - 1 ピリオド分のラウンドと振り返り
//!
//! 最終ラウンドの後、両エージェントに振り返りを並行して依頼します（抽出はしない）。
//! ピリオドの間ではコンテキストを system ターンまでリセットでき、
//! 振り返りが成功していればそれを新しいコンテキストへ持ち越します。

use tracing::{info, warn};

use crate::agent::Agent;
use crate::decision::{DecisionExtractor, KeywordExtractor, RetryPolicy};
use crate::domain::{EpisodeRecord, GameConfig, TransportError};
use crate::prompt::{carried_reflection, reflection_prompt};

use super::round::RoundOrchestrator;

pub struct EpisodeOrchestrator<E = KeywordExtractor> {
    config: GameConfig,
    rounds: RoundOrchestrator<E>,
}

impl EpisodeOrchestrator<KeywordExtractor> {
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(RoundOrchestrator::from_config(config), config)
    }
}

impl<E: DecisionExtractor> EpisodeOrchestrator<E> {
    pub fn new(rounds: RoundOrchestrator<E>, config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
            rounds,
        }
    }

    /// ゲーム通算スコア（agent 0 が先）
    pub fn scores(&self) -> [i64; 2] {
        self.rounds.scores()
    }

    /// ピリオド `episode`（1 始まり）を最後まで実行
    ///
    /// 最終ピリオドでなく、リセットが有効なら、終了後に両方のコンテキストを
    /// リセットします。
    pub async fn play(&mut self, agents: &mut [Agent; 2], episode: usize) -> EpisodeRecord {
        info!(episode, rounds = self.config.rounds_per_episode, "period started");
        for agent in agents.iter_mut() {
            agent.begin_episode();
        }

        let mut rounds = Vec::with_capacity(self.config.rounds_per_episode);
        for round_in_episode in 1..=self.config.rounds_per_episode {
            rounds.push(self.rounds.play(agents, episode, round_in_episode).await);
        }

        let reflections = self.reflect(agents, episode).await;
        let texts = reflections.each_ref().map(|reflection| match reflection {
            Ok(text) => text.clone(),
            Err(err) => format!("[NO REFLECTION: {err}]"),
        });
        let record = EpisodeRecord::new(episode, rounds, texts);
        info!(
            episode,
            score_0 = record.agents[0].episode_score,
            score_1 = record.agents[1].episode_score,
            cooperation_0 = record.agents[0].cooperation_rate,
            cooperation_1 = record.agents[1].cooperation_rate,
            "period complete"
        );

        if self.config.reset_between_episodes && episode < self.config.num_episodes {
            for (agent, reflection) in agents.iter_mut().zip(&reflections) {
                // 振り返りに失敗したら何も持ち越さない
                let carried = match reflection {
                    Ok(text) if self.config.carry_reflection => Some(carried_reflection(episode, text)),
                    _ => None,
                };
                agent.reset_context(carried);
            }
        }
        record
    }

    async fn reflect(
        &self,
        agents: &mut [Agent; 2],
        episode: usize,
    ) -> [Result<String, TransportError>; 2] {
        let policy = RetryPolicy::from_config(&self.config);
        let [a0, a1] = agents;
        let p0 = self.prompt_for(a0, episode);
        let p1 = self.prompt_for(a1, episode);

        let (r0, r1) = tokio::join!(
            reflect_one(a0, p0, self.config.reflection_token_limit, &policy),
            reflect_one(a1, p1, self.config.reflection_token_limit, &policy),
        );
        [r0, r1]
    }

    fn prompt_for(&self, agent: &Agent, episode: usize) -> String {
        reflection_prompt(
            episode,
            self.config.rounds_per_episode,
            agent.episode_history(),
            &self.config.reflection,
            &self.config.payoffs,
        )
    }
}

async fn reflect_one(
    agent: &mut Agent,
    prompt: String,
    max_tokens: u32,
    policy: &RetryPolicy,
) -> Result<String, TransportError> {
    let reflection = agent.ask(prompt, max_tokens, policy).await;
    if let Err(err) = &reflection {
        warn!(agent = %agent.id(), error = %err, "reflection failed");
    }
    reflection
}
