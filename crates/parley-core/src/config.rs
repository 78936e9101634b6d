//! Config - 実験設定ファイル（TOML）
//!
//! ```toml
//! [game]
//! num_episodes = 5
//! rounds_per_episode = 20
//!
//! [game.payoffs]
//! temptation = 5
//! reward = 3
//! punishment = 1
//! sucker = 0
//!
//! [game.reflection]
//! style = "custom"
//! template_path = "reflection.txt"
//!
//! [[agents]]
//! model = "llama3:8b-instruct-q5_K_M"
//! endpoint = "http://localhost:11434"
//!
//! [[agents]]
//! model = "mistral:7b-instruct"
//! endpoint = "http://gpu-box:11434"
//! temperature = 1.0
//! ```
//!
//! 相対パスは設定ファイルのあるディレクトリを基準に解決します。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::{AgentId, AgentIdentity, GameConfig, ParleyError, ReflectionStyle};
use crate::prompt::default_system_prompt;

pub const DEFAULT_MODEL: &str = "llama3:8b-instruct-q5_K_M";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ParleyError),
}

/// `[[agents]]` テーブル 1 つ分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// 省略時は `agent_<seat>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AgentId>,

    #[serde(default = "AgentSpec::default_model")]
    pub model: String,

    #[serde(default = "AgentSpec::default_endpoint")]
    pub endpoint: String,

    #[serde(default = "AgentSpec::default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// 読み込み時に `system_prompt` へ展開される
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<PathBuf>,
}

impl AgentSpec {
    fn default_model() -> String {
        DEFAULT_MODEL.to_string()
    }

    fn default_endpoint() -> String {
        DEFAULT_ENDPOINT.to_string()
    }

    const fn default_temperature() -> f32 {
        0.7
    }
}

impl Default for AgentSpec {
    fn default() -> Self {
        Self {
            id: None,
            model: Self::default_model(),
            endpoint: Self::default_endpoint(),
            temperature: Self::default_temperature(),
            system_prompt: None,
            system_prompt_path: None,
        }
    }
}

/// Preset はよく使う実験設計に名前を付けたもの
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// 20 ラウンド × 5 ピリオド、リセットあり、standard 振り返り
    Baseline,
    /// 10 ラウンド × 10 ピリオド、minimal 振り返り
    ShortLearning,
    /// 50 ラウンド × 3 ピリオド、リセットなし、detailed 振り返り
    LongContext,
    /// baseline を temperature 1.0 で
    HighExploration,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Baseline,
        Preset::ShortLearning,
        Preset::LongContext,
        Preset::HighExploration,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Baseline => "baseline",
            Preset::ShortLearning => "short_learning",
            Preset::LongContext => "long_context",
            Preset::HighExploration => "high_exploration",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// ExperimentConfig は設定ファイル全体（ゲームパラメータと 2 つの席）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub game: GameConfig,

    #[serde(default = "ExperimentConfig::default_agents")]
    pub agents: Vec<AgentSpec>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            agents: Self::default_agents(),
        }
    }
}

impl ExperimentConfig {
    fn default_agents() -> Vec<AgentSpec> {
        vec![AgentSpec::default(), AgentSpec::default()]
    }

    pub fn preset(preset: Preset) -> Self {
        let mut config = Self::default();
        let game = &mut config.game;
        match preset {
            Preset::Baseline => {}
            Preset::ShortLearning => {
                game.num_episodes = 10;
                game.rounds_per_episode = 10;
                game.reflection.style = ReflectionStyle::Minimal;
            }
            Preset::LongContext => {
                game.num_episodes = 3;
                game.rounds_per_episode = 50;
                game.reset_between_episodes = false;
                game.reflection.style = ReflectionStyle::Detailed;
            }
            Preset::HighExploration => {
                for agent in &mut config.agents {
                    agent.temperature = 1.0;
                }
            }
        }
        config
    }

    /// `path` を読み込み、パースし、参照ファイルを解決して検証
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_files(base_dir)?;
        config.validate()?;
        Ok(config)
    }

    /// 参照ファイル（custom 振り返りテンプレート、システムプロンプト）を読み込む
    ///
    /// 振り返りテンプレートが読めなくても致命的ではなく、`standard` にフォールバックします。
    /// システムプロンプトのファイルが読めない場合はエラーです。
    pub fn resolve_files(&mut self, base_dir: &Path) -> Result<(), ConfigError> {
        let reflection = &mut self.game.reflection;
        if reflection.style == ReflectionStyle::Custom
            && reflection.template.is_none()
            && let Some(template_path) = &reflection.template_path
        {
            let full = base_dir.join(template_path);
            match std::fs::read_to_string(&full) {
                Ok(text) => reflection.template = Some(text),
                Err(err) => {
                    warn!(
                        path = %full.display(),
                        error = %err,
                        "reflection template unreadable, falling back to standard"
                    );
                    reflection.style = ReflectionStyle::Standard;
                }
            }
        }

        for agent in &mut self.agents {
            if agent.system_prompt.is_none()
                && let Some(prompt_path) = &agent.system_prompt_path
            {
                let full = base_dir.join(prompt_path);
                let text = std::fs::read_to_string(&full)
                    .map_err(|source| ConfigError::Io { path: full, source })?;
                agent.system_prompt = Some(text);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        if self.agents.len() != 2 {
            return Err(ParleyError::invalid(format!(
                "exactly 2 [[agents]] tables are required, found {}",
                self.agents.len()
            ))
            .into());
        }
        for (seat, agent) in self.agents.iter().enumerate() {
            if agent.model.trim().is_empty() {
                return Err(ParleyError::invalid(format!("agent {seat} has an empty model name")).into());
            }
            if !agent.temperature.is_finite() || agent.temperature < 0.0 {
                return Err(ParleyError::invalid(format!(
                    "agent {seat} temperature must be a non-negative number, got {}",
                    agent.temperature
                ))
                .into());
            }
        }
        Ok(())
    }

    /// 両席の AgentIdentity を作る。システムプロンプトが無い席には
    /// 設定された利得から生成したデフォルトを使う
    pub fn identities(&self) -> Result<[AgentIdentity; 2], ConfigError> {
        self.validate()?;
        let identity = |seat: usize| {
            let agent = &self.agents[seat];
            AgentIdentity::new(
                agent.id.clone().unwrap_or_else(|| AgentId::seat(seat)),
                agent.model.clone(),
                agent.endpoint.clone(),
                agent.temperature,
                agent.system_prompt
                    .clone()
                    .unwrap_or_else(|| default_system_prompt(&self.game.payoffs)),
            )
        };
        Ok([identity(0), identity(1)])
    }
}
