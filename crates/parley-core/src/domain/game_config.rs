//! GameConfig - エピソード構成、上限値、利得、方針
//!
//! 全フィールドに serde のデフォルトがあるので、設定ファイルには変えたい項目だけを
//! 書けば足ります。`validate()` が Fail-fast の関門で、これを通らない設定から
//! GameBuilder はゲームを組み立てません。

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::errors::ParleyError;
use super::payoff::PayoffMatrix;

/// ReflectionStyle はエピソード末の振り返りプロンプトの情報量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionStyle {
    /// スコアのみ
    Minimal,
    /// スコア、任意の統計、全ラウンドの一覧
    #[default]
    Standard,
    /// 結果の内訳、パーセンテージ付きの成績、全ラウンドの一覧
    Detailed,
    /// `{placeholder}` を含むユーザー定義テンプレート
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionConfig {
    #[serde(default)]
    pub style: ReflectionStyle,

    /// `style = "custom"` 用のテンプレートファイル（設定ローダーが読む）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_path: Option<PathBuf>,

    /// 解決済みのテンプレート本文
    #[serde(skip)]
    pub template: Option<String>,

    /// standard スタイルに平均と選択回数を含める
    #[serde(default = "default_true")]
    pub include_statistics: bool,
}

impl ReflectionConfig {
    pub fn new(style: ReflectionStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn custom(template: impl Into<String>) -> Self {
        Self {
            style: ReflectionStyle::Custom,
            template: Some(template.into()),
            ..Self::default()
        }
    }
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            style: ReflectionStyle::Standard,
            template_path: None,
            template: None,
            include_statistics: true,
        }
    }
}

/// GameConfig は 1 ゲーム分の検証済みパラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_num_episodes")]
    pub num_episodes: usize,

    #[serde(default = "GameConfig::default_rounds_per_episode")]
    pub rounds_per_episode: usize,

    /// ラウンドプロンプトに表示する過去ラウンド数
    #[serde(default = "GameConfig::default_history_window")]
    pub history_window: usize,

    #[serde(default = "GameConfig::default_decision_token_limit")]
    pub decision_token_limit: u32,

    #[serde(default = "GameConfig::default_reflection_token_limit")]
    pub reflection_token_limit: u32,

    /// 推論呼び出し 1 回あたりの締め切り（秒）
    #[serde(default = "GameConfig::default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 通信エラーとみなすまでの試行回数
    #[serde(default = "GameConfig::default_transport_attempts")]
    pub transport_attempts: u32,

    /// 試行間の固定待ち時間（ミリ秒）
    #[serde(default = "GameConfig::default_transport_retry_delay_ms")]
    pub transport_retry_delay_ms: u64,

    /// 曖昧な回答の後に出す強制プロンプトの回数
    #[serde(default = "GameConfig::default_forced_retries")]
    pub forced_retries: u32,

    #[serde(default)]
    pub payoffs: PayoffMatrix,

    #[serde(default = "default_true")]
    pub reset_between_episodes: bool,

    /// リセット後に振り返りを user ターンとして再注入する
    #[serde(default = "default_true")]
    pub carry_reflection: bool,

    #[serde(default)]
    pub reflection: ReflectionConfig,

    /// 聞き取りが失敗したときに割り当てる行動
    #[serde(default = "GameConfig::default_fallback_action")]
    pub fallback_action: Action,
}

fn default_true() -> bool {
    true
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_episodes: Self::default_num_episodes(),
            rounds_per_episode: Self::default_rounds_per_episode(),
            history_window: Self::default_history_window(),
            decision_token_limit: Self::default_decision_token_limit(),
            reflection_token_limit: Self::default_reflection_token_limit(),
            request_timeout_secs: Self::default_request_timeout_secs(),
            transport_attempts: Self::default_transport_attempts(),
            transport_retry_delay_ms: Self::default_transport_retry_delay_ms(),
            forced_retries: Self::default_forced_retries(),
            payoffs: PayoffMatrix::default(),
            reset_between_episodes: true,
            carry_reflection: true,
            reflection: ReflectionConfig::default(),
            fallback_action: Self::default_fallback_action(),
        }
    }
}

impl GameConfig {
    const fn default_num_episodes() -> usize {
        5
    }

    const fn default_rounds_per_episode() -> usize {
        20
    }

    const fn default_history_window() -> usize {
        10
    }

    const fn default_decision_token_limit() -> u32 {
        256
    }

    const fn default_reflection_token_limit() -> u32 {
        1024
    }

    const fn default_request_timeout_secs() -> u64 {
        60
    }

    const fn default_transport_attempts() -> u32 {
        3
    }

    const fn default_transport_retry_delay_ms() -> u64 {
        2_000
    }

    const fn default_forced_retries() -> u32 {
        2
    }

    const fn default_fallback_action() -> Action {
        Action::Defect
    }

    pub fn total_rounds(&self) -> usize {
        self.num_episodes * self.rounds_per_episode
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn transport_retry_delay(&self) -> Duration {
        Duration::from_millis(self.transport_retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ParleyError> {
        if self.num_episodes == 0 {
            return Err(ParleyError::invalid("num_episodes must be at least 1"));
        }
        if self.rounds_per_episode == 0 {
            return Err(ParleyError::invalid("rounds_per_episode must be at least 1"));
        }
        if self.history_window == 0 {
            return Err(ParleyError::invalid("history_window must be at least 1"));
        }
        if self.decision_token_limit == 0 || self.reflection_token_limit == 0 {
            return Err(ParleyError::invalid("token limits must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ParleyError::invalid("request_timeout_secs must be positive"));
        }
        if self.transport_attempts == 0 {
            return Err(ParleyError::invalid("transport_attempts must be at least 1"));
        }
        if self.reflection.style == ReflectionStyle::Custom
            && self.reflection.template.is_none()
            && self.reflection.template_path.is_none()
        {
            return Err(ParleyError::invalid(
                "reflection style 'custom' needs a template or template_path",
            ));
        }
        Ok(())
    }
}
