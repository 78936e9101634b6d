//! parley-core
//!
//! 言語モデル同士で繰り返し囚人のジレンマを対戦させるエンジン。
//! 自由記述の応答を確定した行動に変換し、利得を計上し、
//! 各エージェントの会話コンテキストをラウンドごとに伸ばしていきます。
//!
//! # モジュール構成
//! - **domain**: 行動・利得・設定・会話・記録・エラー
//! - **ports**: 推論クライアント、Clock、IdGenerator
//! - **impls**: Ollama HTTP クライアントとスクリプト式のインメモリクライアント
//! - **decision**: キーワード抽出、通信リトライ、強制決定プロトコル
//! - **prompt**: システム・ラウンド・履歴ウィンドウ・振り返りのプロンプト
//! - **app**: ラウンド/エピソードのオーケストレーション、ゲーム本体と Builder
//! - **config**: TOML 実験設定ファイル

pub mod agent;
pub mod app;
pub mod config;
pub mod decision;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod prompt;

pub use agent::Agent;
pub use app::{BuildError, Game, GameBuilder};
pub use config::{AgentSpec, ConfigError, ExperimentConfig, Preset};
pub use domain::{Action, GameConfig, GameResult, ParleyError, PayoffMatrix, TransportError};
