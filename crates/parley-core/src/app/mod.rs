//! App - オーケストレーション層
//!
//! エージェント、強制決定プロトコル、プロンプト生成を組み合わせてゲームにします。
//!
//! # 主要コンポーネント
//! - **GameBuilder**: ワイヤリングと起動時検証（Fail-fast）
//! - **Game**: 全ピリオドを実行し、結果レコードを組み立てる
//! - **EpisodeOrchestrator**: ピリオド単位のラウンド実行・振り返り・コンテキストリセット
//! - **RoundOrchestrator**: 1 回の同時手番とその記帳

pub mod builder;
pub mod episode;
pub mod game;
pub mod round;

pub use self::builder::{BuildError, GameBuilder};
pub use self::episode::EpisodeOrchestrator;
pub use self::game::Game;
pub use self::round::RoundOrchestrator;
