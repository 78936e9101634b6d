//! Domain モデル（行動、利得、設定、会話、記録など）
//!
//! ここでは I/O を一切行いません。ports と app はこれらの型の上に構築されます。

pub mod action;
pub mod conversation;
pub mod errors;
pub mod game_config;
pub mod identity;
pub mod ids;
pub mod payoff;
pub mod records;
pub mod state;

pub use action::{Action, Extraction};
pub use conversation::{Conversation, Role, Turn};
pub use errors::{ParleyError, TransportError};
pub use game_config::{GameConfig, ReflectionConfig, ReflectionStyle};
pub use identity::AgentIdentity;
pub use ids::{AgentId, GameId};
pub use payoff::PayoffMatrix;
pub use records::{
    AgentSummary, EpisodeAgentStats, EpisodeRecord, GameResult, HistoryEntry, Move, Resolution,
    RoundRecord,
};
pub use state::ElicitationState;
