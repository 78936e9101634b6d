//! Prompt - プロンプト生成（すべて純粋な文字列組み立て）

pub mod history;
pub mod reflection;
pub mod system;

pub use self::history::{format_history_window, round_prompt};
pub use self::reflection::{carried_reflection, reflection_prompt};
pub use self::system::{FORCING_PROMPT, default_system_prompt, first_round_prompt};
