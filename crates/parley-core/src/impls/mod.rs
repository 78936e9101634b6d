//! Impls - `InferenceClient` の具体実装
//!
//! - **OllamaClient**: Ollama `/api/chat` 向け HTTP アダプタ（本番用）
//! - **ScriptedClient**: 決め打ち応答を返すインメモリ実装（テスト・ドライラン用）

pub mod ollama;
pub mod scripted;

pub use self::ollama::OllamaClient;
pub use self::scripted::ScriptedClient;
