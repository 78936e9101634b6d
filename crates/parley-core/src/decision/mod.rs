//! Decision - 決定の聞き取り（抽出、通信リトライ、強制決定プロトコル）

pub mod extractor;
pub mod protocol;
pub mod retry;

pub use self::extractor::{DecisionExtractor, KeywordExtractor, extract_decision};
pub use self::protocol::{Elicitation, ForcedDecisionProtocol};
pub use self::retry::{RetryPolicy, complete_with_retry};
