//! Ports - 外部との境界
//!
//! core が直接依存してはいけないもの（リモート推論サービス、実時間、
//! ID 生成）をそれぞれ trait の背後に隠します。

pub mod clock;
pub mod id_generator;
pub mod inference;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::inference::{InferenceClient, InferenceRequest};
