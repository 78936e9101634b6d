//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: タイムスタンプ部分を `Clock` から取る ULID（本番用）

use crate::domain::GameId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator はゲームの識別子を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_game_id(&self) -> GameId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// タイムスタンプ部分は Clock から取るので、`FixedClock` を使えば先頭が決まった ID になり、
/// ランダム部分で一意性を保ちます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_game_id(&self) -> GameId {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        GameId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{FixedClock, SystemClock};
    use chrono::{TimeZone, Utc};

    #[test]
    fn ulid_generator_generates_unique_ids() {
        let id_gen = UlidGenerator::new(SystemClock);

        let id1 = id_gen.generate_game_id();
        let id2 = id_gen.generate_game_id();

        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("game-"));
    }

    #[test]
    fn fixed_clock_pins_timestamp_part() {
        let fixed_time = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let id_gen = UlidGenerator::new(FixedClock::new(fixed_time));

        let id1 = id_gen.generate_game_id();
        let id2 = id_gen.generate_game_id();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
        assert_eq!(id2.as_ulid().timestamp_ms(), fixed_time.timestamp_millis() as u64);
    }
}
