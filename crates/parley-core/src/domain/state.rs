//! ElicitationState - 1 ラウンド・1 エージェント分の聞き取り状態機械
//!
//! # 状態遷移
//! - Initial -> Resolved（最初のプロンプトで明確な回答）
//! - Initial -> RetryPrompting(1)（曖昧、強制可能）
//! - RetryPrompting(n) -> Resolved（強制プロンプトで明確な回答）
//! - RetryPrompting(n) -> RetryPrompting(n + 1)（曖昧、n < max）
//! - 非終端 -> Failed（通信エラー、または強制回数を使い切って曖昧）

use super::action::{Action, Extraction};

/// ElicitationState は聞き取りの現在位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElicitationState {
    /// 最初のプロンプトにまだ回答がない
    Initial,

    /// n 回目（1 始まり）の強制プロンプトを出すところ
    RetryPrompting(u32),

    /// 明確な行動が得られた。`forced_after` はそれまでに出した強制プロンプトの数
    /// （最初のプロンプトで決まったなら 0）
    Resolved { action: Action, forced_after: u32 },

    /// 行動が得られなかった（呼び出し側がフォールバックを適用）
    Failed,
}

impl ElicitationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ElicitationState::Resolved { .. } | ElicitationState::Failed
        )
    }

    /// この状態に至るまでに出した強制プロンプトの数
    fn forcing_issued(self) -> u32 {
        match self {
            ElicitationState::RetryPrompting(n) => n,
            _ => 0,
        }
    }

    /// 抽出器が応答を読んだ後に遷移
    pub fn on_extraction(self, extraction: Extraction, max_forced_retries: u32) -> Self {
        if self.is_terminal() {
            return self;
        }
        let issued = self.forcing_issued();
        match extraction {
            Extraction::Clear(action) => ElicitationState::Resolved {
                action,
                forced_after: issued,
            },
            Extraction::Ambiguous if issued < max_forced_retries => {
                ElicitationState::RetryPrompting(issued + 1)
            }
            Extraction::Ambiguous => ElicitationState::Failed,
        }
    }

    /// リトライしても推論呼び出しが失敗した後に遷移
    pub fn on_transport_failure(self) -> Self {
        if self.is_terminal() {
            return self;
        }
        ElicitationState::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn clear_primary_answer_resolves_unforced() {
        let s = ElicitationState::Initial.on_extraction(Extraction::Clear(Action::Defect), 2);
        assert_eq!(
            s,
            ElicitationState::Resolved {
                action: Action::Defect,
                forced_after: 0
            }
        );
    }

    #[test]
    fn ambiguity_walks_through_retries_then_fails() {
        let s = ElicitationState::Initial;
        let s = s.on_extraction(Extraction::Ambiguous, 2);
        assert_eq!(s, ElicitationState::RetryPrompting(1));
        let s = s.on_extraction(Extraction::Ambiguous, 2);
        assert_eq!(s, ElicitationState::RetryPrompting(2));
        let s = s.on_extraction(Extraction::Ambiguous, 2);
        assert_eq!(s, ElicitationState::Failed);
    }

    #[test]
    fn forced_resolution_records_retry_count() {
        let s = ElicitationState::RetryPrompting(2)
            .on_extraction(Extraction::Clear(Action::Cooperate), 3);
        assert_eq!(
            s,
            ElicitationState::Resolved {
                action: Action::Cooperate,
                forced_after: 2
            }
        );
    }

    #[test]
    fn zero_retries_fails_on_first_ambiguity() {
        let s = ElicitationState::Initial.on_extraction(Extraction::Ambiguous, 0);
        assert_eq!(s, ElicitationState::Failed);
    }

    #[rstest]
    #[case::initial(ElicitationState::Initial)]
    #[case::retrying(ElicitationState::RetryPrompting(1))]
    fn transport_failure_is_terminal(#[case] start: ElicitationState) {
        assert_eq!(start.on_transport_failure(), ElicitationState::Failed);
    }

    #[test]
    fn terminal_states_do_not_move() {
        let resolved = ElicitationState::Resolved {
            action: Action::Cooperate,
            forced_after: 0,
        };
        assert_eq!(resolved.on_extraction(Extraction::Ambiguous, 5), resolved);
        assert_eq!(resolved.on_transport_failure(), resolved);
        assert_eq!(
            ElicitationState::Failed.on_extraction(Extraction::Clear(Action::Defect), 5),
            ElicitationState::Failed
        );
    }
}
