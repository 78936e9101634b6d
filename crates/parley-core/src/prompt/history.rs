//! 履歴ウィンドウのフォーマッタ
//!
//! エージェントのエピソード内履歴の末尾を、ラウンドプロンプトに埋め込む
//! テキストに整形します。純粋関数（同じ入力なら同じ文字列）です。

use std::fmt::Write as _;

use crate::domain::HistoryEntry;

use super::system::first_round_prompt;

/// `history` 全体での両者の利得合計
pub fn totals(history: &[HistoryEntry]) -> (i64, i64) {
    history.iter().fold((0, 0), |(me, opp), e| {
        (me + i64::from(e.my_payoff), opp + i64::from(e.opp_payoff))
    })
}

/// `history` の末尾 `window` 件を 1 行ずつ
///
/// ラウンド番号は全体の中での位置（1 始まり）で、累計には表示されない
/// 古いエントリも含みます。切り捨てがあった場合は
/// `(Showing last W of N total rounds)` の行を続けます。
pub fn format_history_window(history: &[HistoryEntry], window: usize) -> String {
    let start = history.len().saturating_sub(window);
    let (mut my_total, mut opp_total) = totals(&history[..start]);

    let mut out = String::new();
    for (index, entry) in history.iter().enumerate().skip(start) {
        my_total += i64::from(entry.my_payoff);
        opp_total += i64::from(entry.opp_payoff);
        let _ = writeln!(
            out,
            "  Round {}: You {}, Other {} (You: +{}, Other: +{} | Totals: You {}, Other {})",
            index + 1,
            entry.my_action.past_tense(),
            entry.opp_action.past_tense(),
            entry.my_payoff,
            entry.opp_payoff,
            my_total,
            opp_total,
        );
    }
    if start > 0 {
        let _ = writeln!(
            out,
            "\n(Showing last {} of {} total rounds)",
            history.len() - start,
            history.len()
        );
    }
    out
}

/// ピリオド `episode` のラウンド `round_in_episode`（1 始まり）の決定プロンプト
///
/// `history` は現在のピリオド分だけの履歴です。ピリオドの最初のラウンドは
/// 履歴が無いので固定の開始プロンプトになります。
pub fn round_prompt(
    episode: usize,
    round_in_episode: usize,
    history: &[HistoryEntry],
    window: usize,
) -> String {
    if history.is_empty() {
        return first_round_prompt(episode);
    }
    let (my_total, opp_total) = totals(history);
    format!(
        "PERIOD {episode}, ROUND {round_in_episode}:\n\n\
         Your total points: {my_total}\n\
         Other's total points: {opp_total}\n\n\
         Recent interactions:\n\
         {}\n\
         What is your choice?",
        format_history_window(history, window)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action::{Cooperate, Defect};
    use crate::domain::{Action, PayoffMatrix};

    fn entries(moves: &[(Action, Action)]) -> Vec<HistoryEntry> {
        let payoffs = PayoffMatrix::default();
        moves
            .iter()
            .map(|&(me, opp)| {
                let (my_payoff, opp_payoff) = payoffs.payoffs(me, opp);
                HistoryEntry {
                    my_action: me,
                    opp_action: opp,
                    my_payoff,
                    opp_payoff,
                }
            })
            .collect()
    }

    fn five() -> Vec<HistoryEntry> {
        entries(&[
            (Cooperate, Cooperate),
            (Cooperate, Defect),
            (Defect, Defect),
            (Defect, Cooperate),
            (Cooperate, Cooperate),
        ])
    }

    #[test]
    fn window_shows_last_entries_with_disclosure() {
        let text = format_history_window(&five(), 3);
        let rounds: Vec<&str> = text.lines().filter(|l| l.contains("Round")).collect();
        assert_eq!(rounds.len(), 3);
        assert!(rounds[0].starts_with("  Round 3:"));
        assert!(rounds[2].starts_with("  Round 5:"));
        assert!(text.contains("(Showing last 3 of 5 total rounds)"));
    }

    #[test]
    fn running_totals_include_hidden_rounds() {
        let text = format_history_window(&five(), 3);
        // ラウンド 1-2 で自分 3 + 0、相手 3 + 5。ラウンド 3 で双方 +1
        assert!(text.contains("Round 3: You defected, Other defected (You: +1, Other: +1 | Totals: You 4, Other 9)"));
        assert!(text.contains("Totals: You 12, Other 12)"));
    }

    #[test]
    fn wide_window_shows_everything_without_disclosure() {
        for window in [5, 6, 50] {
            let text = format_history_window(&five(), window);
            assert_eq!(text.lines().filter(|l| l.contains("Round")).count(), 5);
            assert!(!text.contains("Showing"));
        }
    }

    #[test]
    fn formatter_is_pure() {
        let history = five();
        assert_eq!(
            format_history_window(&history, 2),
            format_history_window(&history, 2)
        );
    }

    #[test]
    fn round_prompt_has_header_totals_and_question() {
        let prompt = round_prompt(2, 6, &five(), 10);
        assert!(prompt.starts_with("PERIOD 2, ROUND 6:"));
        assert!(prompt.contains("Your total points: 12"));
        assert!(prompt.contains("Other's total points: 12"));
        assert!(prompt.contains("Recent interactions:\n  Round 1: You cooperated, Other cooperated"));
        assert!(prompt.ends_with("What is your choice?"));
    }

    #[test]
    fn empty_history_uses_first_round_prompt() {
        assert_eq!(round_prompt(4, 1, &[], 10), first_round_prompt(4));
    }
}
