//! ピリオド末の振り返りプロンプト
//!
//! # スタイル
//! - `minimal`: 双方のスコア
//! - `standard`: スコア、任意の統計、ピリオドの全ラウンド
//! - `detailed`: 結果の内訳、パーセンテージ付きの成績、全ラウンド
//! - `custom`: ユーザーテンプレート（`{name}` を置換）
//!
//! 使えるプレースホルダ: `{episode_num}`, `{rounds_in_episode}`, `{my_score}`,
//! `{opp_score}`, `{my_avg}`, `{my_cooperations}`, `{my_defections}`,
//! `{opp_cooperations}`, `{opp_defections}`, `{round_history}`.

use std::fmt::Write as _;

use tracing::warn;

use crate::domain::{HistoryEntry, PayoffMatrix, ReflectionConfig, ReflectionStyle};

use super::history::totals;

/// 全スタイル共通のピリオド集計
#[derive(Debug, Clone, Copy, PartialEq)]
struct PeriodStats {
    my_score: i64,
    opp_score: i64,
    rounds: usize,
    my_cooperations: usize,
    opp_cooperations: usize,
}

impl PeriodStats {
    fn from_history(history: &[HistoryEntry]) -> Self {
        let (my_score, opp_score) = totals(history);
        Self {
            my_score,
            opp_score,
            rounds: history.len(),
            my_cooperations: history.iter().filter(|e| e.my_action.is_cooperate()).count(),
            opp_cooperations: history.iter().filter(|e| e.opp_action.is_cooperate()).count(),
        }
    }

    fn my_avg(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.my_score as f64 / self.rounds as f64
        }
    }

    fn my_defections(&self) -> usize {
        self.rounds - self.my_cooperations
    }

    fn opp_defections(&self) -> usize {
        self.rounds - self.opp_cooperations
    }

    fn percent(&self, count: usize) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.rounds as f64
        }
    }
}

fn round_lines(history: &[HistoryEntry], labelled: bool) -> String {
    let mut out = String::new();
    for (i, e) in history.iter().enumerate() {
        let _ = if labelled {
            writeln!(
                out,
                "Round {}: You {}, Other {} (You: +{}, Other: +{})",
                i + 1,
                e.my_action,
                e.opp_action,
                e.my_payoff,
                e.opp_payoff
            )
        } else {
            writeln!(
                out,
                "Round {}: You {}, Other {} (+{}, +{})",
                i + 1,
                e.my_action,
                e.opp_action,
                e.my_payoff,
                e.opp_payoff
            )
        };
    }
    out
}

/// 1 人のエージェントから見たピリオド `episode`（1 始まり）の振り返りプロンプト
///
/// `history` は終わったばかりのピリオドの履歴です。テンプレート本文の無い
/// custom スタイルは `standard` にフォールバックします。
pub fn reflection_prompt(
    episode: usize,
    rounds_in_episode: usize,
    history: &[HistoryEntry],
    config: &ReflectionConfig,
    payoffs: &PayoffMatrix,
) -> String {
    let stats = PeriodStats::from_history(history);
    match config.style {
        ReflectionStyle::Minimal => minimal(episode, &stats),
        ReflectionStyle::Standard => standard(episode, rounds_in_episode, history, &stats, config.include_statistics),
        ReflectionStyle::Detailed => detailed(episode, rounds_in_episode, history, &stats, payoffs),
        ReflectionStyle::Custom => match &config.template {
            Some(template) => custom(template, episode, rounds_in_episode, history, &stats),
            None => {
                warn!(episode, "custom reflection style without a template, using standard");
                standard(episode, rounds_in_episode, history, &stats, config.include_statistics)
            }
        },
    }
}

fn minimal(episode: usize, stats: &PeriodStats) -> String {
    format!(
        "PERIOD {episode} COMPLETE\n\nYour points: {}\nOther's points: {}\n",
        stats.my_score, stats.opp_score
    )
}

fn standard(
    episode: usize,
    rounds_in_episode: usize,
    history: &[HistoryEntry],
    stats: &PeriodStats,
    include_statistics: bool,
) -> String {
    let mut out = format!(
        "PERIOD {episode} COMPLETE (Rounds 1-{rounds_in_episode})\n\n\
         Your points this period: {}\n\
         Other's points this period: {}\n",
        stats.my_score, stats.opp_score
    );
    if include_statistics {
        let _ = write!(
            out,
            "\nYour average: {:.2} points per round\n\
             Your choices: {} cooperate, {} defect\n\
             Other's choices: {} cooperate, {} defect\n",
            stats.my_avg(),
            stats.my_cooperations,
            stats.my_defections(),
            stats.opp_cooperations,
            stats.opp_defections(),
        );
    }
    out.push_str("\nWhat happened this period:\n");
    out.push_str(&round_lines(history, false));
    out.push_str("\nAs you continue to the next period, what are you thinking?\n");
    out
}

fn detailed(
    episode: usize,
    rounds_in_episode: usize,
    history: &[HistoryEntry],
    stats: &PeriodStats,
    payoffs: &PayoffMatrix,
) -> String {
    let mut out = format!(
        "PERIOD {episode} COMPLETE (Rounds 1-{rounds_in_episode})\n\n\
         OUTCOMES:\n\
         Your points this period: {}\n\
         Other's points this period: {}\n\n\
         PERFORMANCE:\n\
         Your average: {:.2} points per round\n\
         Theoretical range: {} to {} points per round\n\
         Your choices: {} cooperate ({:.1}%), {} defect\n\
         Other's choices: {} cooperate ({:.1}%), {} defect\n\n\
         WHAT HAPPENED:\n",
        stats.my_score,
        stats.opp_score,
        stats.my_avg(),
        payoffs.min_per_round(),
        payoffs.max_per_round(),
        stats.my_cooperations,
        stats.percent(stats.my_cooperations),
        stats.my_defections(),
        stats.opp_cooperations,
        stats.percent(stats.opp_cooperations),
        stats.opp_defections(),
    );
    out.push_str(&round_lines(history, true));
    out.push_str("\nReflect on this period and consider your approach for the next period.\n");
    out
}

fn custom(
    template: &str,
    episode: usize,
    rounds_in_episode: usize,
    history: &[HistoryEntry],
    stats: &PeriodStats,
) -> String {
    let round_history = round_lines(history, false);
    let values: [(&str, String); 10] = [
        ("episode_num", episode.to_string()),
        ("rounds_in_episode", rounds_in_episode.to_string()),
        ("my_score", stats.my_score.to_string()),
        ("opp_score", stats.opp_score.to_string()),
        ("my_avg", format!("{:.2}", stats.my_avg())),
        ("my_cooperations", stats.my_cooperations.to_string()),
        ("my_defections", stats.my_defections().to_string()),
        ("opp_cooperations", stats.opp_cooperations.to_string()),
        ("opp_defections", stats.opp_defections().to_string()),
        ("round_history", round_history.trim_end().to_string()),
    ];
    values
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// コンテキストリセット後に振り返りを再注入する user ターン
pub fn carried_reflection(episode: usize, reflection: &str) -> String {
    format!("Your reflection on period {episode}:\n{reflection}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Action::{self, Cooperate, Defect};

    fn history() -> Vec<HistoryEntry> {
        let payoffs = PayoffMatrix::default();
        [(Cooperate, Cooperate), (Cooperate, Defect), (Defect, Defect), (Cooperate, Cooperate)]
            .into_iter()
            .map(|(me, opp): (Action, Action)| {
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

    fn render(config: ReflectionConfig) -> String {
        reflection_prompt(2, 4, &history(), &config, &PayoffMatrix::default())
    }

    #[test]
    fn minimal_has_scores_only() {
        let text = render(ReflectionConfig::new(ReflectionStyle::Minimal));
        assert_eq!(text, "PERIOD 2 COMPLETE\n\nYour points: 7\nOther's points: 12\n");
    }

    #[test]
    fn standard_lists_every_round_and_statistics() {
        let text = render(ReflectionConfig::default());
        assert!(text.starts_with("PERIOD 2 COMPLETE (Rounds 1-4)"));
        assert!(text.contains("Your average: 1.75 points per round"));
        assert!(text.contains("Your choices: 3 cooperate, 1 defect"));
        assert!(text.contains("Other's choices: 2 cooperate, 2 defect"));
        assert!(text.contains("Round 2: You COOPERATE, Other DEFECT (+0, +5)"));
        assert!(text.ends_with("what are you thinking?\n"));
    }

    #[test]
    fn standard_without_statistics_omits_block() {
        let config = ReflectionConfig {
            include_statistics: false,
            ..ReflectionConfig::default()
        };
        let text = render(config);
        assert!(!text.contains("Your average"));
        assert!(text.contains("Round 4:"));
    }

    #[test]
    fn detailed_reports_percentages_and_range() {
        let text = render(ReflectionConfig::new(ReflectionStyle::Detailed));
        assert!(text.contains("Theoretical range: 0 to 5 points per round"));
        assert!(text.contains("Your choices: 3 cooperate (75.0%), 1 defect"));
        assert!(text.contains("Other's choices: 2 cooperate (50.0%), 2 defect"));
        assert!(text.contains("Round 1: You COOPERATE, Other COOPERATE (You: +3, Other: +3)"));
    }

    #[test]
    fn custom_substitutes_every_placeholder() {
        let template = "P{episode_num}/{rounds_in_episode} {my_score}-{opp_score} avg {my_avg} \
                        me {my_cooperations}c{my_defections}d opp {opp_cooperations}c{opp_defections}d\n{round_history}";
        let text = render(ReflectionConfig::custom(template));
        assert!(text.starts_with("P2/4 7-12 avg 1.75 me 3c1d opp 2c2d\nRound 1:"));
        assert!(text.ends_with("Round 4: You COOPERATE, Other COOPERATE (+3, +3)"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn custom_without_template_falls_back_to_standard() {
        let text = render(ReflectionConfig::new(ReflectionStyle::Custom));
        assert_eq!(text, render(ReflectionConfig::default()));
    }

    #[test]
    fn carried_reflection_names_period() {
        assert_eq!(
            carried_reflection(3, "stay nice"),
            "Your reflection on period 3:\nstay nice"
        );
    }
}
