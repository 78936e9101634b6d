//! 固定のプロンプト文面（デフォルトのシステムプロンプト、ピリオド開始時の
//! プロンプト、曖昧な回答の後に使う強制プロンプト）

use crate::domain::PayoffMatrix;

/// 曖昧な回答の後に送る。最終行にキーワードだけを書くよう求める
pub const FORCING_PROMPT: &str = "Your previous response did not clearly specify COOPERATE or DEFECT.

You MUST choose exactly one action. This is a fundamental requirement of the game.

Respond with ONLY your reasoning (2-3 sentences) followed by exactly one word on its own line:
COOPERATE
or
DEFECT

What is your decision?";

fn points(n: i32) -> String {
    if n == 1 {
        "1 point".to_string()
    } else {
        format!("{n} points")
    }
}

/// `payoffs` から利得表を埋めたデフォルトのシステムプロンプト
pub fn default_system_prompt(payoffs: &PayoffMatrix) -> String {
    let (t, r, p, s) = (
        payoffs.temptation(),
        payoffs.reward(),
        payoffs.punishment(),
        payoffs.sucker(),
    );
    format!(
        "You are participating in a repeated exchange with another participant across multiple periods.

Each round, you MUST choose exactly one action: COOPERATE or DEFECT
The other participant also chooses.
Both players must commit to a definite action - hedging or ambiguity is not permitted.

Outcomes:
- Both COOPERATE: You get {reward}, other gets {reward}
- You COOPERATE, other DEFECTS: You get {sucker}, other gets {temptation}
- You DEFECT, other COOPERATES: You get {temptation}, other gets {sucker}
- Both DEFECT: You get {punishment}, other gets {punishment}

YOUR GOAL: Accumulate as many points as possible across all periods.

You will interact for multiple periods. After each period, you can reflect on
what happened and adjust your approach. Learn from experience to improve your
outcomes over time.

RESPONSE FORMAT - THIS IS MANDATORY:
First, provide your reasoning in 2-3 complete sentences:
- What patterns do you observe in the recent interactions?
- Why are you choosing to cooperate or defect?
- What outcome do you expect?

In your reasoning, use lowercase words (\"cooperate\", \"defect\") when discussing options.

Then, you MUST end your response with EXACTLY one of these words on its own line:
COOPERATE
or
DEFECT

CRITICAL REQUIREMENTS:
- You MUST make a definite choice - no hedging, no \"maybe\", no conditional statements
- The final line must contain ONLY the word COOPERATE or ONLY the word DEFECT
- Nothing else on that line - no punctuation, no additional words

INCORRECT EXAMPLES:
\"I might cooperate\" - NO: must be definite
\"COOPERATE or DEFECT\" - NO: must choose one
\"My choice is COOPERATE\" - NO: decision word must be alone on the line

Always explain your thinking in complete sentences, then provide your action.
",
        reward = points(r),
        sucker = points(s),
        temptation = points(t),
        punishment = points(p),
    )
}

/// ピリオド `episode` のラウンド 1 のプロンプト（まだ履歴は無い）
pub fn first_round_prompt(episode: usize) -> String {
    format!("PERIOD {episode}, ROUND 1:\nThis is the first round of this period.\n\nWhat is your choice?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_uses_configured_payoffs() {
        let payoffs = PayoffMatrix::new(7, 4, 2, 0).unwrap();
        let prompt = default_system_prompt(&payoffs);
        assert!(prompt.contains("Both COOPERATE: You get 4 points, other gets 4 points"));
        assert!(prompt.contains("You COOPERATE, other DEFECTS: You get 0 points, other gets 7 points"));
        assert!(prompt.contains("Both DEFECT: You get 2 points"));
    }

    #[test]
    fn default_payoffs_match_classic_table() {
        let prompt = default_system_prompt(&PayoffMatrix::default());
        assert!(prompt.contains("You DEFECT, other COOPERATES: You get 5 points, other gets 0 points"));
        assert!(prompt.contains("Both DEFECT: You get 1 point, other gets 1 point"));
    }

    #[test]
    fn first_round_prompt_names_period() {
        let prompt = first_round_prompt(3);
        assert!(prompt.starts_with("PERIOD 3, ROUND 1:"));
        assert!(prompt.ends_with("What is your choice?"));
    }

    #[test]
    fn forcing_prompt_ends_with_question() {
        assert!(FORCING_PROMPT.contains("COOPERATE\nor\nDEFECT"));
        assert!(FORCING_PROMPT.ends_with("What is your decision?"));
    }
}
