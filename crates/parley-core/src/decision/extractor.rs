//! DecisionExtractor - 自由記述の応答 → 確定した行動
//!
//! 判定に使うのは最後の空でない行だけです。それより上は推論部分で、
//! 両方のキーワードが出てきても構いません。最終行は厳しい順に
//! 次のカスケードで判定します:
//!
//! 1. キーワードそのもの（大文字小文字は無視）
//! 2. キーワードの後ろに `.!,;:` だけが続く
//! 3. 3 語以下で、キーワードをちょうど 1 つ含む
//! 4. 5 語以下で、キーワードで終わり、もう一方のキーワードを含まない
//!
//! それ以外はすべて曖昧（Ambiguous）です。

use crate::domain::{Action, Extraction};

const TRAILING_PUNCTUATION: &[char] = &['.', '!', ',', ';', ':'];

/// DecisionExtractor は応答から決定を読み取る
///
/// プロトコルはこの trait についてジェネリックなので、テストで抽出の挙動を差し替えられます。
pub trait DecisionExtractor: Send + Sync {
    fn extract(&self, response: &str) -> Extraction;
}

/// モジュールドキュメントに書いたキーワードカスケード
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl DecisionExtractor for KeywordExtractor {
    fn extract(&self, response: &str) -> Extraction {
        extract_decision(response)
    }
}

/// `response` にカスケードを適用。panic しない（空入力は曖昧扱い）
pub fn extract_decision(response: &str) -> Extraction {
    let Some(last_line) = response.lines().map(str::trim).rev().find(|l| !l.is_empty()) else {
        return Extraction::Ambiguous;
    };
    let line = last_line.to_uppercase();

    if let Some(action) = exact_keyword(&line) {
        return Extraction::Clear(action);
    }

    if let Some(action) = exact_keyword(line.trim_end_matches(TRAILING_PUNCTUATION)) {
        return Extraction::Clear(action);
    }

    let words = line.split_whitespace().count();
    let has = |a: Action| line.contains(a.keyword());

    if words <= 3 {
        match (has(Action::Cooperate), has(Action::Defect)) {
            (true, false) => return Extraction::Clear(Action::Cooperate),
            (false, true) => return Extraction::Clear(Action::Defect),
            _ => {}
        }
    }

    if words <= 5 {
        for action in Action::ALL {
            if line.ends_with(action.keyword()) && !has(action.other()) {
                return Extraction::Clear(action);
            }
        }
    }

    Extraction::Ambiguous
}

fn exact_keyword(line: &str) -> Option<Action> {
    Action::ALL.into_iter().find(|a| line == a.keyword())
}
