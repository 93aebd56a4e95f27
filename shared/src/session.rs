use serde::{Deserialize, Serialize};

use crate::wpm::Metrics;

/// Visual class of one target character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharClass {
    /// Typed and equal to the target character.
    Correct,
    /// Typed but different from the target character.
    Incorrect,
    /// The next character to type.
    Current,
    /// Not reached yet.
    Pending,
}

impl CharClass {
    /// CSS class used by the page stylesheet. Pending characters are plain.
    pub fn css_class(self) -> &'static str {
        match self {
            CharClass::Correct => "correct",
            CharClass::Incorrect => "incorrect",
            CharClass::Current => "current",
            CharClass::Pending => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    pub class: CharClass,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    pub cells: Vec<Cell>,
    pub errors: usize,
}

/// Compare `typed` against `target` character by character.
///
/// Only the overlapping prefix is compared; characters past the end of the
/// target are ignored.
pub fn compare(target: &str, typed: &str) -> Comparison {
    let typed: Vec<char> = typed.chars().collect();
    let mut errors = 0;
    let cells = target
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let class = match typed.get(i) {
                Some(&t) if t == ch => CharClass::Correct,
                Some(_) => {
                    errors += 1;
                    CharClass::Incorrect
                }
                None if i == typed.len() => CharClass::Current,
                None => CharClass::Pending,
            };
            Cell { ch, class }
        })
        .collect();
    Comparison { cells, errors }
}

/// The active or most recently completed test.
#[derive(Clone, Debug, PartialEq)]
pub struct TestSession {
    pub target: &'static str,
    pub started_at: u64,
    pub ended_at: Option<u64>,
    pub duration_secs: u32,
    pub position: usize,
    pub errors: usize,
    pub total_chars: usize,
    pub comparison: Comparison,
}

impl TestSession {
    pub fn new(target: &'static str, duration_secs: u32, started_at: u64) -> Self {
        Self {
            target,
            started_at,
            ended_at: None,
            duration_secs,
            position: 0,
            errors: 0,
            total_chars: 0,
            comparison: compare(target, ""),
        }
    }

    /// Record the full contents of the input field.
    ///
    /// Input past the end of the target is not counted, so
    /// `errors <= total_chars <= target length` always holds.
    pub fn apply_input(&mut self, typed: &str) {
        let len = typed.chars().count().min(self.target_len());
        self.position = len;
        self.total_chars = len;
        self.comparison = compare(self.target, typed);
        self.errors = self.comparison.errors;
    }

    pub fn target_len(&self) -> usize {
        self.comparison.cells.len()
    }

    pub fn is_exact_match(&self, typed: &str) -> bool {
        typed == self.target
    }

    pub fn finish(&mut self, ended_at: u64) {
        self.ended_at = Some(ended_at);
    }

    /// Metrics up to `now`, or up to the end once finished.
    pub fn metrics(&self, now: u64) -> Metrics {
        let end = self.ended_at.unwrap_or(now);
        Metrics::compute(self.total_chars, self.errors, self.started_at, end)
    }
}
