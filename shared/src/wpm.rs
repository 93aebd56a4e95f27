/// Characters counted as one word.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Minutes between two epoch-millisecond timestamps.
pub fn elapsed_minutes(start_ms: u64, end_ms: u64) -> f64 {
    end_ms.saturating_sub(start_ms) as f64 / 1000.0 / 60.0
}

/// Standard five-characters-per-word count.
pub fn words_typed(total_chars: usize) -> f64 {
    total_chars as f64 / CHARS_PER_WORD
}

/// Words per minute, rounded. No error penalty.
pub fn wpm(total_chars: usize, minutes: f64) -> u32 {
    if minutes <= 0.0 {
        return 0;
    }
    (words_typed(total_chars) / minutes).round() as u32
}

/// Characters per minute, rounded.
pub fn cpm(total_chars: usize, minutes: f64) -> u32 {
    if minutes <= 0.0 {
        return 0;
    }
    (total_chars as f64 / minutes).round() as u32
}

/// Accuracy percentage in `0..=100`; 100 when nothing has been typed.
pub fn accuracy(total_chars: usize, errors: usize) -> u32 {
    if total_chars == 0 {
        return 100;
    }
    let correct = total_chars.saturating_sub(errors);
    ((correct as f64 / total_chars as f64) * 100.0).round() as u32
}

/// Everything shown for a test, live or final.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy: u32,
    pub cpm: u32,
}

impl Metrics {
    pub fn compute(total_chars: usize, errors: usize, start_ms: u64, end_ms: u64) -> Self {
        let minutes = elapsed_minutes(start_ms, end_ms);
        Self {
            wpm: wpm(total_chars, minutes),
            accuracy: accuracy(total_chars, errors),
            cpm: cpm(total_chars, minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wpm() {
        // 300 chars in one minute = 60 WPM
        assert_eq!(wpm(300, 1.0), 60);

        // 150 chars in 30 seconds = 60 WPM
        assert_eq!(wpm(150, 0.5), 60);

        // Edge case: no time elapsed
        assert_eq!(wpm(100, 0.0), 0);
    }

    #[test]
    fn test_cpm() {
        assert_eq!(cpm(300, 1.0), 300);
        assert_eq!(cpm(45, 0.25), 180);
        assert_eq!(cpm(10, 0.0), 0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(100, 10), 90);
        assert_eq!(accuracy(0, 0), 100);
        assert_eq!(accuracy(100, 0), 100);
        assert_eq!(accuracy(3, 1), 67);
        assert_eq!(accuracy(3, 3), 0);
    }

    #[test]
    fn test_elapsed_minutes() {
        assert_eq!(elapsed_minutes(1_000, 61_000), 1.0);
        assert_eq!(elapsed_minutes(1_000, 31_000), 0.5);
        // clock going backwards counts as no time
        assert_eq!(elapsed_minutes(5_000, 1_000), 0.0);
    }

    #[test]
    fn test_metrics_cat_scenario() {
        // "cbt" typed against "cat" over exactly one minute
        let m = Metrics::compute(3, 1, 0, 60_000);
        assert_eq!(m, Metrics { wpm: 1, accuracy: 67, cpm: 3 });
    }

    proptest! {
        #[test]
        fn accuracy_stays_in_range(total in 0usize..10_000, errors in 0usize..10_000) {
            let errors = errors.min(total);
            let acc = accuracy(total, errors);
            prop_assert!(acc <= 100);
            if total == 0 {
                prop_assert_eq!(acc, 100);
            }
        }
    }
}
