use rand::Rng;
use rust_fsm::StateMachineImpl;

use crate::fsm::{TestEvent, TestPhase};
use crate::leaderboard::Leaderboard;
use crate::passages::random_passage;
use crate::protocol::{iso_timestamp, ResultRecord};
use crate::session::{Cell, TestSession};

/// Test length offered before the user picks one.
pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Durations offered by the selector.
pub const DURATION_CHOICES: &[u32] = &[15, 30, 60, 120];

pub const PLACEHOLDER_TEXT: &str = "Click \"Start Test\" to begin typing";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No test running; the tick is stale.
    Ignored,
    Counting,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputOutcome {
    Ignored,
    Updated,
    /// The input matched the whole target and the test ended early.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDisposition {
    Suppress,
    PassThrough,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextView {
    Placeholder(&'static str),
    Cells(Vec<Cell>),
}

/// Everything the page needs to draw the current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Display {
    pub text: TextView,
    pub typed: String,
    pub time_left: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub input_enabled: bool,
    /// Character count of the target while a test runs; bounds the input.
    pub max_len: Option<usize>,
    pub controls_enabled: bool,
    pub results: Option<ResultRecord>,
}

/// Owns the one typing test on the page.
///
/// `T` is the handle of the running one-second countdown; dropping it must
/// cancel the countdown. The controller holds at most one handle and drops it
/// on every path that ends a test.
pub struct TestController<T> {
    passages: &'static [&'static str],
    duration_secs: u32,
    phase: TestPhase,
    session: Option<TestSession>,
    typed: String,
    time_left: u32,
    live_wpm: u32,
    live_accuracy: u32,
    result: Option<ResultRecord>,
    results_visible: bool,
    countdown: Option<T>,
}

impl<T> TestController<T> {
    pub fn new(passages: &'static [&'static str]) -> Self {
        Self {
            passages,
            duration_secs: DEFAULT_DURATION_SECS,
            phase: TestPhase::default(),
            session: None,
            typed: String::new(),
            time_left: DEFAULT_DURATION_SECS,
            live_wpm: 0,
            live_accuracy: 100,
            result: None,
            results_visible: false,
            countdown: None,
        }
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == TestPhase::Running
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn session(&self) -> Option<&TestSession> {
        self.session.as_ref()
    }

    pub fn result(&self) -> Option<&ResultRecord> {
        self.result.as_ref()
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// Selector change. The selector is disabled while a test runs.
    pub fn set_duration(&mut self, secs: u32) {
        if self.is_active() || secs == 0 {
            return;
        }
        self.duration_secs = secs;
        self.time_left = secs;
    }

    /// Begin a new test, tearing down any running one first.
    ///
    /// `spawn_countdown` is called exactly once, after the previous handle
    /// has been dropped.
    pub fn start<R, F>(&mut self, rng: &mut R, now_ms: u64, spawn_countdown: F)
    where
        R: Rng + ?Sized,
        F: FnOnce() -> T,
    {
        let Some(target) = random_passage(self.passages, rng) else {
            return;
        };
        self.countdown = None;
        self.transition(TestEvent::Start);

        self.session = Some(TestSession::new(target, self.duration_secs, now_ms));
        self.typed.clear();
        self.time_left = self.duration_secs;
        self.live_wpm = 0;
        self.live_accuracy = 100;
        self.result = None;
        self.results_visible = false;

        self.countdown = Some(spawn_countdown());
    }

    /// Abandon any test and return to the idle prompt.
    pub fn reset(&mut self) {
        self.countdown = None;
        self.transition(TestEvent::Reset);
        self.session = None;
        self.typed.clear();
        self.time_left = self.duration_secs;
        self.live_wpm = 0;
        self.live_accuracy = 100;
        self.results_visible = false;
    }

    /// One second of the countdown has passed.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::Ignored;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.complete(now_ms);
            TickOutcome::Completed
        } else {
            TickOutcome::Counting
        }
    }

    /// The input field now holds `typed`.
    pub fn on_input(&mut self, typed: &str, now_ms: u64) -> InputOutcome {
        if !self.is_active() {
            return InputOutcome::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return InputOutcome::Ignored;
        };
        session.apply_input(typed);
        self.typed = typed.to_string();

        if now_ms > session.started_at {
            let live = session.metrics(now_ms);
            self.live_wpm = live.wpm;
            self.live_accuracy = live.accuracy;
        }

        if session.is_exact_match(typed) {
            self.complete(now_ms);
            return InputOutcome::Finished;
        }
        InputOutcome::Updated
    }

    /// Keys that would move focus away or cancel are swallowed during a test.
    pub fn on_key(&self, key: &str) -> KeyDisposition {
        match key {
            "Tab" | "Escape" if self.is_active() => KeyDisposition::Suppress,
            _ => KeyDisposition::PassThrough,
        }
    }

    /// End the running test and compute its final result.
    pub fn complete(&mut self, now_ms: u64) {
        if !self.is_active() {
            return;
        }
        self.countdown = None;
        self.transition(TestEvent::Complete);

        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.finish(now_ms);
        let metrics = session.metrics(now_ms);
        self.result = Some(ResultRecord {
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            cpm: metrics.cpm,
            total_chars: session.total_chars,
            duration: session.duration_secs,
            timestamp: iso_timestamp(now_ms),
        });
        self.results_visible = true;
    }

    /// Record the last completed result in `leaderboard`.
    ///
    /// Returns the saved record, or `None` when no test has completed yet.
    /// The same result may be saved more than once.
    pub fn save_result(&self, leaderboard: &mut Leaderboard) -> Option<ResultRecord> {
        let result = self.result.clone()?;
        leaderboard.record(result.clone());
        Some(result)
    }

    pub fn display(&self) -> Display {
        let text = match (&self.session, self.phase) {
            (Some(session), TestPhase::Running | TestPhase::Finished) => {
                TextView::Cells(session.comparison.cells.clone())
            }
            _ => TextView::Placeholder(PLACEHOLDER_TEXT),
        };
        Display {
            text,
            typed: self.typed.clone(),
            time_left: self.time_left,
            wpm: self.live_wpm,
            accuracy: self.live_accuracy,
            input_enabled: self.is_active(),
            max_len: self
                .session
                .as_ref()
                .filter(|_| self.is_active())
                .map(TestSession::target_len),
            controls_enabled: !self.is_active(),
            results: self.result.clone().filter(|_| self.results_visible),
        }
    }

    fn transition(&mut self, event: TestEvent) {
        if let Some(next) = TestPhase::transition(&self.phase, &event) {
            self.phase = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CharClass;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    /// Countdown handle that tracks how many are alive.
    struct Ticker(Rc<StdCell<usize>>);

    impl Ticker {
        fn spawn(live: &Rc<StdCell<usize>>) -> Self {
            live.set(live.get() + 1);
            Ticker(live.clone())
        }
    }

    impl Drop for Ticker {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    const CAT: &[&str] = &["cat"];

    fn started(live: &Rc<StdCell<usize>>, now: u64) -> TestController<Ticker> {
        let mut c = TestController::new(CAT);
        c.start(&mut StdRng::seed_from_u64(1), now, || Ticker::spawn(live));
        c
    }

    #[test]
    fn start_renders_cursor_and_locks_controls() {
        let live = Rc::new(StdCell::new(0));
        let c = started(&live, 1_000);
        let d = c.display();

        assert!(c.is_active());
        assert_eq!(live.get(), 1);
        assert!(d.input_enabled);
        assert!(!d.controls_enabled);
        assert!(d.results.is_none());
        assert_eq!(d.time_left, DEFAULT_DURATION_SECS);
        match d.text {
            TextView::Cells(cells) => {
                assert_eq!(cells[0].class, CharClass::Current);
                assert!(cells[1..].iter().all(|c| c.class == CharClass::Pending));
            }
            other => panic!("unexpected text view {other:?}"),
        }
    }

    #[test]
    fn repeated_start_keeps_one_countdown() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);
        let mut rng = StdRng::seed_from_u64(9);
        for now in 1..5 {
            c.start(&mut rng, now, || Ticker::spawn(&live));
            assert_eq!(live.get(), 1);
        }
    }

    #[test]
    fn start_without_passages_is_a_no_op() {
        let live = Rc::new(StdCell::new(0));
        let mut c: TestController<Ticker> = TestController::new(&[]);
        c.start(&mut StdRng::seed_from_u64(1), 0, || Ticker::spawn(&live));
        assert_eq!(live.get(), 0);
        assert_eq!(c.phase(), TestPhase::Idle);
    }

    #[test]
    fn cat_scenario_at_full_duration() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);

        assert_eq!(c.on_input("cbt", 30_000), InputOutcome::Updated);
        assert_eq!(c.session().unwrap().errors, 1);
        for s in 1..60 {
            assert_eq!(c.tick(s * 1000), TickOutcome::Counting);
        }
        assert_eq!(c.tick(60_000), TickOutcome::Completed);

        assert_eq!(live.get(), 0);
        let r = c.result().unwrap();
        assert_eq!((r.wpm, r.accuracy, r.cpm, r.total_chars, r.duration), (1, 67, 3, 3, 60));
        assert_eq!(r.timestamp, "1970-01-01T00:01:00.000Z");

        let d = c.display();
        assert!(!d.input_enabled);
        assert!(d.controls_enabled);
        assert_eq!(d.results.as_ref(), Some(r));
    }

    #[test]
    fn exact_match_finishes_early_with_actual_elapsed_time() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 10_000);

        assert_eq!(c.on_input("ca", 11_000), InputOutcome::Updated);
        assert_eq!(c.on_input("cat", 22_000), InputOutcome::Finished);

        assert_eq!(c.phase(), TestPhase::Finished);
        assert!(!c.has_countdown());
        assert_eq!(live.get(), 0);
        // 3 chars over 12 seconds: 0.6 words / 0.2 min
        let r = c.result().unwrap();
        assert_eq!((r.wpm, r.cpm, r.accuracy), (3, 15, 100));
        assert_eq!(c.tick(23_000), TickOutcome::Ignored);
    }

    #[test]
    fn live_stats_follow_input() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);

        // no time elapsed yet: stats stay at their defaults
        c.on_input("x", 0);
        assert_eq!((c.display().wpm, c.display().accuracy), (0, 100));

        c.on_input("xa", 6_000);
        let d = c.display();
        assert_eq!(d.typed, "xa");
        assert_eq!(d.accuracy, 50);
        assert_eq!(d.wpm, 4);
    }

    #[test]
    fn stray_events_are_ignored_when_idle() {
        let mut c: TestController<()> = TestController::new(CAT);
        assert_eq!(c.on_input("cat", 5), InputOutcome::Ignored);
        assert_eq!(c.tick(5), TickOutcome::Ignored);
        assert_eq!(c.on_key("Tab"), KeyDisposition::PassThrough);
        c.complete(5);
        assert!(c.result().is_none());
    }

    #[test]
    fn overtyping_does_not_inflate_metrics() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);
        assert_eq!(c.display().max_len, Some(3));

        c.on_input("xxxxxxxxxx", 6_000);
        let s = c.session().unwrap();
        assert_eq!((s.total_chars, s.errors), (3, 3));
        assert_eq!(c.display().accuracy, 0);

        c.complete(60_000);
        let r = c.result().unwrap();
        assert_eq!((r.total_chars, r.accuracy, r.cpm), (3, 0, 3));
        assert_eq!(c.display().max_len, None);
    }

    #[test]
    fn events_after_finish_are_ignored() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);
        c.on_input("cbt", 5_000);
        c.complete(6_000);
        let result = c.result().cloned();

        assert_eq!(c.on_input("cax", 7_000), InputOutcome::Ignored);
        assert_eq!(c.session().unwrap().errors, 1);
        assert_eq!(c.result().cloned(), result);
        assert_eq!(c.display().typed, "cbt");
        assert_eq!(c.on_key("Tab"), KeyDisposition::PassThrough);
        assert_eq!(c.on_key("Escape"), KeyDisposition::PassThrough);
    }

    #[test]
    fn new_start_drops_previous_result() {
        let live = Rc::new(StdCell::new(0));
        let mut board = Leaderboard::default();
        let mut c = started(&live, 0);
        c.on_input("cat", 2_000);
        assert!(c.result().is_some());

        c.start(&mut StdRng::seed_from_u64(2), 10_000, || Ticker::spawn(&live));
        assert!(c.result().is_none());
        assert!(c.save_result(&mut board).is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn tab_and_escape_suppressed_while_running() {
        let live = Rc::new(StdCell::new(0));
        let c = started(&live, 0);
        assert_eq!(c.on_key("Tab"), KeyDisposition::Suppress);
        assert_eq!(c.on_key("Escape"), KeyDisposition::Suppress);
        assert_eq!(c.on_key("a"), KeyDisposition::PassThrough);
    }

    #[test]
    fn reset_after_completion_restores_defaults() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);
        c.on_input("cbt", 1_000);
        c.complete(2_000);

        c.reset();
        let d = c.display();
        assert_eq!(d.text, TextView::Placeholder(PLACEHOLDER_TEXT));
        assert_eq!((d.time_left, d.wpm, d.accuracy), (DEFAULT_DURATION_SECS, 0, 100));
        assert!(d.typed.is_empty());
        assert!(!d.input_enabled);
        assert!(d.controls_enabled);
        assert!(d.results.is_none());

        // idempotent
        c.reset();
        assert_eq!(c.display(), d);
    }

    #[test]
    fn reset_cancels_running_countdown() {
        let live = Rc::new(StdCell::new(0));
        let mut c = started(&live, 0);
        c.reset();
        assert_eq!(live.get(), 0);
        assert_eq!(c.phase(), TestPhase::Idle);
        assert_eq!(c.on_input("c", 100), InputOutcome::Ignored);
    }

    #[test]
    fn duration_applies_to_next_test_only() {
        let live = Rc::new(StdCell::new(0));
        let mut c: TestController<Ticker> = TestController::new(CAT);
        c.set_duration(15);
        assert_eq!(c.display().time_left, 15);

        c.start(&mut StdRng::seed_from_u64(1), 0, || Ticker::spawn(&live));
        c.set_duration(120);
        assert_eq!(c.duration_secs(), 15);
        for s in 1..=15 {
            c.tick(s * 1000);
        }
        assert_eq!(c.result().unwrap().duration, 15);
    }

    #[test]
    fn save_requires_a_completed_result() {
        let live = Rc::new(StdCell::new(0));
        let mut board = Leaderboard::default();
        let mut c = started(&live, 0);
        assert!(c.save_result(&mut board).is_none());

        c.on_input("cat", 3_000);
        let saved = c.save_result(&mut board).unwrap();
        assert_eq!(board.entries(), &[saved.clone()]);

        // a second save of the same result is not deduplicated
        c.save_result(&mut board);
        assert_eq!(board.entries(), &[saved.clone(), saved]);
    }
}
