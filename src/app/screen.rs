//! Application coordinator
//!
//! Sits between the terminal loop and the session:
//! - Translates key presses into session transitions
//! - Runs dictionary lookups on the async runtime and applies verdicts
//! - Arms the countdown on start and disarms it once the game is over

use crate::game::validation::{Validator, Verdict};
use crate::timer::{Clock, Countdown};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::state::{Phase, Session, SubmitOutcome};

/// Poll timeout while no countdown is running
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Poll timeout while a lookup is in flight, so verdicts show up promptly
const PENDING_POLL: Duration = Duration::from_millis(30);

/// Verdict for one submission, sent back from the runtime
#[derive(Debug)]
pub struct VerdictReply {
    pub ticket: u64,
    pub verdict: Verdict,
}

/// Main application coordinator
pub struct AppCoordinator<C: Clock> {
    /// The current play-through
    pub session: Session,
    /// Whether the application should quit
    pub should_quit: bool,
    validator: Validator,
    runtime: Handle,
    verdict_tx: Sender<VerdictReply>,
    verdict_rx: Receiver<VerdictReply>,
    countdown: Countdown<C>,
}

impl<C: Clock> AppCoordinator<C> {
    pub fn new(session: Session, validator: Validator, runtime: Handle, clock: C) -> Self {
        let (verdict_tx, verdict_rx) = mpsc::channel();
        Self {
            session,
            should_quit: false,
            validator,
            runtime,
            verdict_tx,
            verdict_rx,
            countdown: Countdown::new(clock),
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Start a game, or play again after one ended
    pub fn start_game(&mut self) {
        match self.session.start() {
            Ok(()) => self.countdown.arm(),
            Err(e) => debug!(error = %e, "start ignored"),
        }
    }

    /// Handle Enter: submit while playing, otherwise start a new game
    pub fn on_enter(&mut self) {
        if self.session.phase() == Phase::Playing {
            self.on_submit();
        } else {
            self.start_game();
        }
    }

    /// Handle a letter key
    pub fn on_char(&mut self, c: char) {
        if let Err(e) = self.session.select_letter_char(c) {
            debug!(letter = %c, error = %e, "letter ignored");
        }
    }

    /// Handle a click or selection of a specific slot
    pub fn on_slot(&mut self, index: usize) {
        if let Err(e) = self.session.select_letter(index) {
            debug!(index, error = %e, "slot ignored");
        }
    }

    /// Handle backspace
    pub fn on_backspace(&mut self) {
        if let Err(e) = self.session.backspace() {
            debug!(error = %e, "backspace ignored");
        }
    }

    /// Handle clear
    pub fn on_clear(&mut self) {
        if let Err(e) = self.session.clear_word() {
            debug!(error = %e, "clear ignored");
        }
    }

    /// Send the current word off for validation
    pub fn on_submit(&mut self) {
        let request = match self.session.begin_submit() {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "submit ignored");
                return;
            }
        };

        debug!(ticket = request.ticket, word = %request.word, "checking word");
        let validator = self.validator.clone();
        let tx = self.verdict_tx.clone();
        self.runtime.spawn(async move {
            let verdict = validator.validate(&request.word, &request.history).await;
            // Receiver is gone only when the app is shutting down
            let _ = tx.send(VerdictReply {
                ticket: request.ticket,
                verdict,
            });
        });
    }

    /// Apply elapsed ticks, then finished lookups. Call once per loop iteration.
    ///
    /// Ticks go first: a verdict that lands after the clock ran out is
    /// discarded rather than rescuing the game with its time bonus.
    pub fn poll(&mut self) {
        let due = self.countdown.due_ticks();
        for _ in 0..due {
            if self.session.tick().is_err() {
                break;
            }
        }

        while let Ok(reply) = self.verdict_rx.try_recv() {
            self.apply_verdict(reply);
        }

        if self.session.phase().is_over() && self.countdown.is_armed() {
            info!(phase = ?self.session.phase(), "countdown stopped");
            self.countdown.disarm();
        }
    }

    /// How long the event loop may block waiting for input
    pub fn poll_timeout(&self) -> Duration {
        let timeout = self.countdown.until_next_tick().unwrap_or(IDLE_POLL);
        if self.session.is_submitting() {
            timeout.min(PENDING_POLL)
        } else {
            timeout
        }
    }

    pub fn is_countdown_running(&self) -> bool {
        self.countdown.is_armed()
    }

    fn apply_verdict(&mut self, reply: VerdictReply) {
        match self.session.complete_submit(reply.ticket, reply.verdict) {
            Ok(SubmitOutcome::Accepted(accepted)) => {
                if accepted.won {
                    self.countdown.disarm();
                }
            }
            Ok(SubmitOutcome::Rejected(_)) | Ok(SubmitOutcome::Discarded) => {}
            Err(e) => warn!(ticket = reply.ticket, error = %e, "verdict dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Rules;
    use crate::game::dictionary::testing::FixedDictionary;
    use crate::game::scoring::FibonacciScoring;
    use crate::timer::ManualClock;
    use std::sync::Arc;
    use tokio::runtime::Runtime;

    fn coordinator<'a>(
        rt: &Runtime,
        clock: &'a ManualClock,
        words: &[&str],
    ) -> AppCoordinator<&'a ManualClock> {
        let session = Session::with_seed(Rules::default(), Arc::new(FibonacciScoring), 1);
        let validator = Validator::new(Arc::new(FixedDictionary::new(words)), 2);
        AppCoordinator::new(session, validator, rt.handle().clone(), clock)
    }

    fn start_with(app: &mut AppCoordinator<&ManualClock>, letters: &str) {
        app.session
            .start_with_letters(letters.chars().collect())
            .unwrap();
        app.countdown.arm();
    }

    /// Block until the in-flight verdict arrives, then apply it
    fn settle(app: &mut AppCoordinator<&ManualClock>) {
        let reply = app
            .verdict_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("verdict should arrive");
        app.apply_verdict(reply);
    }

    #[test]
    fn test_enter_starts_game_and_arms_countdown() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &[]);

        assert!(!app.is_countdown_running());
        app.on_enter();
        assert_eq!(app.session.phase(), Phase::Playing);
        assert_eq!(app.session.pool().len(), 10);
        assert!(app.is_countdown_running());
    }

    #[test]
    fn test_countdown_drives_ticks() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &[]);
        app.start_game();

        clock.advance(Duration::from_millis(2_500));
        app.poll();
        assert_eq!(app.session.time_remaining(), 28);
        assert_eq!(app.poll_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_countdown_stops_when_time_runs_out() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &[]);
        app.start_game();

        clock.advance(Duration::from_secs(45));
        app.poll();
        assert_eq!(app.session.phase(), Phase::Lost);
        assert_eq!(app.session.time_remaining(), 0);
        assert!(!app.is_countdown_running());

        // No further ticks are delivered
        clock.advance(Duration::from_secs(5));
        app.poll();
        assert_eq!(app.session.time_remaining(), 0);
    }

    #[test]
    fn test_keyboard_word_is_validated_and_scored() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &["TREE"]);
        start_with(&mut app, "TREEXYZABC");

        for c in "tree".chars() {
            app.on_char(c);
        }
        app.on_enter();
        assert!(app.session.is_submitting());
        settle(&mut app);

        assert_eq!(app.session.words().len(), 1);
        assert_eq!(app.session.points(), 3);
        assert_eq!(app.session.time_remaining(), 33);
        assert!(app.session.current_word().is_empty());
    }

    #[test]
    fn test_rapid_double_submit_only_checks_once() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &["TREE"]);
        start_with(&mut app, "TREEXYZABC");

        for c in "TREE".chars() {
            app.on_char(c);
        }
        app.on_submit();
        app.on_submit();
        settle(&mut app);

        assert_eq!(app.session.words().len(), 1);
        assert!(app
            .verdict_rx
            .recv_timeout(Duration::from_millis(100))
            .is_err());
    }

    #[test]
    fn test_rejection_shows_message() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &["TREE"]);
        start_with(&mut app, "XYZTREEABC");

        for c in "XYZ".chars() {
            app.on_char(c);
        }
        app.on_enter();
        settle(&mut app);

        assert_eq!(app.session.error(), Some("Not a valid word"));
        assert_eq!(app.session.current_word(), "XYZ");

        app.on_clear();
        assert_eq!(app.session.error(), None);
        assert!(app.session.consumed_indices().is_empty());
    }

    #[test]
    fn test_verdict_after_deadline_does_not_rescue_game() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &["TREE"]);
        let rules = Rules {
            starting_time: 1,
            ..Rules::default()
        };
        app.session = Session::with_seed(rules, Arc::new(FibonacciScoring), 1);
        start_with(&mut app, "TREEXYZABC");

        for c in "TREE".chars() {
            app.on_char(c);
        }
        app.on_submit();

        // Wait for the lookup to finish, then put the reply back as if it
        // arrived in the same loop iteration as the final tick
        let reply = app
            .verdict_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("verdict should arrive");
        assert_eq!(reply.verdict, Ok(()));
        app.verdict_tx.send(reply).unwrap();

        clock.advance(Duration::from_millis(1_500));
        app.poll();

        assert_eq!(app.session.phase(), Phase::Lost);
        assert_eq!(app.session.time_remaining(), 0);
        assert!(app.session.words().is_empty());
        assert_eq!(app.session.points(), 0);
        assert!(!app.is_countdown_running());
    }

    #[test]
    fn test_winning_disarms_countdown() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &[]);
        let rules = Rules {
            level_milestones: vec![],
            win_threshold: 1,
            ..Rules::default()
        };
        app.session = Session::with_seed(rules, Arc::new(FibonacciScoring), 1);
        start_with(&mut app, "CATXYZQRST");

        for c in "CAT".chars() {
            app.on_char(c);
        }
        app.on_submit();
        settle(&mut app);

        assert_eq!(app.session.phase(), Phase::Won);
        assert!(!app.is_countdown_running());
    }

    #[test]
    fn test_slot_selection_skips_consumed_slots() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &[]);
        start_with(&mut app, "AABCDEFGHI");

        app.on_slot(1);
        app.on_slot(1);
        app.on_slot(42);
        assert_eq!(app.session.current_word(), "A");
        assert_eq!(app.session.consumed_indices(), vec![1]);
    }

    #[test]
    fn test_input_ignored_outside_play() {
        let rt = Runtime::new().unwrap();
        let clock = ManualClock::new();
        let mut app = coordinator(&rt, &clock, &[]);

        app.on_char('A');
        app.on_backspace();
        app.on_clear();
        app.on_submit();
        assert_eq!(app.session.phase(), Phase::NotStarted);
        assert!(!app.session.is_submitting());
    }
}
