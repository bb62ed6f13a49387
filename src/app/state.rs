#![allow(dead_code)]
//! Session state: the letter pool, the word being built, score and clock
//!
//! Every gameplay transition is a method on an owned `Session`. Nothing here
//! touches the terminal, the network or the wall clock; the event loop feeds
//! in ticks and validation verdicts.

use crate::config::Rules;
use crate::game::generate_letters_with_rng;
use crate::game::scoring::ScoringPolicy;
use crate::game::validation::{Rejection, Validator, Verdict};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_over(self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

/// One position in the letter pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LetterSlot {
    pub letter: char,
    pub consumed: bool,
}

impl LetterSlot {
    fn new(letter: char) -> Self {
        Self {
            letter: letter.to_ascii_uppercase(),
            consumed: false,
        }
    }
}

/// The word under construction and the pool indices that produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBuffer {
    letters: Vec<char>,
    trail: Vec<usize>,
}

impl WordBuffer {
    fn push(&mut self, letter: char, index: usize) {
        self.letters.push(letter);
        self.trail.push(index);
    }

    fn pop(&mut self) -> Option<usize> {
        self.letters.pop();
        self.trail.pop()
    }

    fn clear(&mut self) {
        self.letters.clear();
        self.trail.clear();
    }

    pub fn as_string(&self) -> String {
        self.letters.iter().collect()
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Pool indices, in the order they were selected
    pub fn trail(&self) -> &[usize] {
        &self.trail
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// An accepted word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub points: u32,
    /// Zero-based position in the accepted-words list
    pub position: usize,
}

/// Invalid transition attempts. State is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("game is not in progress")]
    NotPlaying,

    #[error("game is already in progress")]
    AlreadyPlaying,

    #[error("slot {index} is out of range (pool has {len} letters)")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("slot {index} is already in use")]
    SlotConsumed { index: usize },

    #[error("no free slot holds letter {0}")]
    LetterUnavailable(char),

    #[error("word is empty")]
    EmptyWord,

    #[error("a submission is already being checked")]
    SubmitPending,

    #[error("no submission is being checked")]
    NoPendingSubmit,

    #[error("verdict for unknown submission #{0}")]
    UnknownTicket(u64),
}

/// A word handed off for validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub ticket: u64,
    pub word: String,
    /// Words accepted so far this session
    pub history: Vec<String>,
}

/// Submission in flight, tagged with the buffer it was issued against
#[derive(Debug, Clone)]
struct PendingSubmit {
    ticket: u64,
    trail: Vec<usize>,
}

/// Result of applying a verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(Accepted),
    Rejected(Rejection),
    /// Buffer changed or game ended while the word was being checked
    Discarded,
}

/// Details of an accepted word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub record: WordRecord,
    pub time_bonus: u32,
    pub leveled_up: bool,
    pub won: bool,
}

/// One play-through, from start to a terminal phase
#[derive(Clone)]
pub struct Session {
    rules: Rules,
    scoring: Arc<dyn ScoringPolicy>,
    rng: StdRng,
    phase: Phase,
    pool: Vec<LetterSlot>,
    buffer: WordBuffer,
    words: Vec<WordRecord>,
    points: u32,
    level: u32,
    time_remaining: u32,
    /// Last rejection message, cleared by the next edit or acceptance
    error: Option<String>,
    pending: Option<PendingSubmit>,
    next_ticket: u64,
    // Cosmetic echoes of the last transition
    last_selected: Option<usize>,
    time_bonus: Option<u32>,
    time_bonus_ticks: u32,
    level_up_ticks: u32,
}

impl Session {
    /// Create a session seeded from the thread RNG
    pub fn new(rules: Rules, scoring: Arc<dyn ScoringPolicy>) -> Self {
        Self::with_rng(rules, scoring, StdRng::from_rng(&mut rand::rng()))
    }

    /// Create a session with deterministic letter pools
    pub fn with_seed(rules: Rules, scoring: Arc<dyn ScoringPolicy>, seed: u64) -> Self {
        Self::with_rng(rules, scoring, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rules: Rules, scoring: Arc<dyn ScoringPolicy>, rng: StdRng) -> Self {
        let time_remaining = rules.starting_time;
        Self {
            rules,
            scoring,
            rng,
            phase: Phase::NotStarted,
            pool: Vec::new(),
            buffer: WordBuffer::default(),
            words: Vec::new(),
            points: 0,
            level: 1,
            time_remaining,
            error: None,
            pending: None,
            next_ticket: 0,
            last_selected: None,
            time_bonus: None,
            time_bonus_ticks: 0,
            level_up_ticks: 0,
        }
    }

    /// Start (or restart) with a freshly generated pool
    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.phase == Phase::Playing {
            return Err(TransitionError::AlreadyPlaying);
        }
        let letters = generate_letters_with_rng(self.rules.initial_letters, &mut self.rng);
        self.start_with_letters(letters)
    }

    /// Start (or restart) with the given pool
    pub fn start_with_letters(&mut self, letters: Vec<char>) -> Result<(), TransitionError> {
        if self.phase == Phase::Playing {
            return Err(TransitionError::AlreadyPlaying);
        }

        self.pool = letters.into_iter().map(LetterSlot::new).collect();
        self.buffer.clear();
        self.words.clear();
        self.points = 0;
        self.level = 1;
        self.time_remaining = self.rules.starting_time;
        self.error = None;
        self.pending = None;
        self.last_selected = None;
        self.time_bonus = None;
        self.time_bonus_ticks = 0;
        self.level_up_ticks = 0;
        self.phase = Phase::Playing;

        info!(
            pool = %self.pool_string(),
            time = self.time_remaining,
            "session started"
        );
        Ok(())
    }

    /// Add the letter at pool `index` to the word
    pub fn select_letter(&mut self, index: usize) -> Result<(), TransitionError> {
        self.ensure_playing()?;
        let len = self.pool.len();
        let slot = self
            .pool
            .get_mut(index)
            .ok_or(TransitionError::SlotOutOfRange { index, len })?;
        if slot.consumed {
            return Err(TransitionError::SlotConsumed { index });
        }

        slot.consumed = true;
        self.buffer.push(slot.letter, index);
        self.last_selected = Some(index);
        self.error = None;
        Ok(())
    }

    /// Select the first free slot holding `letter` (keyboard input)
    pub fn select_letter_char(&mut self, letter: char) -> Result<(), TransitionError> {
        self.ensure_playing()?;
        let letter = letter.to_ascii_uppercase();
        let index = self
            .pool
            .iter()
            .position(|slot| slot.letter == letter && !slot.consumed)
            .ok_or(TransitionError::LetterUnavailable(letter))?;
        self.select_letter(index)
    }

    /// Remove the last letter and free the exact slot it came from
    pub fn backspace(&mut self) -> Result<(), TransitionError> {
        self.ensure_playing()?;
        let index = self.buffer.pop().ok_or(TransitionError::EmptyWord)?;
        self.pool[index].consumed = false;
        self.error = None;
        Ok(())
    }

    /// Empty the word and free every slot it used
    pub fn clear_word(&mut self) -> Result<(), TransitionError> {
        self.ensure_playing()?;
        for &index in self.buffer.trail() {
            self.pool[index].consumed = false;
        }
        self.buffer.clear();
        self.error = None;
        Ok(())
    }

    /// Hand the current word off for validation.
    ///
    /// Only one submission may be in flight at a time.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, TransitionError> {
        self.ensure_playing()?;
        if self.pending.is_some() {
            return Err(TransitionError::SubmitPending);
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(PendingSubmit {
            ticket,
            trail: self.buffer.trail().to_vec(),
        });

        Ok(SubmitRequest {
            ticket,
            word: self.buffer.as_string(),
            history: self.words.iter().map(|w| w.word.clone()).collect(),
        })
    }

    /// Apply the verdict for submission `ticket`.
    pub fn complete_submit(
        &mut self,
        ticket: u64,
        verdict: Verdict,
    ) -> Result<SubmitOutcome, TransitionError> {
        match &self.pending {
            None => return Err(TransitionError::NoPendingSubmit),
            Some(p) if p.ticket != ticket => return Err(TransitionError::UnknownTicket(ticket)),
            Some(_) => {}
        }
        let Some(pending) = self.pending.take() else {
            return Err(TransitionError::NoPendingSubmit);
        };

        if self.phase != Phase::Playing {
            debug!(ticket, phase = ?self.phase, "verdict arrived after game ended");
            return Ok(SubmitOutcome::Discarded);
        }
        if pending.trail != self.buffer.trail() {
            debug!(ticket, "word changed while being checked, verdict discarded");
            return Ok(SubmitOutcome::Discarded);
        }

        let word = self.buffer.as_string();
        let verdict = verdict.and_then(|()| {
            if self.is_used(&word) {
                Err(Rejection::AlreadyUsed)
            } else {
                Ok(())
            }
        });

        match verdict {
            Ok(()) => Ok(SubmitOutcome::Accepted(self.accept(word))),
            Err(rejection) => {
                info!(word = %word, reason = ?rejection, "word rejected");
                self.error = Some(rejection.message());
                Ok(SubmitOutcome::Rejected(rejection))
            }
        }
    }

    /// Validate and apply the current word in one step
    pub async fn submit_word(
        &mut self,
        validator: &Validator,
    ) -> Result<SubmitOutcome, TransitionError> {
        let request = self.begin_submit()?;
        let verdict = validator.validate(&request.word, &request.history).await;
        self.complete_submit(request.ticket, verdict)
    }

    /// One second elapses
    pub fn tick(&mut self) -> Result<(), TransitionError> {
        self.ensure_playing()?;

        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.time_bonus_ticks = self.time_bonus_ticks.saturating_sub(1);
        if self.time_bonus_ticks == 0 {
            self.time_bonus = None;
        }
        self.level_up_ticks = self.level_up_ticks.saturating_sub(1);
        self.last_selected = None;

        if self.time_remaining == 0 {
            self.phase = Phase::Lost;
            info!(points = self.points, words = self.words.len(), "time is up");
        }
        Ok(())
    }

    fn accept(&mut self, word: String) -> Accepted {
        let length = word.chars().count();
        let points = self.scoring.points_for(length);
        let time_bonus = self.scoring.time_bonus_for(length);

        let record = WordRecord {
            word,
            points,
            position: self.words.len(),
        };
        self.words.push(record.clone());
        self.points += points;
        self.time_remaining += time_bonus;

        self.buffer.clear();
        for slot in &mut self.pool {
            slot.consumed = false;
        }
        self.error = None;
        if time_bonus > 0 {
            self.time_bonus = Some(time_bonus);
            self.time_bonus_ticks = self.rules.time_bonus_display_ticks;
        }

        info!(
            word = %record.word,
            points,
            time_bonus,
            total = self.points,
            "word accepted"
        );

        let count = self.words.len();
        let leveled_up = self.rules.is_milestone(count);
        if leveled_up {
            self.level_up();
        }

        let won = count >= self.rules.win_threshold;
        if won {
            self.phase = Phase::Won;
            info!(points = self.points, words = count, "game won");
        }

        Accepted {
            record,
            time_bonus,
            leveled_up,
            won,
        }
    }

    fn level_up(&mut self) {
        let letters = generate_letters_with_rng(self.rules.level_up_letters, &mut self.rng);
        let added: String = letters.iter().collect();
        self.pool.extend(letters.into_iter().map(LetterSlot::new));
        self.level += 1;
        self.level_up_ticks = self.rules.level_up_display_ticks;
        info!(level = self.level, added = %added, "level up");
    }

    fn ensure_playing(&self) -> Result<(), TransitionError> {
        if self.phase == Phase::Playing {
            Ok(())
        } else {
            Err(TransitionError::NotPlaying)
        }
    }

    fn is_used(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.word.eq_ignore_ascii_case(word))
    }

    fn pool_string(&self) -> String {
        self.pool.iter().map(|s| s.letter).collect()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn pool(&self) -> &[LetterSlot] {
        &self.pool
    }

    pub fn buffer(&self) -> &WordBuffer {
        &self.buffer
    }

    pub fn current_word(&self) -> String {
        self.buffer.as_string()
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_selected(&self) -> Option<usize> {
        self.last_selected
    }

    /// Bonus seconds from the last accepted word, while still on display
    pub fn time_bonus(&self) -> Option<u32> {
        self.time_bonus
    }

    pub fn level_up_visible(&self) -> bool {
        self.level_up_ticks > 0
    }

    /// Indices of all consumed slots, ascending
    pub fn consumed_indices(&self) -> Vec<usize> {
        self.pool
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.consumed)
            .map(|(i, _)| i)
            .collect()
    }
}
