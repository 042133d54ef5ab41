use std::collections::BTreeMap;

use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub const WORD_LEN: usize = 5;
pub const MAX_GUESSES: usize = 6;

pub const WORDS: [&str; 49] = [
    "apple", "beach", "brain", "bread", "brush", "chair", "chest", "chord", "click", "clock",
    "cloud", "dance", "diary", "drink", "earth", "flute", "fruit", "ghost", "grape", "green",
    "happy", "heart", "house", "juice", "light", "money", "music", "party", "pizza", "plant",
    "radio", "river", "robot", "smile", "snake", "space", "storm", "story", "sugar", "table",
    "tiger", "train", "water", "whale", "wheel", "woman", "world", "write", "youth",
];

/// On-screen keyboard layout; `Enter` and `Backspace` sit on the last row.
pub const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Ordered so that `max` keeps the most informative result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterScore {
    Absent,
    Present,
    Correct,
}

/// Scores `guess` against `target`. Exact matches are claimed first, then each
/// remaining target letter can mark at most one other guess letter present.
pub fn score_guess(guess: &[u8; WORD_LEN], target: &[u8; WORD_LEN]) -> [LetterScore; WORD_LEN] {
    let mut scores = [LetterScore::Absent; WORD_LEN];
    let mut unclaimed = [0u8; 26];

    for i in 0..WORD_LEN {
        if guess[i] == target[i] {
            scores[i] = LetterScore::Correct;
        } else if let Some(slot) = unclaimed.get_mut(usize::from(target[i].wrapping_sub(b'a'))) {
            *slot += 1;
        }
    }

    for i in 0..WORD_LEN {
        if scores[i] == LetterScore::Correct {
            continue;
        }
        if let Some(slot) = unclaimed.get_mut(usize::from(guess[i].wrapping_sub(b'a'))) {
            if *slot > 0 {
                *slot -= 1;
                scores[i] = LetterScore::Present;
            }
        }
    }
    scores
}

fn to_letters(word: &str) -> Option<[u8; WORD_LEN]> {
    word.as_bytes().try_into().ok()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WordleKey {
    Letter(char),
    Backspace,
    Enter,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WordleOutcome {
    Edited,
    Scored([LetterScore; WORD_LEN]),
    Won,
    Lost,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredGuess {
    pub word: String,
    pub scores: [LetterScore; WORD_LEN],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordleState {
    pub target: String,
    pub guesses: Vec<ScoredGuess>,
    pub current: String,
    /// Best result seen per letter, for the on-screen keyboard.
    pub keyboard: BTreeMap<char, LetterScore>,
    pub message: Option<String>,
    /// Set when a guess was refused, cleared by the host after the animation.
    pub shake: bool,
    pub status: GameStatus,
}

impl WordleState {
    fn new(target: &str) -> Self {
        Self {
            target: target.to_owned(),
            guesses: Vec::with_capacity(MAX_GUESSES),
            current: String::with_capacity(WORD_LEN),
            keyboard: BTreeMap::new(),
            message: None,
            shake: false,
            status: GameStatus::NotStarted,
        }
    }

    pub fn guesses_left(&self) -> usize {
        MAX_GUESSES - self.guesses.len()
    }
}

#[derive(Clone, Debug)]
pub struct Wordle<R = SmallRng> {
    state: WordleState,
    rng: R,
}

impl Wordle<SmallRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Wordle<R> {
    pub fn with_rng(mut rng: R) -> Self {
        let target = Self::pick(&mut rng);
        Self {
            state: WordleState::new(target),
            rng,
        }
    }

    /// Plays against a fixed target word.
    pub fn with_target(target: &str, rng: R) -> Result<Self> {
        if target.len() != WORD_LEN {
            return Err(GameError::WordLength(WORD_LEN));
        }
        Ok(Self {
            state: WordleState::new(&target.to_ascii_lowercase()),
            rng,
        })
    }

    fn pick(rng: &mut R) -> &'static str {
        WORDS[rng.random_range(0..WORDS.len())]
    }

    pub fn clear_shake(&mut self) {
        self.state.shake = false;
    }

    pub fn type_letter(&mut self, letter: char) -> Result<WordleOutcome> {
        self.state.status.check_not_finished()?;
        if !letter.is_ascii_alphabetic() || self.state.current.len() >= WORD_LEN {
            return Err(GameError::CellUnavailable);
        }
        self.state.current.push(letter.to_ascii_lowercase());
        Ok(WordleOutcome::Edited)
    }

    pub fn backspace(&mut self) -> Result<WordleOutcome> {
        self.state.status.check_not_finished()?;
        self.state
            .current
            .pop()
            .map(|_| WordleOutcome::Edited)
            .ok_or(GameError::CellUnavailable)
    }

    pub fn enter(&mut self) -> Result<WordleOutcome> {
        self.state.status.check_not_finished()?;

        let Some(guess) = to_letters(&self.state.current) else {
            return Err(self.refuse(GameError::WordLength(WORD_LEN)));
        };
        if !WORDS.contains(&self.state.current.as_str()) {
            return Err(self.refuse(GameError::NotInWordList));
        }
        let target = to_letters(&self.state.target).ok_or(GameError::WordLength(WORD_LEN))?;

        let scores = score_guess(&guess, &target);
        for (&letter, &score) in guess.iter().zip(&scores) {
            let best = self
                .state
                .keyboard
                .entry(char::from(letter))
                .or_insert(score);
            *best = (*best).max(score);
        }

        let word = std::mem::take(&mut self.state.current);
        self.state.status.start();
        self.state.message = None;
        self.state.shake = false;
        let won = word == self.state.target;
        self.state.guesses.push(ScoredGuess { word, scores });

        Ok(if won {
            self.state.message = Some("You won!".to_owned());
            self.state.status.finish(GameStatus::Won);
            WordleOutcome::Won
        } else if self.state.guesses.len() >= MAX_GUESSES {
            self.state.message = Some(format!("You lost! The word was {}", self.state.target));
            self.state.status.finish(GameStatus::Lost);
            WordleOutcome::Lost
        } else {
            WordleOutcome::Scored(scores)
        })
    }

    fn refuse(&mut self, err: GameError) -> GameError {
        self.state.message = Some(err.to_string());
        self.state.shake = true;
        err
    }
}

impl<R: Rng> Engine for Wordle<R> {
    type Intent = WordleKey;
    type Outcome = WordleOutcome;
    type Snapshot = WordleState;

    fn submit(&mut self, key: WordleKey) -> Result<WordleOutcome> {
        match key {
            WordleKey::Letter(letter) => self.type_letter(letter),
            WordleKey::Backspace => self.backspace(),
            WordleKey::Enter => self.enter(),
        }
    }

    fn snapshot(&self) -> &WordleState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        let target = Self::pick(&mut self.rng);
        self.state = WordleState::new(target);
    }
}
