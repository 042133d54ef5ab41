use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub const COLUMNS: usize = 4;
pub const SYMBOLS: [char; 16] = [
    '🐶', '🐱', '🐭', '🐹', '🐰', '🦊', '🐻', '🐼', '🐨', '🐯', '🦁', '🐮', '🐷', '🐸', '🐵', '🐔',
];

/// Delay before a matched pair is locked in.
pub const MATCH_DELAY: Millis = 500;
/// Delay before a mismatched pair turns back over.
pub const MISMATCH_DELAY: Millis = 1000;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn rows(self) -> usize {
        match self {
            Self::Easy => 4,
            Self::Medium => 6,
            Self::Hard => 8,
        }
    }

    pub const fn pairs(self) -> usize {
        COLUMNS * self.rows() / 2
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub symbol: char,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryMove {
    Flip(usize),
    /// Resolves the pending pair once its delay has passed.
    Settle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryOutcome {
    Idle,
    FirstFlipped,
    /// Two cards are up; the host settles them after `delay`.
    PairFlipped { matched: bool, delay: Millis },
    Matched,
    Mismatched,
    Won,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub difficulty: Difficulty,
    /// Row-major, `COLUMNS` wide.
    pub cards: Vec<Card>,
    pub first: Option<usize>,
    pub pending: Option<(usize, usize)>,
    pub moves: u32,
    pub matched_pairs: usize,
    pub status: GameStatus,
}

impl MemoryState {
    /// Three stars for at most 1.2 moves per pair, two for 1.6, otherwise one.
    pub fn stars(&self) -> u8 {
        let moves = self.moves as usize * 10;
        let pairs = self.difficulty.pairs();
        if moves <= pairs * 12 {
            3
        } else if moves <= pairs * 16 {
            2
        } else {
            1
        }
    }

    fn pair_matches(&self, (a, b): (usize, usize)) -> bool {
        self.cards[a].symbol == self.cards[b].symbol
    }
}

#[derive(Clone, Debug)]
pub struct Memory<R = SmallRng> {
    state: MemoryState,
    rng: R,
}

impl Memory<SmallRng> {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Memory<R> {
    pub fn with_rng(difficulty: Difficulty, mut rng: R) -> Self {
        let state = Self::deal(difficulty, &mut rng);
        Self { state, rng }
    }

    fn deal(difficulty: Difficulty, rng: &mut R) -> MemoryState {
        let symbols = &SYMBOLS[..difficulty.pairs()];
        let mut cards: Vec<Card> = symbols
            .iter()
            .chain(symbols)
            .map(|&symbol| Card {
                symbol,
                face_up: false,
                matched: false,
            })
            .collect();
        cards.shuffle(rng);

        MemoryState {
            difficulty,
            cards,
            first: None,
            pending: None,
            moves: 0,
            matched_pairs: 0,
            status: GameStatus::NotStarted,
        }
    }

    pub fn flip(&mut self, index: usize) -> Result<MemoryOutcome> {
        self.state.status.check_not_finished()?;
        if self.state.pending.is_some() {
            return Err(GameError::PairPending);
        }
        let card = self
            .state
            .cards
            .get_mut(index)
            .ok_or(GameError::InvalidCoords)?;
        if card.face_up || card.matched {
            return Err(GameError::CellUnavailable);
        }

        card.face_up = true;
        self.state.status.start();

        Ok(match self.state.first.take() {
            None => {
                self.state.first = Some(index);
                MemoryOutcome::FirstFlipped
            }
            Some(first) => {
                let pair = (first, index);
                self.state.pending = Some(pair);
                self.state.moves += 1;
                let matched = self.state.pair_matches(pair);
                let delay = if matched { MATCH_DELAY } else { MISMATCH_DELAY };
                MemoryOutcome::PairFlipped { matched, delay }
            }
        })
    }

    pub fn settle(&mut self) -> Result<MemoryOutcome> {
        self.state.status.check_not_finished()?;
        let Some(pair @ (a, b)) = self.state.pending.take() else {
            return Ok(MemoryOutcome::Idle);
        };

        if self.state.pair_matches(pair) {
            for index in [a, b] {
                self.state.cards[index].matched = true;
            }
            self.state.matched_pairs += 1;
            if self.state.matched_pairs == self.state.difficulty.pairs() {
                self.state.status.finish(GameStatus::Won);
                return Ok(MemoryOutcome::Won);
            }
            Ok(MemoryOutcome::Matched)
        } else {
            for index in [a, b] {
                self.state.cards[index].face_up = false;
            }
            Ok(MemoryOutcome::Mismatched)
        }
    }
}

impl<R: Rng> Engine for Memory<R> {
    type Intent = MemoryMove;
    type Outcome = MemoryOutcome;
    type Snapshot = MemoryState;

    fn submit(&mut self, intent: MemoryMove) -> Result<MemoryOutcome> {
        match intent {
            MemoryMove::Flip(index) => self.flip(index),
            MemoryMove::Settle => self.settle(),
        }
    }

    fn snapshot(&self) -> &MemoryState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = Self::deal(self.state.difficulty, &mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner_of(game: &Memory, index: usize) -> usize {
        let cards = &game.snapshot().cards;
        (0..cards.len())
            .find(|&i| i != index && cards[i].symbol == cards[index].symbol)
            .unwrap()
    }

    fn mismatch_of(game: &Memory, index: usize) -> usize {
        let cards = &game.snapshot().cards;
        (0..cards.len())
            .find(|&i| cards[i].symbol != cards[index].symbol)
            .unwrap()
    }

    #[test]
    fn deck_holds_each_symbol_twice() {
        for difficulty in Difficulty::ALL {
            let game = Memory::new(difficulty, 5);
            let cards = &game.snapshot().cards;
            assert_eq!(cards.len(), COLUMNS * difficulty.rows());
            for symbol in &SYMBOLS[..difficulty.pairs()] {
                assert_eq!(cards.iter().filter(|c| c.symbol == *symbol).count(), 2);
            }
        }
    }

    #[test]
    fn pending_pair_blocks_flips_until_settled() {
        let mut game = Memory::new(Difficulty::Easy, 9);
        let other = mismatch_of(&game, 0);

        assert_eq!(game.flip(0), Ok(MemoryOutcome::FirstFlipped));
        assert_eq!(game.flip(0), Err(GameError::CellUnavailable));
        assert_eq!(
            game.flip(other),
            Ok(MemoryOutcome::PairFlipped {
                matched: false,
                delay: MISMATCH_DELAY
            })
        );
        let third = (0..16).find(|&i| i != 0 && i != other).unwrap();
        assert_eq!(game.flip(third), Err(GameError::PairPending));

        assert_eq!(game.settle(), Ok(MemoryOutcome::Mismatched));
        let state = game.snapshot();
        assert!(!state.cards[0].face_up && !state.cards[other].face_up);
        assert_eq!(state.moves, 1);
    }

    #[test]
    fn matching_every_pair_wins_with_three_stars() {
        let mut game = Memory::new(Difficulty::Easy, 2);

        for _ in 0..Difficulty::Easy.pairs() {
            let first = game
                .snapshot()
                .cards
                .iter()
                .position(|card| !card.matched)
                .unwrap();
            let second = partner_of(&game, first);
            game.flip(first).unwrap();
            assert_eq!(
                game.flip(second),
                Ok(MemoryOutcome::PairFlipped {
                    matched: true,
                    delay: MATCH_DELAY
                })
            );
            game.settle().unwrap();
        }

        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.snapshot().stars(), 3);
        assert_eq!(game.flip(0), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn stars_drop_with_extra_moves() {
        let mut state = Memory::new(Difficulty::Easy, 0).snapshot().clone();
        state.moves = 12;
        assert_eq!(state.stars(), 2);
        state.moves = 13;
        assert_eq!(state.stars(), 1);
    }

    #[test]
    fn settle_without_pair_is_idle() {
        let mut game = Memory::new(Difficulty::Medium, 4);
        assert_eq!(game.settle(), Ok(MemoryOutcome::Idle));
        assert_eq!(game.flip(24), Err(GameError::InvalidCoords));
    }
}
