//! HTML table views for the turn-based games.

use arcade_core::connect_four::{self, ConnectFourState, Disc};
use arcade_core::memory::{self, MemoryState};
use arcade_core::minesweeper::{Cell, MinesweeperState};
use arcade_core::tic_tac_toe::{TicTacToeState, Verdict};
use arcade_core::wordle::{self, LetterScore, WordleKey, WordleState};
use arcade_core::{Coord, Coord2, GameStatus, ToNdIndex};
use yew::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum BoardMsg {
    Place(usize),
    Drop(Coord),
    Reveal(Coord2),
    Flag(Coord2),
    Flip(usize),
    Key(WordleKey),
}

pub(crate) fn tic_tac_toe(state: &TicTacToeState, callback: &Callback<BoardMsg>) -> Html {
    let line = match state.verdict {
        Verdict::Winner { line, .. } => Some(line),
        Verdict::Open | Verdict::Draw => None,
    };
    html! {
        <table class="tic-tac-toe">
            {
                for (0..3).map(|row| html! {
                    <tr>
                        {
                            for (0..3).map(|col| {
                                let index = row * 3 + col;
                                let onclick = callback.reform(move |_: MouseEvent| BoardMsg::Place(index));
                                let class = classes!(
                                    "cell",
                                    line.is_some_and(|line| line.contains(&index)).then_some("winning"),
                                );
                                let mark = state.board[index].map(|mark| mark.symbol().to_string());
                                html! { <td {class} {onclick}>{mark.unwrap_or_default()}</td> }
                            })
                        }
                    </tr>
                })
            }
        </table>
    }
}

pub(crate) fn connect_four(state: &ConnectFourState, callback: &Callback<BoardMsg>) -> Html {
    html! {
        <table class="connect-four">
            {
                for (0..connect_four::ROWS).map(|row| html! {
                    <tr>
                        {
                            for (0..connect_four::COLUMNS).map(|col| {
                                let coords = (col, row);
                                let onclick = callback.reform(move |_: MouseEvent| BoardMsg::Drop(col));
                                let class = classes!(
                                    "slot",
                                    state.grid[coords.to_nd_index()].map(|disc| match disc {
                                        Disc::Red => "red",
                                        Disc::Yellow => "yellow",
                                    }),
                                    state.winning_cells.contains(&coords).then_some("winning"),
                                    (state.last_drop == Some(coords)).then_some("dropped"),
                                );
                                html! { <td {class} {onclick}/> }
                            })
                        }
                    </tr>
                })
            }
        </table>
    }
}

/// What a minefield cell looks like, including the end-of-game reveal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum ViewCell {
    Hidden,
    Revealed(u8),
    Flagged,
    TriggeredMine,
    Mine,
    Misflagged,
}

pub(crate) fn view_cell(state: &MinesweeperState, coords: Coord2) -> ViewCell {
    let has_mine = state
        .mines
        .as_ref()
        .is_some_and(|mines| mines[coords.to_nd_index()]);

    match state.cell_at(coords) {
        Cell::Hidden => ViewCell::Hidden,
        Cell::Revealed(count) => ViewCell::Revealed(count),
        Cell::Mine if state.triggered_mine == Some(coords) => ViewCell::TriggeredMine,
        Cell::Mine => ViewCell::Mine,
        Cell::Flagged if state.status == GameStatus::Lost && !has_mine => ViewCell::Misflagged,
        Cell::Flagged => ViewCell::Flagged,
    }
}

#[derive(Properties, Clone, PartialEq)]
struct MineCellProps {
    x: Coord,
    y: Coord,
    cell: ViewCell,
    #[prop_or_default]
    locked: bool,
    callback: Callback<BoardMsg>,
}

#[function_component(MineCell)]
fn mine_cell(props: &MineCellProps) -> Html {
    use ViewCell::*;

    let MineCellProps {
        x,
        y,
        cell,
        locked,
        callback,
    } = props.clone();

    let mut class = classes!(
        "cell",
        match cell {
            Hidden => classes!(),
            Revealed(count) => classes!("open", format!("num-{}", count)),
            Flagged => classes!("flag"),
            TriggeredMine => classes!("open", "mine", "oops"),
            Mine => classes!("open", "mine"),
            Misflagged => classes!("flag", "wrong"),
        }
    );
    if locked {
        class.push("locked");
    }

    let onclick = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            log::trace!("({}, {}) reveal", x, y);
            callback.emit(BoardMsg::Reveal((x, y)));
        })
    };
    let oncontextmenu = Callback::from(move |e: MouseEvent| {
        e.prevent_default();
        log::trace!("({}, {}) flag", x, y);
        callback.emit(BoardMsg::Flag((x, y)));
    });

    html! {
        <td {class} {onclick} {oncontextmenu}/>
    }
}

pub(crate) fn minesweeper(state: &MinesweeperState, callback: &Callback<BoardMsg>) -> Html {
    let (cols, rows) = state.config.size;
    let locked = state.status.is_finished();
    html! {
        <table class={classes!("minefield", (!locked).then_some("playable"))}>
            {
                for (0..rows).map(|y| html! {
                    <tr>
                        {
                            for (0..cols).map(|x| {
                                let cell = view_cell(state, (x, y));
                                let callback = callback.clone();
                                html! { <MineCell {x} {y} {cell} {locked} {callback}/> }
                            })
                        }
                    </tr>
                })
            }
        </table>
    }
}

pub(crate) fn memory(state: &MemoryState, callback: &Callback<BoardMsg>) -> Html {
    html! {
        <table class="memory">
            {
                for state.cards.chunks(memory::COLUMNS).enumerate().map(|(row, cards)| html! {
                    <tr>
                        {
                            for cards.iter().enumerate().map(|(col, card)| {
                                let index = row * memory::COLUMNS + col;
                                let onclick = callback.reform(move |_: MouseEvent| BoardMsg::Flip(index));
                                let shown = card.face_up || card.matched;
                                let class = classes!(
                                    "card",
                                    shown.then_some("face-up"),
                                    card.matched.then_some("matched"),
                                );
                                html! {
                                    <td {class} {onclick}>{shown.then(|| card.symbol.to_string()).unwrap_or_default()}</td>
                                }
                            })
                        }
                    </tr>
                })
            }
        </table>
    }
}

fn score_class(score: Option<LetterScore>) -> Option<&'static str> {
    score.map(|score| match score {
        LetterScore::Correct => "correct",
        LetterScore::Present => "present",
        LetterScore::Absent => "absent",
    })
}

pub(crate) fn wordle(state: &WordleState, callback: &Callback<BoardMsg>) -> Html {
    let row = |letters: &str, scores: Option<&[LetterScore; wordle::WORD_LEN]>, class: Classes| {
        let mut letters = letters.chars();
        html! {
            <tr {class}>
                {
                    for (0..wordle::WORD_LEN).map(|i| {
                        let letter = letters.next().map(|l| l.to_ascii_uppercase().to_string());
                        let class = classes!("tile", score_class(scores.map(|s| s[i])));
                        html! { <td {class}>{letter.unwrap_or_default()}</td> }
                    })
                }
            </tr>
        }
    };

    let typing = !state.status.is_finished();
    let blank_rows = wordle::MAX_GUESSES.saturating_sub(state.guesses.len() + usize::from(typing));

    let key = |label: String, intent: WordleKey, class: Classes| {
        let onclick = callback.reform(move |_: MouseEvent| BoardMsg::Key(intent));
        html! { <button {class} {onclick}>{label}</button> }
    };

    html! {
        <div class="wordle">
            <table>
                { for state.guesses.iter().map(|guess| row(&guess.word, Some(&guess.scores), classes!())) }
                if typing {
                    { row(&state.current, None, classes!(state.shake.then_some("shake"))) }
                }
                { for (0..blank_rows).map(|_| row("", None, classes!())) }
            </table>
            <div class="keyboard">
                {
                    for wordle::KEYBOARD_ROWS.iter().enumerate().map(|(i, letters)| {
                        let last = i + 1 == wordle::KEYBOARD_ROWS.len();
                        html! {
                            <div class="keys">
                                if last {
                                    { key("Enter".to_owned(), WordleKey::Enter, classes!("wide")) }
                                }
                                {
                                    for letters.chars().map(|letter| {
                                        let class = classes!("key", score_class(state.keyboard.get(&letter).copied()));
                                        key(letter.to_ascii_uppercase().to_string(), WordleKey::Letter(letter), class)
                                    })
                                }
                                if last {
                                    { key("⌫".to_owned(), WordleKey::Backspace, classes!("wide")) }
                                }
                            </div>
                        }
                    })
                }
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::Engine;
    use arcade_core::minesweeper::Minesweeper;
    use ndarray::Array2;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn game(mines: &[Coord2]) -> Minesweeper {
        let mut mask: Array2<bool> = Array2::default((3, 3));
        for &coords in mines {
            mask[coords.to_nd_index()] = true;
        }
        Minesweeper::with_layout(mask, SmallRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn lost_board_shows_triggered_mine_and_misflags() {
        let mut game = game(&[(0, 0), (0, 1)]);
        game.reveal((1, 1)).unwrap();
        game.toggle_flag((1, 0)).unwrap();
        game.toggle_flag((0, 1)).unwrap();
        game.reveal((0, 0)).unwrap();

        let state = game.snapshot();
        assert_eq!(view_cell(state, (0, 0)), ViewCell::TriggeredMine);
        assert_eq!(view_cell(state, (0, 1)), ViewCell::Mine);
        assert_eq!(view_cell(state, (1, 0)), ViewCell::Misflagged);
        assert_eq!(view_cell(state, (1, 1)), ViewCell::Revealed(2));
        assert_eq!(view_cell(state, (2, 2)), ViewCell::Hidden);
    }

    #[test]
    fn flags_stay_flags_while_playing() {
        let mut game = game(&[(2, 2)]);
        game.toggle_flag((0, 0)).unwrap();
        assert_eq!(view_cell(game.snapshot(), (0, 0)), ViewCell::Flagged);
    }
}
