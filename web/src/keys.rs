//! Maps `KeyboardEvent.key` values to engine intents.

use arcade_core::Direction;
use arcade_core::pong::HeldKeys;
use arcade_core::snake::SnakeCommand;
use arcade_core::tetris::TetrisCommand;
use arcade_core::wordle::WordleKey;

pub(crate) fn arrow(key: &str) -> Option<Direction> {
    use Direction::*;
    match key {
        "ArrowUp" | "w" | "W" => Some(Up),
        "ArrowDown" | "s" | "S" => Some(Down),
        "ArrowLeft" | "a" | "A" => Some(Left),
        "ArrowRight" | "d" | "D" => Some(Right),
        _ => None,
    }
}

pub(crate) fn snake_command(key: &str) -> Option<SnakeCommand> {
    match key {
        " " => Some(SnakeCommand::TogglePause),
        _ => arrow(key).map(SnakeCommand::Turn),
    }
}

pub(crate) fn tetris_command(key: &str) -> Option<TetrisCommand> {
    use TetrisCommand::*;
    match key {
        "ArrowLeft" => Some(Left),
        "ArrowRight" => Some(Right),
        "ArrowUp" => Some(Rotate),
        "ArrowDown" => Some(SoftDrop),
        "p" | "P" => Some(TogglePause),
        _ => None,
    }
}

pub(crate) fn paddle_keys(key: &str) -> HeldKeys {
    match key {
        "ArrowUp" => HeldKeys::UP,
        "ArrowDown" => HeldKeys::DOWN,
        _ => HeldKeys::empty(),
    }
}

pub(crate) fn is_flap(key: &str) -> bool {
    matches!(key, " " | "ArrowUp")
}

pub(crate) fn wordle_key(key: &str) -> Option<WordleKey> {
    match key {
        "Enter" => Some(WordleKey::Enter),
        "Backspace" => Some(WordleKey::Backspace),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_ascii_alphabetic() => {
                    Some(WordleKey::Letter(letter.to_ascii_lowercase()))
                }
                _ => None,
            }
        }
    }
}

/// Keys that would otherwise scroll the page while a game has focus.
pub(crate) fn scrolls_page(key: &str) -> bool {
    matches!(key, " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_share_directions() {
        assert_eq!(arrow("ArrowUp"), Some(Direction::Up));
        assert_eq!(arrow("a"), Some(Direction::Left));
        assert_eq!(arrow("D"), Some(Direction::Right));
        assert_eq!(arrow("Enter"), None);
    }

    #[test]
    fn space_pauses_snake_and_p_pauses_tetris() {
        assert_eq!(snake_command(" "), Some(SnakeCommand::TogglePause));
        assert_eq!(tetris_command(" "), None);
        assert_eq!(tetris_command("P"), Some(TetrisCommand::TogglePause));
        assert_eq!(tetris_command("ArrowUp"), Some(TetrisCommand::Rotate));
    }

    #[test]
    fn only_arrows_move_the_paddle() {
        assert_eq!(paddle_keys("ArrowDown"), HeldKeys::DOWN);
        assert!(paddle_keys("s").is_empty());
    }

    #[test]
    fn wordle_accepts_single_letters_only() {
        assert_eq!(wordle_key("Q"), Some(WordleKey::Letter('q')));
        assert_eq!(wordle_key("Enter"), Some(WordleKey::Enter));
        assert_eq!(wordle_key("Shift"), None);
        assert_eq!(wordle_key("1"), None);
        assert_eq!(wordle_key("é"), None);
    }
}
