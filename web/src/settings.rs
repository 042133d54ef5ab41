use arcade_core::connect_four::Opponent;
use arcade_core::memory::Difficulty;
use arcade_core::minesweeper::MinesweeperConfig;
use serde::{Deserialize, Serialize};

use crate::utils::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum MinefieldPreset {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl MinefieldPreset {
    pub(crate) const ALL: [MinefieldPreset; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub(crate) const fn config(self) -> MinesweeperConfig {
        use MinefieldPreset::*;
        match self {
            Easy => MinesweeperConfig::EASY,
            Medium => MinesweeperConfig::MEDIUM,
            Hard => MinesweeperConfig::HARD,
        }
    }

    pub(crate) const fn label(self) -> &'static str {
        use MinefieldPreset::*;
        match self {
            Easy => "Easy",
            Medium => "Medium",
            Hard => "Hard",
        }
    }
}

/// Last choices made on the games that have options.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub minefield: MinefieldPreset,
    pub memory: Difficulty,
    pub opponent: Opponent,
}

impl StorageKey for Settings {
    const KEY: &'static str = "arcade:settings:v1";
}
