use ndarray::Array2;
use rand::Rng;

use super::MinesweeperConfig;
use crate::*;

/// How much of the board around the first reveal is kept free of mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SafeZone {
    /// Only the revealed cell.
    StartCell,
    /// The revealed cell and its up-to-eight neighbours.
    Neighborhood,
}

/// Places `config.mines` uniformly at random outside the safe zone around
/// `start`, falling back to a smaller zone when the board is too crowded.
pub fn place_mines<R: Rng + ?Sized>(
    config: MinesweeperConfig,
    start: Coord2,
    rng: &mut R,
) -> Array2<bool> {
    use SafeZone::*;

    let total_cells = config.total_cells();
    let neighborhood = 1 + NeighborIter::new(start, config.size).count() as CellCount;

    if config.mines >= total_cells {
        log::warn!(
            "Minefield already full, requested {} but only fits {}",
            config.mines,
            total_cells
        );
        return Array2::from_elem(config.size.to_nd_index(), true);
    }

    let zone = if config.mines + neighborhood <= total_cells {
        Neighborhood
    } else {
        log::warn!("Cannot keep the 3x3 area around the first reveal clear, protecting only the cell");
        StartCell
    };

    // pre-mark the safe zone so the draw below skips it
    let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
    let mut free_cells = match zone {
        StartCell => {
            mines[start.to_nd_index()] = true;
            total_cells - 1
        }
        Neighborhood => {
            mines[start.to_nd_index()] = true;
            for coords in NeighborIter::new(start, config.size) {
                mines[coords.to_nd_index()] = true;
            }
            total_cells - neighborhood
        }
    };

    let mut placed: CellCount = 0;
    for cell in mines.iter_mut() {
        if placed == config.mines || free_cells == 0 {
            break;
        }
        if *cell {
            continue;
        }
        // selection sampling: keep each free cell with probability needed/remaining
        if rng.random_range(0..free_cells) < config.mines - placed {
            *cell = true;
            placed += 1;
        }
        free_cells -= 1;
    }

    // undo the pre-marking
    match zone {
        StartCell => mines[start.to_nd_index()] = false,
        Neighborhood => {
            mines[start.to_nd_index()] = false;
            for coords in NeighborIter::new(start, config.size) {
                mines[coords.to_nd_index()] = false;
            }
        }
    }

    let count = mines.iter().filter(|&&mine| mine).count();
    if count != usize::from(config.mines) {
        log::warn!(
            "Generated minefield count mismatch, actual: {}, requested: {}",
            count,
            config.mines
        );
    }
    mines
}
