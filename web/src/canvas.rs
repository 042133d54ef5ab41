//! 2-D canvas painters for the clocked games.

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use arcade_core::flappy::{FlappyConfig, FlappyState};
use arcade_core::pac_man::{self, PacManState, Tile};
use arcade_core::pong::{PongConfig, PongState};
use arcade_core::snake::{SnakeConfig, SnakeState};
use arcade_core::tetris::{self, TetrisState};
use arcade_core::{Coord2, Direction};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

pub(crate) type PaintResult = Result<(), JsValue>;

pub(crate) const SNAKE_CELL: f64 = 15.0;
pub(crate) const TETRIS_CELL: f64 = 25.0;
pub(crate) const MAZE_CELL: f64 = 20.0;

const GHOST_COLORS: [&str; 4] = ["#ff0000", "#00ffff", "#ffb8ff", "#ffb852"];
const SCARED_GHOST: &str = "#2121ff";

fn clear(ctx: &CanvasRenderingContext2d, width: f64, height: f64, color: &str) {
    ctx.set_fill_style_str(color);
    ctx.fill_rect(0.0, 0.0, width, height);
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, color: &str) -> PaintResult {
    ctx.set_fill_style_str(color);
    ctx.begin_path();
    ctx.arc(x, y, radius, 0.0, TAU)?;
    ctx.fill();
    Ok(())
}

fn banner(ctx: &CanvasRenderingContext2d, width: f64, height: f64, text: &str) -> PaintResult {
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.6)");
    ctx.fill_rect(0.0, height / 2.0 - 30.0, width, 60.0);
    ctx.set_fill_style_str("#ffffff");
    ctx.set_font("24px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(text, width / 2.0, height / 2.0)
}

fn cell_origin((x, y): Coord2, size: f64) -> (f64, f64) {
    (f64::from(x) * size, f64::from(y) * size)
}

pub(crate) fn snake_size(config: &SnakeConfig) -> (f64, f64) {
    cell_origin(config.size, SNAKE_CELL)
}

pub(crate) fn paint_snake(ctx: &CanvasRenderingContext2d, config: &SnakeConfig, state: &SnakeState) -> PaintResult {
    let (width, height) = snake_size(config);
    clear(ctx, width, height, "#111111");

    if let Some(food) = state.food {
        let (x, y) = cell_origin(food, SNAKE_CELL);
        circle(ctx, x + SNAKE_CELL / 2.0, y + SNAKE_CELL / 2.0, SNAKE_CELL / 2.0 - 1.0, "#ef4444")?;
    }
    for (i, &segment) in state.body.iter().enumerate() {
        let (x, y) = cell_origin(segment, SNAKE_CELL);
        ctx.set_fill_style_str(if i == 0 { "#4ade80" } else { "#22c55e" });
        ctx.fill_rect(x + 1.0, y + 1.0, SNAKE_CELL - 2.0, SNAKE_CELL - 2.0);
    }

    if state.paused {
        banner(ctx, width, height, "Paused")?;
    } else if state.status.is_ready() {
        banner(ctx, width, height, "Use the arrow keys")?;
    }
    Ok(())
}

pub(crate) const fn tetris_size() -> (f64, f64) {
    (tetris::WIDTH as f64 * TETRIS_CELL, tetris::HEIGHT as f64 * TETRIS_CELL)
}

pub(crate) fn paint_tetris(ctx: &CanvasRenderingContext2d, state: &TetrisState) -> PaintResult {
    let (width, height) = tetris_size();
    clear(ctx, width, height, "#111111");

    let block = |x: f64, y: f64, color: &str| {
        ctx.set_fill_style_str(color);
        ctx.fill_rect(x * TETRIS_CELL + 1.0, y * TETRIS_CELL + 1.0, TETRIS_CELL - 2.0, TETRIS_CELL - 2.0);
    };

    for ((row, col), cell) in state.board.indexed_iter() {
        if let Some(kind) = cell {
            block(col as f64, row as f64, kind.color());
        }
    }
    for (x, y) in state.piece.cells().filter(|&(_, y)| y >= 0) {
        block(f64::from(x), f64::from(y), state.piece.kind.color());
    }

    if state.paused {
        banner(ctx, width, height, "Paused")?;
    }
    Ok(())
}

pub(crate) fn pong_size(config: &PongConfig) -> (f64, f64) {
    (f64::from(config.width), f64::from(config.height))
}

pub(crate) fn paint_pong(ctx: &CanvasRenderingContext2d, config: &PongConfig, state: &PongState) -> PaintResult {
    let (width, height) = pong_size(config);
    clear(ctx, width, height, "#000000");

    ctx.set_fill_style_str("#444444");
    let mut y = 0.0;
    while y < height {
        ctx.fill_rect(width / 2.0 - 1.0, y, 2.0, 10.0);
        y += 20.0;
    }

    ctx.set_fill_style_str("#ffffff");
    let paddle_w = f64::from(config.paddle_width);
    let paddle_h = f64::from(config.paddle_height);
    ctx.fill_rect(f64::from(config.player_x()), f64::from(state.player_y), paddle_w, paddle_h);
    ctx.fill_rect(f64::from(config.ai_x()), f64::from(state.ai_y), paddle_w, paddle_h);
    circle(
        ctx,
        f64::from(state.ball.x),
        f64::from(state.ball.y),
        f64::from(config.ball_radius),
        "#ffffff",
    )?;

    ctx.set_font("32px monospace");
    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    ctx.fill_text(&state.player_score.to_string(), width / 4.0, 20.0)?;
    ctx.fill_text(&state.ai_score.to_string(), width * 3.0 / 4.0, 20.0)
}

pub(crate) fn flappy_size(config: &FlappyConfig) -> (f64, f64) {
    (f64::from(config.width), f64::from(config.height))
}

pub(crate) fn paint_flappy(ctx: &CanvasRenderingContext2d, config: &FlappyConfig, state: &FlappyState) -> PaintResult {
    let (width, height) = flappy_size(config);
    let floor = f64::from(config.floor());
    clear(ctx, width, height, "#70c5ce");

    ctx.set_fill_style_str("#2e8b57");
    let pipe_w = f64::from(config.pipe_width);
    for pipe in &state.pipes {
        let x = f64::from(pipe.x);
        let top = f64::from(pipe.top);
        let bottom = top + f64::from(config.pipe_gap);
        ctx.fill_rect(x, 0.0, pipe_w, top);
        ctx.fill_rect(x, bottom, pipe_w, floor - bottom);
    }

    ctx.set_fill_style_str("#ded895");
    ctx.fill_rect(0.0, floor, width, height - floor);

    circle(
        ctx,
        f64::from(config.bird_x),
        f64::from(state.bird_y),
        f64::from(config.bird_radius),
        "#f7d51d",
    )?;

    if state.status.is_ready() {
        banner(ctx, width, height, "Tap or press Space")?;
    }
    Ok(())
}

pub(crate) fn pac_man_size() -> (f64, f64) {
    cell_origin((pac_man::MAZE_WIDTH, pac_man::MAZE_HEIGHT), MAZE_CELL)
}

/// Mouth opening centred on the heading, as `(start, end)` angles.
fn mouth(heading: Direction) -> (f64, f64) {
    let facing = match heading {
        Direction::Right => 0.0,
        Direction::Down => PI / 2.0,
        Direction::Left => PI,
        Direction::Up => PI * 1.5,
    };
    (facing + FRAC_PI_4, facing - FRAC_PI_4 + TAU)
}

pub(crate) fn paint_pac_man(ctx: &CanvasRenderingContext2d, state: &PacManState) -> PaintResult {
    let (width, height) = pac_man_size();
    clear(ctx, width, height, "#000000");
    let half = MAZE_CELL / 2.0;

    for ((x, y), tile) in state.maze.indexed_iter() {
        let (px, py) = (x as f64 * MAZE_CELL, y as f64 * MAZE_CELL);
        match tile {
            Tile::Wall => {
                ctx.set_fill_style_str("#1919a6");
                ctx.fill_rect(px, py, MAZE_CELL, MAZE_CELL);
            }
            Tile::Dot => circle(ctx, px + half, py + half, 2.0, "#ffb8ae")?,
            Tile::Pellet => circle(ctx, px + half, py + half, 6.0, "#ffb8ae")?,
            Tile::Empty => {}
        }
    }

    let (px, py) = cell_origin(state.player.pos, MAZE_CELL);
    let (start, end) = mouth(state.player.heading);
    ctx.set_fill_style_str("#ffff00");
    ctx.begin_path();
    ctx.move_to(px + half, py + half);
    ctx.arc(px + half, py + half, half - 2.0, start, end)?;
    ctx.close_path();
    ctx.fill();

    for (ghost, color) in state.ghosts.iter().zip(GHOST_COLORS) {
        let (gx, gy) = cell_origin(ghost.pos, MAZE_CELL);
        let color = if state.is_powered() { SCARED_GHOST } else { color };
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        ctx.arc(gx + half, gy + half, half - 2.0, PI, 0.0)?;
        ctx.line_to(gx + MAZE_CELL - 2.0, gy + MAZE_CELL - 2.0);
        ctx.line_to(gx + 2.0, gy + MAZE_CELL - 2.0);
        ctx.close_path();
        ctx.fill();
    }

    if state.status.is_ready() {
        banner(ctx, width, height, "Use the arrow keys")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvases_fit_their_boards() {
        assert_eq!(snake_size(&SnakeConfig::default()), (450.0, 450.0));
        assert_eq!(tetris_size(), (250.0, 500.0));
        assert_eq!(pac_man_size(), (380.0, 420.0));
    }

    #[test]
    fn mouth_opens_towards_the_heading() {
        let (start, end) = mouth(Direction::Right);
        assert_eq!(start, FRAC_PI_4);
        assert_eq!(end, TAU - FRAC_PI_4);

        let (start, _) = mouth(Direction::Left);
        assert_eq!(start, PI + FRAC_PI_4);
    }
}
