use arcade_core::connect_four::{ConnectFour, ConnectFourConfig, ConnectFourMove, Disc, Opponent};
use arcade_core::flappy::{Flap, FlappyBird, FlappyConfig};
use arcade_core::memory::{Memory, MemoryMove, MemoryOutcome};
use arcade_core::minesweeper::{Minesweeper, MinesweeperMove};
use arcade_core::pac_man::{PacMan, PacManCommand, PacManConfig};
use arcade_core::pong::{Pong, PongConfig, PongInput};
use arcade_core::snake::{Snake, SnakeConfig};
use arcade_core::tetris::Tetris;
use arcade_core::tic_tac_toe::{TicTacToe, Verdict};
use arcade_core::wordle::Wordle;
use arcade_core::{Clocked, Engine, FrameClock, GameKind, GameStatus, Millis, Result};
use chrono::prelude::*;
use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};
use yew::prelude::*;

use crate::board::{self, BoardMsg};
use crate::canvas;
use crate::keys;
use crate::settings::{MinefieldPreset, Settings};
use crate::utils::*;

/// How long the computer "thinks" before dropping its disc.
const COMPUTER_DELAY: Millis = 1000;
const SHAKE_DURATION: Millis = 500;

fn accepted<T>(result: Result<T>) -> Option<T> {
    result
        .map_err(|err| log::debug!("move rejected: {}", err))
        .ok()
}

fn status_word(status: GameStatus) -> Option<&'static str> {
    match status {
        GameStatus::Won => Some("You win!"),
        GameStatus::Lost => Some("Game over"),
        GameStatus::Draw => Some("Draw"),
        GameStatus::NotStarted | GameStatus::InProgress => None,
    }
}

fn with_ending(ending: Option<&str>, summary: String) -> String {
    match ending {
        Some(ending) => format!("{} | {}", ending, summary),
        None => summary,
    }
}

/// Minefield plus the wall-clock span from the first reveal to the end.
#[derive(Clone, Debug)]
pub(crate) struct MinesweeperSession {
    pub game: Minesweeper,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl MinesweeperSession {
    fn new(game: Minesweeper) -> Self {
        Self {
            game,
            started_at: None,
            ended_at: None,
        }
    }

    fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or(now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }

    fn on_successful_move(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_none() && self.game.status().is_running() {
            self.started_at = Some(now);
        }
        if self.game.is_finished() && self.ended_at.is_none() {
            self.started_at.get_or_insert(now);
            self.ended_at = Some(now);
        }
    }

    fn reset(&mut self) {
        self.game.reset();
        self.started_at = None;
        self.ended_at = None;
    }
}

/// Work the host has to schedule after a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FollowUp {
    ComputerTurn,
    Settle(Millis),
    ClearShake,
}

/// The engine currently on screen.
#[derive(Clone, Debug)]
pub(crate) enum Mounted {
    TicTacToe(TicTacToe),
    ConnectFour(ConnectFour),
    Minesweeper(MinesweeperSession),
    Memory(Memory),
    Wordle(Wordle),
    Snake(Snake),
    Tetris(Tetris),
    Pong(Pong),
    FlappyBird(FlappyBird),
    PacMan(PacMan),
}

impl Mounted {
    pub(crate) fn new(kind: GameKind, settings: &Settings, seed: u64) -> Self {
        use GameKind as K;
        match kind {
            K::TicTacToe => Self::TicTacToe(TicTacToe::new()),
            K::ConnectFour => Self::ConnectFour(ConnectFour::new(
                ConnectFourConfig {
                    opponent: settings.opponent,
                },
                seed,
            )),
            K::Minesweeper => Self::Minesweeper(MinesweeperSession::new(Minesweeper::new(
                settings.minefield.config(),
                seed,
            ))),
            K::Memory => Self::Memory(Memory::new(settings.memory, seed)),
            K::Wordle => Self::Wordle(Wordle::new(seed)),
            K::Snake => Self::Snake(Snake::new(SnakeConfig::default(), seed)),
            K::Tetris => Self::Tetris(Tetris::new(seed)),
            K::Pong => Self::Pong(Pong::new(PongConfig::default(), seed)),
            K::FlappyBird => Self::FlappyBird(FlappyBird::new(FlappyConfig::default(), seed)),
            K::PacMan => Self::PacMan(PacMan::new(PacManConfig::default(), seed)),
        }
    }

    pub(crate) fn kind(&self) -> GameKind {
        match self {
            Self::TicTacToe(_) => GameKind::TicTacToe,
            Self::ConnectFour(_) => GameKind::ConnectFour,
            Self::Minesweeper(_) => GameKind::Minesweeper,
            Self::Memory(_) => GameKind::Memory,
            Self::Wordle(_) => GameKind::Wordle,
            Self::Snake(_) => GameKind::Snake,
            Self::Tetris(_) => GameKind::Tetris,
            Self::Pong(_) => GameKind::Pong,
            Self::FlappyBird(_) => GameKind::FlappyBird,
            Self::PacMan(_) => GameKind::PacMan,
        }
    }

    pub(crate) fn status(&self) -> GameStatus {
        match self {
            Self::TicTacToe(game) => game.status(),
            Self::ConnectFour(game) => game.status(),
            Self::Minesweeper(session) => session.game.status(),
            Self::Memory(game) => game.status(),
            Self::Wordle(game) => game.status(),
            Self::Snake(game) => game.status(),
            Self::Tetris(game) => game.status(),
            Self::Pong(game) => game.status(),
            Self::FlappyBird(game) => game.status(),
            Self::PacMan(game) => game.status(),
        }
    }

    pub(crate) fn reset(&mut self) {
        match self {
            Self::TicTacToe(game) => game.reset(),
            Self::ConnectFour(game) => game.reset(),
            Self::Minesweeper(session) => session.reset(),
            Self::Memory(game) => game.reset(),
            Self::Wordle(game) => game.reset(),
            Self::Snake(game) => game.reset(),
            Self::Tetris(game) => game.reset(),
            Self::Pong(game) => game.reset(),
            Self::FlappyBird(game) => game.reset(),
            Self::PacMan(game) => game.reset(),
        }
    }

    pub(crate) fn tick(&mut self, dt: Millis) {
        match self {
            Self::Snake(game) => game.tick(dt),
            Self::Tetris(game) => game.tick(dt),
            Self::Pong(game) => game.tick(dt),
            Self::FlappyBird(game) => game.tick(dt),
            Self::PacMan(game) => game.tick(dt),
            Self::TicTacToe(_)
            | Self::ConnectFour(_)
            | Self::Minesweeper(_)
            | Self::Memory(_)
            | Self::Wordle(_) => {}
        }
    }

    pub(crate) fn key_down(&mut self, key: &str) -> Option<FollowUp> {
        match self {
            Self::Snake(game) => {
                if let Some(command) = keys::snake_command(key) {
                    accepted(game.submit(command));
                }
            }
            Self::Tetris(game) => {
                if let Some(command) = keys::tetris_command(key) {
                    accepted(game.submit(command));
                }
            }
            Self::Pong(game) => {
                let held = keys::paddle_keys(key);
                if !held.is_empty() {
                    accepted(game.submit(PongInput::Press(held)));
                }
            }
            Self::FlappyBird(game) => {
                if keys::is_flap(key) {
                    accepted(game.submit(Flap));
                }
            }
            Self::PacMan(game) => {
                if let Some(direction) = keys::arrow(key) {
                    accepted(game.submit(PacManCommand::Turn(direction)));
                }
            }
            Self::Wordle(game) => {
                let intent = keys::wordle_key(key)?;
                return Self::wordle_key(game, intent);
            }
            Self::TicTacToe(_) | Self::ConnectFour(_) | Self::Minesweeper(_) | Self::Memory(_) => {}
        }
        None
    }

    pub(crate) fn key_up(&mut self, key: &str) {
        if let Self::Pong(game) = self {
            let held = keys::paddle_keys(key);
            if !held.is_empty() {
                accepted(game.submit(PongInput::Release(held)));
            }
        }
    }

    fn wordle_key(game: &mut Wordle, intent: arcade_core::wordle::WordleKey) -> Option<FollowUp> {
        accepted(game.submit(intent));
        game.snapshot().shake.then_some(FollowUp::ClearShake)
    }

    pub(crate) fn board(&mut self, msg: BoardMsg, now: DateTime<Utc>) -> Option<FollowUp> {
        match (self, msg) {
            (Self::TicTacToe(game), BoardMsg::Place(index)) => {
                accepted(game.submit(index));
            }
            (Self::ConnectFour(game), BoardMsg::Drop(column)) => {
                accepted(game.submit(ConnectFourMove::Drop(column)))?;
                return game.awaiting_computer().then_some(FollowUp::ComputerTurn);
            }
            (Self::Minesweeper(session), BoardMsg::Reveal(coords)) => {
                let outcome = accepted(session.game.submit(MinesweeperMove::Reveal(coords)))?;
                if outcome.has_update() {
                    session.on_successful_move(now);
                }
            }
            (Self::Minesweeper(session), BoardMsg::Flag(coords)) => {
                let outcome = accepted(session.game.submit(MinesweeperMove::ToggleFlag(coords)))?;
                if outcome.has_update() {
                    session.on_successful_move(now);
                }
            }
            (Self::Memory(game), BoardMsg::Flip(index)) => {
                if let MemoryOutcome::PairFlipped { delay, .. } =
                    accepted(game.submit(MemoryMove::Flip(index)))?
                {
                    return Some(FollowUp::Settle(delay));
                }
            }
            (Self::Wordle(game), BoardMsg::Key(intent)) => return Self::wordle_key(game, intent),
            (mounted, msg) => log::warn!("{:?} ignored by {}", msg, mounted.kind()),
        }
        None
    }

    pub(crate) fn follow_up(&mut self, follow_up: FollowUp) {
        match (self, follow_up) {
            (Self::ConnectFour(game), FollowUp::ComputerTurn) => {
                accepted(game.submit(ConnectFourMove::Computer));
            }
            (Self::Memory(game), FollowUp::Settle(_)) => {
                accepted(game.submit(MemoryMove::Settle));
            }
            (Self::Wordle(game), FollowUp::ClearShake) => game.clear_shake(),
            (mounted, follow_up) => log::warn!("{:?} ignored by {}", follow_up, mounted.kind()),
        }
    }

    pub(crate) fn canvas_size(&self) -> Option<(f64, f64)> {
        match self {
            Self::Snake(game) => Some(canvas::snake_size(game.config())),
            Self::Tetris(_) => Some(canvas::tetris_size()),
            Self::Pong(game) => Some(canvas::pong_size(game.config())),
            Self::FlappyBird(game) => Some(canvas::flappy_size(game.config())),
            Self::PacMan(_) => Some(canvas::pac_man_size()),
            Self::TicTacToe(_)
            | Self::ConnectFour(_)
            | Self::Minesweeper(_)
            | Self::Memory(_)
            | Self::Wordle(_) => None,
        }
    }

    pub(crate) fn paint(&self, ctx: &CanvasRenderingContext2d) -> canvas::PaintResult {
        match self {
            Self::Snake(game) => canvas::paint_snake(ctx, game.config(), game.snapshot()),
            Self::Tetris(game) => canvas::paint_tetris(ctx, game.snapshot()),
            Self::Pong(game) => canvas::paint_pong(ctx, game.config(), game.snapshot()),
            Self::FlappyBird(game) => canvas::paint_flappy(ctx, game.config(), game.snapshot()),
            Self::PacMan(game) => canvas::paint_pac_man(ctx, game.snapshot()),
            Self::TicTacToe(_)
            | Self::ConnectFour(_)
            | Self::Minesweeper(_)
            | Self::Memory(_)
            | Self::Wordle(_) => Ok(()),
        }
    }

    /// One-line summary shown above the board.
    pub(crate) fn hud(&self, now: DateTime<Utc>) -> String {
        let status = self.status();
        let ending = status_word(status);
        match self {
            Self::TicTacToe(game) => match game.snapshot().verdict {
                Verdict::Winner { mark, .. } => format!("Winner: {}", mark.symbol()),
                Verdict::Draw => "Draw".to_owned(),
                Verdict::Open => format!("Next player: {}", game.snapshot().next.symbol()),
            },
            Self::ConnectFour(game) => {
                let state = game.snapshot();
                let name = |disc: Disc| match (disc, game.config().opponent) {
                    (Disc::Red, _) => "Red",
                    (Disc::Yellow, Opponent::Human) => "Yellow",
                    (Disc::Yellow, Opponent::Computer) => "Computer",
                };
                match (status, state.winner) {
                    (GameStatus::Draw, _) => "Draw".to_owned(),
                    (_, Some(winner)) => format!("{} wins!", name(winner)),
                    _ if game.awaiting_computer() => "Computer is thinking...".to_owned(),
                    _ => format!("{} to move", name(state.current)),
                }
            }
            Self::Minesweeper(session) => {
                let state = session.game.snapshot();
                let time = session.elapsed_secs(now);
                with_ending(ending, format!("Mines: {} | Time: {}", state.mines_left(), time))
            }
            Self::Memory(game) => {
                let state = game.snapshot();
                let summary = format!(
                    "Moves: {} | Pairs: {}/{}",
                    state.moves,
                    state.matched_pairs,
                    state.difficulty.pairs()
                );
                if status == GameStatus::Won {
                    format!("{} | {}", summary, "★".repeat(state.stars().into()))
                } else {
                    summary
                }
            }
            Self::Wordle(game) => {
                let state = game.snapshot();
                state
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("Guesses left: {}", state.guesses_left()))
            }
            Self::Snake(game) => {
                let summary = format!("Score: {}", game.snapshot().score);
                with_ending(ending, summary)
            }
            Self::Tetris(game) => {
                let state = game.snapshot();
                let summary = format!(
                    "Score: {} | Level: {} | Lines: {} | Next: {:?}",
                    state.score, state.level, state.lines, state.next
                );
                with_ending(ending, summary)
            }
            Self::Pong(game) => {
                let state = game.snapshot();
                let summary = format!("You {} - {} Computer", state.player_score, state.ai_score);
                with_ending(ending, summary)
            }
            Self::FlappyBird(game) => {
                let state = game.snapshot();
                let summary = format!("Score: {} | Best: {}", state.score, state.high_score);
                with_ending(ending, summary)
            }
            Self::PacMan(game) => {
                let state = game.snapshot();
                let summary = format!(
                    "Score: {} | Lives: {}/{}",
                    state.score,
                    state.lives,
                    game.config().lives
                );
                with_ending(ending, summary)
            }
        }
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameHostProps {
    pub kind: GameKind,
    pub seed: u64,
    pub on_back: Callback<()>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Frame(f64),
    KeyDown(String),
    KeyUp(String),
    Tap,
    Board(BoardMsg),
    Resolve(FollowUp),
    UpdateTime,
    NewGame,
    Configure(Settings),
}

pub(crate) struct GameHost {
    mounted: Mounted,
    settings: Settings,
    seed: u64,
    hud: String,
    canvas: NodeRef,
    context: Option<CanvasRenderingContext2d>,
    clock: FrameClock,
    frame: Option<AnimationFrame>,
    delayed: Option<Timeout>,
    shake: Option<Timeout>,
    _timer_interval: Option<Interval>,
    _keydown: EventListener,
    _keyup: EventListener,
}

impl GameHost {
    fn key_listener(ctx: &Context<Self>, event_type: &'static str, clocked: bool) -> EventListener {
        let link = ctx.link().clone();
        EventListener::new(&gloo::utils::document(), event_type, move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = event.key();
            if clocked && keys::scrolls_page(&key) {
                event.prevent_default();
            }
            log::trace!("{} {:?}", event_type, key);
            link.send_message(match event_type {
                "keyup" => Msg::KeyUp(key),
                _ => Msg::KeyDown(key),
            });
        })
    }

    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(500, move || link.send_message(Msg::UpdateTime))
    }

    fn request_frame(&mut self, ctx: &Context<Self>) {
        let link = ctx.link().clone();
        self.frame = Some(request_animation_frame(move |timestamp| {
            link.send_message(Msg::Frame(timestamp))
        }));
    }

    fn acquire_context(&self) -> Option<CanvasRenderingContext2d> {
        let canvas = self.canvas.cast::<HtmlCanvasElement>()?;
        canvas.get_context("2d").ok().flatten()?.dyn_into().ok()
    }

    fn paint(&self) {
        if let Some(context) = &self.context {
            if let Err(err) = self.mounted.paint(context) {
                log::error!("failed to paint {}: {:?}", self.mounted.kind(), err);
            }
        }
    }

    /// Starts the frame loop if the game is clocked, drawable and not over.
    fn resume(&mut self, ctx: &Context<Self>) {
        if self.context.is_some() && self.frame.is_none() && !self.mounted.status().is_finished() {
            self.clock.pause();
            self.request_frame(ctx);
        }
    }

    fn schedule(&mut self, ctx: &Context<Self>, follow_up: FollowUp) {
        let link = ctx.link().clone();
        let delay = match follow_up {
            FollowUp::ComputerTurn => COMPUTER_DELAY,
            FollowUp::Settle(delay) => delay,
            FollowUp::ClearShake => SHAKE_DURATION,
        };
        let timeout = Timeout::new(delay, move || link.send_message(Msg::Resolve(follow_up)));
        match follow_up {
            FollowUp::ClearShake => self.shake = Some(timeout),
            FollowUp::ComputerTurn | FollowUp::Settle(_) => self.delayed = Some(timeout),
        }
    }

    fn restart(&mut self, ctx: &Context<Self>) {
        self.delayed = None;
        self.shake = None;
        self.mounted.reset();
        self.paint();
        self.resume(ctx);
    }

    fn refresh_hud(&mut self) -> bool {
        let hud = self.mounted.hud(utc_now());
        if hud != self.hud {
            self.hud = hud;
            true
        } else {
            false
        }
    }

    fn settings_view(&self, ctx: &Context<Self>) -> Html {
        let settings = self.settings;
        let option = |label: &'static str, active: bool, next: Settings| {
            let onclick = ctx.link().callback(move |_: MouseEvent| Msg::Configure(next));
            html! {
                <button class={classes!(active.then_some("active"))} {onclick}>{label}</button>
            }
        };

        match self.mounted.kind() {
            GameKind::Minesweeper => html! {
                <nav class="options">
                    {
                        for MinefieldPreset::ALL.into_iter().map(|minefield| option(
                            minefield.label(),
                            settings.minefield == minefield,
                            Settings { minefield, ..settings },
                        ))
                    }
                </nav>
            },
            GameKind::Memory => html! {
                <nav class="options">
                    {
                        for arcade_core::memory::Difficulty::ALL.into_iter().map(|memory| option(
                            memory.label(),
                            settings.memory == memory,
                            Settings { memory, ..settings },
                        ))
                    }
                </nav>
            },
            GameKind::ConnectFour => html! {
                <nav class="options">
                    { option("Two players", settings.opponent == Opponent::Human, Settings { opponent: Opponent::Human, ..settings }) }
                    { option("Versus computer", settings.opponent == Opponent::Computer, Settings { opponent: Opponent::Computer, ..settings }) }
                </nav>
            },
            _ => html! {},
        }
    }

    fn board_view(&self, ctx: &Context<Self>) -> Html {
        let callback = ctx.link().callback(Msg::Board);
        match &self.mounted {
            Mounted::TicTacToe(game) => board::tic_tac_toe(game.snapshot(), &callback),
            Mounted::ConnectFour(game) => board::connect_four(game.snapshot(), &callback),
            Mounted::Minesweeper(session) => board::minesweeper(session.game.snapshot(), &callback),
            Mounted::Memory(game) => board::memory(game.snapshot(), &callback),
            Mounted::Wordle(game) => board::wordle(game.snapshot(), &callback),
            Mounted::Snake(_)
            | Mounted::Tetris(_)
            | Mounted::Pong(_)
            | Mounted::FlappyBird(_)
            | Mounted::PacMan(_) => {
                let (width, height) = self.mounted.canvas_size().unwrap_or_default();
                let onclick = ctx.link().callback(|_: MouseEvent| Msg::Tap);
                html! {
                    <canvas ref={self.canvas.clone()} width={width.to_string()} height={height.to_string()} {onclick}/>
                }
            }
        }
    }
}

impl Component for GameHost {
    type Message = Msg;
    type Properties = GameHostProps;

    fn create(ctx: &Context<Self>) -> Self {
        let GameHostProps { kind, seed, .. } = ctx.props().clone();
        let settings = Settings::local_or_default();
        let mounted = Mounted::new(kind, &settings, seed);
        let hud = mounted.hud(utc_now());
        log::debug!("mounting {} with seed {}", kind, seed);

        Self {
            mounted,
            settings,
            seed,
            hud,
            canvas: NodeRef::default(),
            context: None,
            clock: FrameClock::default(),
            frame: None,
            delayed: None,
            shake: None,
            _timer_interval: (kind == GameKind::Minesweeper).then(|| Self::create_timer(ctx)),
            _keydown: Self::key_listener(ctx, "keydown", kind.is_clocked()),
            _keyup: Self::key_listener(ctx, "keyup", kind.is_clocked()),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Frame(timestamp) => {
                let dt = self.clock.delta(timestamp);
                self.mounted.tick(dt);
                self.paint();
                self.frame = None;
                if self.mounted.status().is_finished() {
                    log::debug!("{} finished: {:?}", self.mounted.kind(), self.mounted.status());
                } else {
                    self.request_frame(ctx);
                }
            }
            KeyDown(key) => {
                if key == "Enter" && self.mounted.kind().is_clocked() && self.mounted.status().is_finished() {
                    self.restart(ctx);
                } else if let Some(follow_up) = self.mounted.key_down(&key) {
                    self.schedule(ctx, follow_up);
                }
            }
            KeyUp(key) => self.mounted.key_up(&key),
            Tap => {
                if let Mounted::FlappyBird(game) = &mut self.mounted {
                    accepted(game.submit(Flap));
                }
            }
            Board(msg) => {
                if let Some(follow_up) = self.mounted.board(msg, utc_now()) {
                    self.schedule(ctx, follow_up);
                }
                self.refresh_hud();
                return true;
            }
            Resolve(follow_up) => {
                self.mounted.follow_up(follow_up);
                self.refresh_hud();
                return true;
            }
            UpdateTime => {}
            NewGame => {
                self.restart(ctx);
                self.refresh_hud();
                return true;
            }
            Configure(settings) => {
                if settings == self.settings {
                    return false;
                }
                settings.local_save();
                self.settings = settings;
                self.seed = js_random_seed();
                self.delayed = None;
                self.shake = None;
                self.mounted = Mounted::new(self.mounted.kind(), &settings, self.seed);
                self.refresh_hud();
                return true;
            }
        }
        self.refresh_hud()
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let kind = self.mounted.kind();
        let on_back = ctx.props().on_back.reform(|_: MouseEvent| ());
        let on_new_game = ctx.link().callback(|_: MouseEvent| Msg::NewGame);

        html! {
            <section class={classes!("game-host", kind.id())}>
                <header>
                    <button class="back" onclick={on_back}>{"Back"}</button>
                    <h2>{kind.title()}</h2>
                    <button class="new-game" onclick={on_new_game}>{"New game"}</button>
                </header>
                { self.settings_view(ctx) }
                <p class="hud">{self.hud.clone()}</p>
                { self.board_view(ctx) }
            </section>
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if !first_render || !self.mounted.kind().is_clocked() {
            return;
        }
        self.context = self.acquire_context();
        if self.context.is_none() {
            log::error!("no 2-D canvas context, {} not started", self.mounted.kind());
            return;
        }
        self.paint();
        self.resume(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_core::Direction;
    use arcade_core::memory::MISMATCH_DELAY;

    fn t(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn every_kind_mounts_itself() {
        let settings = Settings::default();
        for kind in GameKind::ALL {
            let mounted = Mounted::new(kind, &settings, 1);
            assert_eq!(mounted.kind(), kind);
            assert_eq!(mounted.canvas_size().is_some(), kind.is_clocked());
            assert_eq!(mounted.status(), GameStatus::NotStarted);
        }
    }

    #[test]
    fn arrow_keys_reach_the_snake() {
        let mut mounted = Mounted::new(GameKind::Snake, &Settings::default(), 1);
        assert_eq!(mounted.key_down("ArrowUp"), None);
        let Mounted::Snake(game) = &mounted else {
            unreachable!()
        };
        assert_eq!(game.snapshot().queued, Some(Direction::Up));
    }

    #[test]
    fn computer_turn_is_scheduled_after_a_human_drop() {
        let settings = Settings {
            opponent: Opponent::Computer,
            ..Default::default()
        };
        let mut mounted = Mounted::new(GameKind::ConnectFour, &settings, 1);

        let follow_up = mounted.board(BoardMsg::Drop(3), t(0));
        assert_eq!(follow_up, Some(FollowUp::ComputerTurn));
        assert_eq!(mounted.hud(t(0)), "Computer is thinking...");

        mounted.follow_up(FollowUp::ComputerTurn);
        assert_eq!(mounted.hud(t(0)), "Red to move");
    }

    #[test]
    fn memory_pairs_settle_after_their_delay() {
        let mut mounted = Mounted::new(GameKind::Memory, &Settings::default(), 1);
        let Mounted::Memory(game) = &mounted else {
            unreachable!()
        };
        let cards = game.snapshot().cards.clone();
        let other = (1..cards.len())
            .find(|&i| cards[i].symbol != cards[0].symbol)
            .unwrap();

        assert_eq!(mounted.board(BoardMsg::Flip(0), t(0)), None);
        assert_eq!(
            mounted.board(BoardMsg::Flip(other), t(0)),
            Some(FollowUp::Settle(MISMATCH_DELAY))
        );
    }

    #[test]
    fn wordle_refusals_ask_for_a_shake_reset() {
        let mut mounted = Mounted::new(GameKind::Wordle, &Settings::default(), 1);
        mounted.key_down("a");
        assert_eq!(mounted.key_down("Enter"), Some(FollowUp::ClearShake));

        mounted.follow_up(FollowUp::ClearShake);
        let Mounted::Wordle(game) = &mounted else {
            unreachable!()
        };
        assert!(!game.snapshot().shake);
    }

    #[test]
    fn minefield_clock_runs_from_first_reveal_to_the_end() {
        let mut mounted = Mounted::new(GameKind::Minesweeper, &Settings::default(), 3);
        assert!(mounted.hud(t(100)).ends_with("Time: 0"));

        mounted.board(BoardMsg::Flag((0, 0)), t(5));
        assert!(mounted.hud(t(100)).ends_with("Time: 0"));

        mounted.board(BoardMsg::Reveal((4, 4)), t(10));
        assert!(mounted.hud(t(25)).ends_with("Time: 15"));

        let Mounted::Minesweeper(session) = &mut mounted else {
            unreachable!()
        };
        session.ended_at = Some(t(40));
        assert_eq!(session.elapsed_secs(t(100)), 30);
    }

    #[test]
    fn mismatched_messages_are_ignored() {
        let mut mounted = Mounted::new(GameKind::TicTacToe, &Settings::default(), 1);
        assert_eq!(mounted.board(BoardMsg::Flip(0), t(0)), None);
        assert_eq!(mounted.hud(t(0)), "Next player: X");
    }
}
