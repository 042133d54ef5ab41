use arcade_core::GameKind;
use clap::Parser;
use wasm_bindgen::prelude::*;

mod app;
mod board;
mod canvas;
mod cloak;
mod host;
mod keys;
mod settings;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Open this game instead of the catalog
    #[arg(short, long)]
    game: Option<String>,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = match Args::try_parse_from(location_hash.split(['#', '&'])) {
        Ok(args) => args,
        Err(err) => {
            web_sys::console::warn_1(&format!("ignoring page arguments: {}", err).into());
            Args::parse_from([""])
        }
    };
    if let Some(log_level) = args.verbose.log_level() {
        if let Err(err) = console_log::init_with_level(log_level) {
            web_sys::console::error_1(&format!("Error initializing logger: {}", err).into());
        }
    }
    log::debug!("seed: {:?}", args.seed);

    let game = args.game.as_deref().and_then(|id| match id.parse::<GameKind>() {
        Ok(kind) => Some(kind),
        Err(err) => {
            log::warn!("{:?}: {}", id, err);
            None
        }
    });

    cloak::Cloak::init();

    let Some(root) = document().get_element_by_id("game") else {
        log::error!("Could not find id=\"game\" element");
        return;
    };

    log::debug!("App started");
    yew::Renderer::<app::App>::with_root_and_props(
        root,
        app::AppProps {
            game,
            seed: args.seed,
        },
    )
    .render();
}
