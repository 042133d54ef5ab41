use arcade_core::{Category, GameKind};
use yew::prelude::*;

use crate::cloak::CloakView;
use crate::host::GameHost;
use crate::utils::*;

#[derive(Properties, Debug, Clone, PartialEq)]
pub(crate) struct AppProps {
    /// Game to open right away instead of the catalog
    #[prop_or_default]
    pub game: Option<GameKind>,

    /// Force a seed instead of random
    #[prop_or_default]
    pub seed: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Open(GameKind),
    Back,
}

/// Catalog of games, or the one being played.
#[derive(Debug)]
pub(crate) struct App {
    playing: Option<(GameKind, u64)>,
}

impl App {
    fn seed(ctx: &Context<Self>) -> u64 {
        ctx.props().seed.unwrap_or_else(js_random_seed)
    }

    fn card(ctx: &Context<Self>, kind: GameKind) -> Html {
        let onclick = ctx.link().callback(move |_: MouseEvent| Msg::Open(kind));
        html! {
            <li class={classes!("card", kind.id())} {onclick}>
                <h3>{kind.title()}</h3>
                <p>{kind.description()}</p>
            </li>
        }
    }

    fn catalog_view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <main class="catalog">
                <h1>{"Arcade"}</h1>
                {
                    for Category::ALL.into_iter().map(|category| html! {
                        <section>
                            <h2>{category.label()}</h2>
                            <ul class="cards">
                                {
                                    for GameKind::ALL
                                        .into_iter()
                                        .filter(|kind| kind.category() == category)
                                        .map(|kind| Self::card(ctx, kind))
                                }
                            </ul>
                        </section>
                    })
                }
                <CloakView/>
            </main>
        }
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            playing: ctx.props().game.map(|kind| (kind, Self::seed(ctx))),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Open(kind) => {
                let seed = Self::seed(ctx);
                log::info!("opening {} (seed {})", kind, seed);
                self.playing = Some((kind, seed));
            }
            Msg::Back => self.playing = None,
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match self.playing {
            Some((kind, seed)) => {
                let on_back = ctx.link().callback(|()| Msg::Back);
                html! {
                    <GameHost key={format!("{}-{}", kind, seed)} {kind} {seed} {on_back}/>
                }
            }
            None => self.catalog_view(ctx),
        }
    }
}
