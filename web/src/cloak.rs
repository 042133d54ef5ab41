use gloo::utils::document;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::utils::*;

const PLAIN_TITLE: &str = "Arcade";
const PLAIN_ICON: &str = "favicon.ico";

/// How the page presents itself in the browser tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Cloak {
    pub enabled: bool,
    pub title: String,
    pub icon: String,
}

impl Default for Cloak {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Google Classroom".to_owned(),
            icon: "https://www.google.com/favicon.ico".to_owned(),
        }
    }
}

impl StorageKey for Cloak {
    const KEY: &'static str = "arcade:cloak:v1";
}

impl Cloak {
    /// Title and icon currently shown in the tab.
    pub(crate) fn presented(&self) -> (&str, &str) {
        if self.enabled {
            (self.title.as_str(), self.icon.as_str())
        } else {
            (PLAIN_TITLE, PLAIN_ICON)
        }
    }

    fn update_document(&self) {
        let (title, icon) = self.presented();
        log::debug!("tab title: {}", title);
        let document = document();
        document.set_title(title);

        let link = match document.query_selector("link[rel*='icon']") {
            Ok(Some(link)) => link,
            _ => match document.create_element("link") {
                Ok(link) => link,
                Err(err) => {
                    log::error!("failed to create icon link: {:?}", err);
                    return;
                }
            },
        };
        let attrs = link
            .set_attribute("rel", "shortcut icon")
            .and_then(|_| link.set_attribute("href", icon));
        if let Err(err) = attrs {
            log::error!("failed to set favicon: {:?}", err);
        }
        if let Some(head) = document.head() {
            if let Err(err) = head.append_child(&link) {
                log::error!("failed to attach favicon: {:?}", err);
            }
        }
    }

    pub(crate) fn init() {
        Self::local_or_default().update_document();
    }

    pub(crate) fn apply(&self) {
        self.local_save();
        self.update_document();
    }
}

fn input_value(e: &Event) -> Option<String> {
    e.target()
        .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
}

#[function_component]
pub(crate) fn CloakView() -> Html {
    let cloak = use_state(Cloak::local_or_default);

    let update = {
        let cloak = cloak.clone();
        move |change: fn(&mut Cloak, Option<String>, bool)| {
            let cloak = cloak.clone();
            Callback::from(move |e: Event| {
                let checked = e
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
                    .is_some_and(|input| input.checked());
                let mut next = (*cloak).clone();
                change(&mut next, input_value(&e), checked);
                next.apply();
                cloak.set(next);
            })
        }
    };

    let on_toggle = update(|cloak, _, checked| cloak.enabled = checked);
    let on_title = update(|cloak, value, _| {
        if let Some(title) = value.filter(|title| !title.is_empty()) {
            cloak.title = title;
        }
    });
    let on_icon = update(|cloak, value, _| {
        if let Some(icon) = value.filter(|icon| !icon.is_empty()) {
            cloak.icon = icon;
        }
    });

    html! {
        <article class="cloak">
            <h2>{"Tab cloaking"}</h2>
            <label>
                <input type="checkbox" role="switch" checked={cloak.enabled} onchange={on_toggle}/>
                {"Disguise this tab"}
            </label>
            <label>
                {"Tab title"}
                <input type="text" placeholder="Google Classroom" value={cloak.title.clone()} onchange={on_title}/>
            </label>
            <label>
                {"Tab icon URL"}
                <input type="url" placeholder="https://www.google.com/favicon.ico" value={cloak.icon.clone()} onchange={on_icon}/>
            </label>
        </article>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_cloak_shows_plain_tab() {
        let mut cloak = Cloak::default();
        assert_eq!(cloak.presented(), (PLAIN_TITLE, PLAIN_ICON));

        cloak.enabled = true;
        assert_eq!(
            cloak.presented(),
            ("Google Classroom", "https://www.google.com/favicon.ico")
        );
    }

    #[test]
    fn storage_key_is_versioned() {
        assert_eq!(<Cloak as StorageKey>::KEY, "arcade:cloak:v1");
    }
}
