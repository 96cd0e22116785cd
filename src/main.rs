//! Day counter front end using Yew.
//! Loads persisted state, shares it through context, and writes every change
//! back to local storage.

use day_counter::config::{
    APP_TITLE, DARK_SCHEME_QUERY, LOG_LEVEL, NO_SCROLL_CLASS, THEME_ATTRIBUTE,
};
use day_counter::state::{AppContext, AppState};
use day_counter::storage::{BrowserStorage, KeyValueStore, MemoryStore, Persistence};
use day_counter::Theme;
use log::{debug, info, warn};
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod hooks;

use components::{Header, Main};

type Store = Persistence<Box<dyn KeyValueStore>>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Local storage when the browser allows it, otherwise an in-memory store that
/// lasts for this page load.
fn open_store() -> Store {
    let store: Box<dyn KeyValueStore> = match BrowserStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            warn!("{}; changes will not survive a reload", err);
            Box::new(MemoryStore::new())
        }
    };
    Persistence::new(store)
}

fn system_theme() -> Theme {
    let prefers_dark = gloo_utils::window()
        .match_media(DARK_SCHEME_QUERY)
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false);
    Theme::from_prefers_dark(prefers_dark)
}

fn load_state(store: &Store) -> AppState {
    let dates = store.load_dates();
    let state = AppState::new(
        store.load_theme(system_theme),
        dates,
        store.load_active(),
        store.load_granularity(),
    );
    info!(
        "Loaded {} dates, theme {}, granularity {}, active counter: {}",
        state.dates.len(),
        state.theme,
        state.granularity,
        state.active.as_deref().unwrap_or("none")
    );
    state
}

fn apply_theme(theme: Theme) {
    if let Err(e) = gloo_utils::document_element().set_attribute(THEME_ATTRIBUTE, theme.as_str()) {
        warn!("Failed to apply theme: {:?}", e);
    }
}

/// Lock page scrolling while the menu is open.
fn set_scroll_lock(locked: bool) {
    let targets = [gloo_utils::document_element(), gloo_utils::body().into()];
    for element in targets {
        let classes = element.class_list();
        let result = if locked {
            classes.add_1(NO_SCROLL_CLASS)
        } else {
            classes.remove_1(NO_SCROLL_CLASS)
        };
        if let Err(e) = result {
            warn!("Failed to update scroll lock: {:?}", e);
        }
    }
    if locked {
        gloo_utils::window().scroll_to_with_x_and_y(0.0, 0.0);
    }
}

// ──────────────────────────────────────────────────────────────────────────────

/// Root component: owns the state reducer and mirrors it into storage and the DOM.
#[function_component]
pub fn App() -> Html {
    let store = use_memo((), |_| open_store());
    let state = {
        let store = Rc::clone(&store);
        use_reducer(move || load_state(&store))
    };

    {
        let store = Rc::clone(&store);
        use_effect_with(state.theme, move |theme| {
            apply_theme(*theme);
            store.save_theme(*theme);
            debug!("persisted theme {}", theme);
            || ()
        });
    }

    {
        let store = Rc::clone(&store);
        use_effect_with(state.dates.clone(), move |dates| {
            store.save_dates(dates);
            debug!("persisted {} dates", dates.len());
            || ()
        });
    }

    {
        let store = Rc::clone(&store);
        use_effect_with(state.active_counter(), move |active| {
            store.save_active(active.as_ref());
            debug!(
                "persisted active counter {}",
                active.as_ref().map(|c| c.name.as_str()).unwrap_or("none")
            );
            || ()
        });
    }

    {
        let store = Rc::clone(&store);
        use_effect_with(state.granularity, move |granularity| {
            store.save_granularity(*granularity);
            debug!("persisted granularity {}", granularity);
            || ()
        });
    }

    use_effect_with(state.menu_open, move |open| {
        set_scroll_lock(*open);
        || set_scroll_lock(false)
    });

    html! {
        <ContextProvider<AppContext> context={state}>
            <Header />
            <Main />
        </ContextProvider<AppContext>>
    }
}

/// Entry point: installs panic and log hooks, then renders the App.
fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(LOG_LEVEL));
    info!("Starting {}", APP_TITLE);
    yew::Renderer::<App>::new().render();
}
