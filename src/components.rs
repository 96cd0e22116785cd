//! Yew view components for the day counter UI.
//!
//! Every component reads and updates the shared [`AppState`] through the
//! [`AppContext`] provided by `App`.

use day_counter::config::APP_TITLE;
use day_counter::state::{AppAction, AppContext, AppState};
use day_counter::{
    format_display_date, format_iso_date, max_date, min_date, CounterReading, NamedDate, Theme,
};
use chrono::Datelike;
use log::debug;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::hooks::use_countdown;

fn dispatch(app: &AppContext, action: AppAction) -> Callback<MouseEvent> {
    let app = app.clone();
    Callback::from(move |_| app.dispatch(action.clone()))
}

#[function_component(MenuButton)]
pub fn menu_button() -> Html {
    let Some(app) = use_context::<AppContext>() else {
        return html! {};
    };
    let open = app.menu_open;

    html! {
        <button
            aria-label="Menu button"
            aria-expanded={open.to_string()}
            class={classes!("header__btn", "left", open.then_some("open"))}
            onclick={dispatch(&app, AppAction::ToggleMenu)}
        >
            { if open { "✕" } else { "☰" } }
        </button>
    }
}

#[function_component(ThemeToggle)]
pub fn theme_toggle() -> Html {
    let Some(app) = use_context::<AppContext>() else {
        return html! {};
    };

    html! {
        <button
            aria-label="Theme switcher button"
            aria-pressed={(app.theme == Theme::Dark).to_string()}
            class="header__btn right"
            onclick={dispatch(&app, AppAction::ToggleTheme)}
        >
            { "◐" }
        </button>
    }
}

#[function_component(Header)]
pub fn header() -> Html {
    html! {
        <header class="header">
            <MenuButton />
            <h1 class="header-title">{ APP_TITLE }</h1>
            <ThemeToggle />
        </header>
    }
}

/// Backdrop behind the open menu; clicking it closes the menu.
#[function_component(Overlay)]
pub fn overlay() -> Html {
    let Some(app) = use_context::<AppContext>() else {
        return html! {};
    };

    html! {
        <div
            role="button"
            class={classes!("overlay", app.menu_open.then_some("open"))}
            onclick={dispatch(&app, AppAction::CloseMenu)}
        ></div>
    }
}

/// Full-screen button that cycles the display granularity.
#[function_component(CounterButton)]
pub fn counter_button() -> Html {
    let Some(app) = use_context::<AppContext>() else {
        return html! {};
    };

    html! {
        <button
            aria-label="Counter mode switcher button"
            class="counter__btn"
            onclick={dispatch(&app, AppAction::CycleGranularity)}
        ></button>
    }
}

#[function_component(Instructions)]
pub fn instructions() -> Html {
    html! {
        <section class="instructions" aria-labelledby="instructions-title">
            <h2 id="instructions-title">{ format!("Welcome to {}!", APP_TITLE) }</h2>
            <p>
                { "Click on the menu button in the top left part of the screen to add, \
                   delete or change the current counter." }
            </p>
            <p>
                { "Once you select a counter, click on the screen to change between modes \
                   (days, hours, minutes, etc...)." }
            </p>
        </section>
    }
}

/// Renders one reading: the visible units followed by "Until/Since <name>".
pub fn render_reading(reading: &CounterReading, name: &str) -> Html {
    html! {
        <div class="counter" aria-live="polite">
            { reading.units.iter().map(|(unit, value)| html! {
                <>
                    <span>{ *value }</span>
                    <span>{ unit.label() }</span>
                </>
            }).collect::<Html>() }
            <span class="counter-msg">{ reading.direction.label() }</span>
            <span class="counter-msg">{ format!(" {}", name) }</span>
        </div>
    }
}

#[function_component(Counter)]
pub fn counter() -> Html {
    let app = use_context::<AppContext>();
    let active = app.as_ref().and_then(|app| app.active_counter());
    let granularity = app.as_ref().map(|app| app.granularity).unwrap_or_default();
    let delta = use_countdown(active.as_ref().map(|c| c.target_ms()), granularity);

    match (active, delta) {
        (Some(counter), Some(delta)) => {
            render_reading(&CounterReading::new(delta, granularity), &counter.name)
        }
        _ => html! { <Instructions /> },
    }
}

#[derive(Properties, PartialEq)]
pub struct DateEntryProps {
    pub entry: NamedDate,
    pub active: bool,
}

#[function_component(DateEntry)]
pub fn date_entry(props: &DateEntryProps) -> Html {
    let Some(app) = use_context::<AppContext>() else {
        return html! {};
    };
    let name = props.entry.name.clone();
    let date = props.entry.date;

    let on_delete = {
        let app = app.clone();
        let name = name.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            app.dispatch(AppAction::DeleteDate(name.clone()));
        })
    };

    html! {
        <>
            <div
                role="button"
                class={classes!("date__container", props.active.then_some("active"))}
                onclick={dispatch(&app, AppAction::SelectDate(name.clone()))}
            >
                <span>{ name.clone() }</span>
                <div class="date" aria-label={format_display_date(date)}>
                    <span>{ format!("{:02}", date.day()) }</span>
                    <span>{ "/" }</span>
                    <span>{ format!("{:02}", date.month()) }</span>
                    <span>{ "/" }</span>
                    <span>{ date.year() }</span>
                </div>
                <button
                    aria-label="Delete date button"
                    class="date-trash__btn"
                    onclick={on_delete}
                >
                    { "🗑" }
                </button>
            </div>
            <div class="spacer"></div>
        </>
    }
}

#[function_component(NewDateForm)]
pub fn new_date_form() -> Html {
    let app = use_context::<AppContext>();
    let name = use_state(String::new);
    let date = use_state(String::new);

    let on_name_input = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    let on_date_change = {
        let date = date.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            date.set(input.value());
        })
    };

    let on_submit = {
        let app = app.clone();
        let name = name.clone();
        let date = date.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(app) = app.as_ref() else {
                return;
            };
            match app.validate_new_date(&name, &date) {
                Ok(entry) => {
                    app.dispatch(AppAction::AddDate(entry));
                    name.set(String::new());
                    date.set(String::new());
                }
                Err(err) => debug!("Ignoring new date: {}", err),
            }
        })
    };

    html! {
        <form class="form" onsubmit={on_submit}>
            <input
                type="text"
                placeholder="name"
                name="name"
                value={(*name).clone()}
                oninput={on_name_input}
                aria-required="true"
            />
            <input
                type="date"
                name="date"
                class="date"
                min={format_iso_date(min_date())}
                max={format_iso_date(max_date())}
                value={(*date).clone()}
                onchange={on_date_change}
                aria-required="true"
            />
            <button aria-label="Add date button" class="add-date__btn">
                { "Add Date" }
            </button>
        </form>
    }
}

/// Slide-out menu listing saved dates plus the form for new ones.
#[function_component(Menu)]
pub fn menu() -> Html {
    let Some(app) = use_context::<AppContext>() else {
        return html! {};
    };
    let state: &AppState = &app;

    html! {
        <div
            class={classes!("menu", state.menu_open.then_some("open"))}
            onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}
            role="menu"
        >
            <div class="dates__container">
                { state.dates.iter().map(|entry| html! {
                    <DateEntry
                        key={entry.name.clone()}
                        entry={entry.clone()}
                        active={state.is_active(&entry.name)}
                    />
                }).collect::<Html>() }
                <NewDateForm />
            </div>
        </div>
    }
}

#[function_component(Main)]
pub fn main_view() -> Html {
    html! {
        <main class="main">
            <Menu />
            <Overlay />
            <CounterButton />
            <Counter />
        </main>
    }
}
