//! Application state shared with every component through Yew context.
//!
//! The active counter is stored by name only and resolved against the date
//! list on read, so it can never point at a date that no longer exists.

use log::{debug, info};
use std::rc::Rc;
use yew::{Reducible, UseReducerHandle};

use crate::{ActiveCounter, DateBook, DateRejected, Granularity, NamedDate, Theme};

/// Context value handed to components.
pub type AppContext = UseReducerHandle<AppState>;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    ToggleMenu,
    CloseMenu,
    ToggleTheme,
    AddDate(NamedDate),
    DeleteDate(String),
    /// Select `name`, or deselect it if it is already the active counter.
    SelectDate(String),
    /// Only has an effect while a counter is active.
    CycleGranularity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    /// Whether the slide-out date list is showing.
    pub menu_open: bool,
    pub theme: Theme,
    /// Saved dates, unique by name, in insertion order.
    pub dates: DateBook,
    /// Name of the counter being shown. Always names an entry in `dates`.
    pub active: Option<String>,
    /// How many units the counter shows and how often it refreshes.
    pub granularity: Granularity,
}

impl AppState {
    /// Build the startup state. A stored active counter whose name is not in
    /// `dates` is dropped.
    pub fn new(
        theme: Theme,
        dates: DateBook,
        active: Option<ActiveCounter>,
        granularity: Granularity,
    ) -> Self {
        let active = active.and_then(|counter| {
            if dates.contains(&counter.name) {
                Some(counter.name)
            } else {
                info!("Stored counter '{}' has no matching date, clearing", counter.name);
                None
            }
        });
        Self {
            menu_open: false,
            theme,
            dates,
            active,
            granularity,
        }
    }

    pub fn active_counter(&self) -> Option<ActiveCounter> {
        self.active
            .as_deref()
            .and_then(|name| self.dates.get(name))
            .map(ActiveCounter::from)
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.as_deref() == Some(name)
    }

    /// Validate raw form input against the current date list.
    pub fn validate_new_date(&self, name: &str, date: &str) -> Result<NamedDate, DateRejected> {
        let entry = NamedDate::parse(name, date)?;
        if self.dates.contains(&entry.name) {
            return Err(DateRejected::DuplicateName(entry.name));
        }
        Ok(entry)
    }

    pub fn apply(&mut self, action: AppAction) {
        match action {
            AppAction::ToggleMenu => self.menu_open = !self.menu_open,
            AppAction::CloseMenu => self.menu_open = false,
            AppAction::ToggleTheme => self.theme = self.theme.toggled(),
            AppAction::AddDate(entry) => {
                if let Err(err) = self.dates.add(entry) {
                    debug!("Ignoring new date: {}", err);
                }
            }
            AppAction::DeleteDate(name) => {
                if self.dates.remove(&name).is_some() && self.is_active(&name) {
                    self.active = None;
                }
            }
            AppAction::SelectDate(name) => {
                if self.is_active(&name) {
                    self.active = None;
                } else if self.dates.contains(&name) {
                    self.active = Some(name);
                } else {
                    debug!("Ignoring selection of unknown date '{}'", name);
                    return;
                }
                self.menu_open = false;
            }
            AppAction::CycleGranularity => {
                if self.active.is_some() {
                    self.granularity = self.granularity.next();
                }
            }
        }
    }
}

impl Reducible for AppState {
    type Action = AppAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        if next == *self {
            self
        } else {
            Rc::new(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_with(names: &[&str]) -> AppState {
        let book = DateBook::from_entries(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| NamedDate::new(*n, ymd(2030, 1, i as u32 + 1))),
        );
        AppState::new(Theme::Light, book, None, Granularity::default())
    }

    #[test]
    fn test_stale_active_counter_is_dropped_on_startup() {
        let book = DateBook::from_entries(vec![NamedDate::new("a", ymd(2030, 1, 1))]);
        let ghost = ActiveCounter {
            name: "ghost".into(),
            date: ymd(2030, 1, 1),
        };
        let state = AppState::new(Theme::Dark, book, Some(ghost), Granularity::default());
        assert_eq!(state.active, None);
        assert!(!state.menu_open);
    }

    #[test]
    fn test_active_counter_resolves_through_date_list() {
        let mut state = state_with(&["a", "b"]);
        state.apply(AppAction::SelectDate("b".into()));
        assert_eq!(
            state.active_counter(),
            Some(ActiveCounter {
                name: "b".into(),
                date: ymd(2030, 1, 2)
            })
        );
    }

    #[test]
    fn test_selecting_active_date_deselects_and_closes_menu() {
        let mut state = state_with(&["a"]);
        state.apply(AppAction::ToggleMenu);
        state.apply(AppAction::SelectDate("a".into()));
        assert!(state.is_active("a"));
        assert!(!state.menu_open);

        state.apply(AppAction::ToggleMenu);
        state.apply(AppAction::SelectDate("a".into()));
        assert_eq!(state.active, None);
        assert!(!state.menu_open);
    }

    #[test]
    fn test_deleting_active_date_clears_counter() {
        let mut state = state_with(&["a", "b"]);
        state.apply(AppAction::SelectDate("a".into()));
        state.apply(AppAction::DeleteDate("a".into()));
        assert_eq!(state.active, None);
        assert_eq!(state.active_counter(), None);
        assert_eq!(state.dates.len(), 1);
    }

    #[test]
    fn test_deleting_other_date_keeps_counter() {
        let mut state = state_with(&["a", "b"]);
        state.apply(AppAction::SelectDate("a".into()));
        state.apply(AppAction::DeleteDate("b".into()));
        assert!(state.is_active("a"));
    }

    #[test]
    fn test_duplicate_add_is_a_no_op() {
        let mut state = state_with(&[]);
        state.apply(AppAction::AddDate(NamedDate::new("Birthday", ymd(2030, 5, 1))));
        state.apply(AppAction::AddDate(NamedDate::new("Birthday", ymd(2040, 1, 1))));
        assert_eq!(state.dates.len(), 1);
        assert_eq!(state.dates.get("Birthday").unwrap().date, ymd(2030, 5, 1));
        assert_eq!(
            state.validate_new_date("Birthday", "2041-01-01"),
            Err(DateRejected::DuplicateName("Birthday".into()))
        );
    }

    #[test]
    fn test_granularity_cycles_only_while_active() {
        let mut state = state_with(&["a"]);
        state.apply(AppAction::CycleGranularity);
        assert_eq!(state.granularity.level(), 3);

        state.apply(AppAction::SelectDate("a".into()));
        state.apply(AppAction::CycleGranularity);
        assert_eq!(state.granularity.level(), 4);
        state.apply(AppAction::CycleGranularity);
        assert_eq!(state.granularity.level(), 0);
    }

    #[test]
    fn test_menu_and_theme_toggles() {
        let mut state = state_with(&[]);
        state.apply(AppAction::ToggleMenu);
        assert!(state.menu_open);
        state.apply(AppAction::CloseMenu);
        assert!(!state.menu_open);
        state.apply(AppAction::ToggleTheme);
        assert_eq!(state.theme, Theme::Dark);
    }

    #[test]
    fn test_reduce_returns_same_rc_when_nothing_changes() {
        let state = Rc::new(state_with(&[]));
        let next = Rc::clone(&state).reduce(AppAction::CycleGranularity);
        assert!(Rc::ptr_eq(&state, &next));

        let toggled = Rc::clone(&state).reduce(AppAction::ToggleTheme);
        assert!(!Rc::ptr_eq(&state, &toggled));
    }
}
