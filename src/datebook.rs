//! Ordered collection of named dates with unique names.

use log::debug;
use serde::Serialize;

use crate::{DateRejected, NamedDate};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateBook {
    entries: Vec<NamedDate>,
}

impl DateBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, keeping the first of any duplicated names.
    pub fn from_entries(entries: impl IntoIterator<Item = NamedDate>) -> Self {
        let mut book = Self::new();
        for entry in entries {
            if let Err(err) = book.add(entry) {
                debug!("Dropping stored date: {}", err);
            }
        }
        book
    }

    /// Append `entry` unless its name is empty or already taken.
    pub fn add(&mut self, entry: NamedDate) -> Result<(), DateRejected> {
        if entry.name.trim().is_empty() {
            return Err(DateRejected::EmptyName);
        }
        if self.contains(&entry.name) {
            return Err(DateRejected::DuplicateName(entry.name));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the entry called `name`, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<NamedDate> {
        let pos = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(pos))
    }

    pub fn get(&self, name: &str) -> Option<&NamedDate> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedDate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DateBook {
    type Item = &'a NamedDate;
    type IntoIter = std::slice::Iter<'a, NamedDate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duplicate_name_keeps_first_entry() {
        let mut book = DateBook::new();
        book.add(NamedDate::new("Birthday", ymd(2030, 5, 1))).unwrap();

        let second = book.add(NamedDate::new("Birthday", ymd(2031, 1, 1)));
        assert_eq!(
            second,
            Err(DateRejected::DuplicateName("Birthday".to_string()))
        );
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("Birthday").unwrap().date, ymd(2030, 5, 1));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut book = DateBook::new();
        assert_eq!(
            book.add(NamedDate::new(" ", ymd(2030, 5, 1))),
            Err(DateRejected::EmptyName)
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_remove_preserves_order_of_the_rest() {
        let mut book = DateBook::from_entries(vec![
            NamedDate::new("a", ymd(2030, 1, 1)),
            NamedDate::new("b", ymd(2030, 1, 2)),
            NamedDate::new("c", ymd(2030, 1, 3)),
        ]);

        assert_eq!(book.remove("b").map(|e| e.name), Some("b".to_string()));
        assert_eq!(book.remove("missing"), None);
        let names: Vec<&str> = book.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_from_entries_dedups_by_name() {
        let book = DateBook::from_entries(vec![
            NamedDate::new("x", ymd(2030, 1, 1)),
            NamedDate::new("x", ymd(2040, 1, 1)),
        ]);
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("x").unwrap().date, ymd(2030, 1, 1));
    }
}
