use crate::dates::to_date_key;
use crate::models::{HabitData, HabitRecord, HabitSummary};
use chrono::{NaiveDate, SecondsFormat, Utc};

/// Habit CRUD plus per-day completion toggling.
pub trait HabitRepository {
    fn list(&self) -> Vec<HabitSummary>;
    fn get(&self, id: &str) -> Option<&HabitRecord>;
    fn create(&mut self, name: &str) -> HabitRecord;
    fn rename(&mut self, id: &str, name: &str) -> Option<HabitRecord>;
    fn delete(&mut self, id: &str) -> bool;
    /// Flips completion for `date`; returns the new state, or `None` for an unknown habit.
    fn toggle(&mut self, id: &str, date: NaiveDate) -> Option<bool>;
}

impl HabitData {
    fn next_id(&self) -> String {
        let max = self
            .habits
            .iter()
            .filter_map(|habit| habit.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut HabitRecord> {
        self.habits.iter_mut().find(|habit| habit.id == id)
    }
}

impl HabitRepository for HabitData {
    fn list(&self) -> Vec<HabitSummary> {
        self.habits
            .iter()
            .map(|habit| HabitSummary {
                id: habit.id.clone(),
                name: habit.name.clone(),
            })
            .collect()
    }

    fn get(&self, id: &str) -> Option<&HabitRecord> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    fn create(&mut self, name: &str) -> HabitRecord {
        let record = HabitRecord {
            id: self.next_id(),
            name: name.trim().to_string(),
            completed_dates: Default::default(),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        self.habits.push(record.clone());
        record
    }

    fn rename(&mut self, id: &str, name: &str) -> Option<HabitRecord> {
        let habit = self.find_mut(id)?;
        habit.name = name.trim().to_string();
        Some(habit.clone())
    }

    fn delete(&mut self, id: &str) -> bool {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        self.habits.len() != before
    }

    fn toggle(&mut self, id: &str, date: NaiveDate) -> Option<bool> {
        let habit = self.find_mut(id)?;
        let key = to_date_key(date);
        if habit.completed_dates.remove(&key) {
            Some(false)
        } else {
            habit.completed_dates.insert(key);
            Some(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ids_follow_the_highest_numeric_id() {
        let mut data = HabitData::default();
        assert_eq!(data.create("Reading").id, "1");
        assert_eq!(data.create("  Gym ").name, "Gym");

        data.habits.push(HabitRecord {
            id: "41".into(),
            name: "Imported".into(),
            completed_dates: Default::default(),
            created_at: None,
        });
        assert_eq!(data.create("Water").id, "42");
        assert!(data.delete("42"));
        assert_eq!(data.create("Water").id, "42");
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut data = HabitData::default();
        let id = data.create("Reading").id;
        let day = ymd(2025, 10, 22);

        assert_eq!(data.toggle(&id, day), Some(true));
        assert!(data.get(&id).unwrap().completed_dates.contains("2025-10-22"));
        assert_eq!(data.toggle(&id, day), Some(false));
        assert!(data.get(&id).unwrap().completed_dates.is_empty());
        assert_eq!(data.toggle("missing", day), None);
    }

    #[test]
    fn rename_and_delete_unknown_ids() {
        let mut data = HabitData::default();
        let id = data.create("Reading").id;

        assert_eq!(data.rename(&id, "Reading (30 min)").unwrap().name, "Reading (30 min)");
        assert!(data.rename("nope", "x").is_none());
        assert!(!data.delete("nope"));
        assert_eq!(data.list().len(), 1);
    }
}
