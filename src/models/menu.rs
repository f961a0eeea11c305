//! Weekly menu model matching the frontend WeeklyMenu record.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::MealType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// What is served for one meal on one day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SingleMealMenu {
    pub items: Vec<String>,
    pub notes: String,
    pub available: bool,
}

pub type DailyMenu = BTreeMap<MealType, SingleMealMenu>;

/// Day -> meal -> offering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeeklyMenu(pub BTreeMap<DayOfWeek, DailyMenu>);

impl Default for WeeklyMenu {
    fn default() -> Self {
        let days = DayOfWeek::ALL
            .into_iter()
            .map(|day| {
                let sunday = day == DayOfWeek::Sunday;
                let mut daily = DailyMenu::new();
                daily.insert(
                    MealType::Breakfast,
                    SingleMealMenu {
                        items: vec!["Toast".to_string(), "Tea/Coffee".to_string()],
                        notes: String::new(),
                        available: true,
                    },
                );
                daily.insert(
                    MealType::Lunch,
                    SingleMealMenu {
                        items: if sunday {
                            vec!["Sunday Special Lunch".to_string()]
                        } else {
                            Vec::new()
                        },
                        notes: if sunday {
                            String::new()
                        } else {
                            "Not typically available".to_string()
                        },
                        available: sunday,
                    },
                );
                daily.insert(
                    MealType::Dinner,
                    SingleMealMenu {
                        items: vec!["Roti".to_string(), "Sabzi".to_string(), "Dal".to_string()],
                        notes: String::new(),
                        available: true,
                    },
                );
                (day, daily)
            })
            .collect();

        WeeklyMenu(days)
    }
}

impl WeeklyMenu {
    pub fn meal(&self, day: DayOfWeek, meal_type: MealType) -> Option<&SingleMealMenu> {
        self.0.get(&day).and_then(|daily| daily.get(&meal_type))
    }

    /// Apply a partial update to one meal entry. A missing entry starts from
    /// an empty, unavailable meal.
    pub fn patch(&mut self, day: DayOfWeek, meal_type: MealType, patch: &MealPatch) -> &SingleMealMenu {
        let meal = self
            .0
            .entry(day)
            .or_default()
            .entry(meal_type)
            .or_default();

        if let Some(items) = &patch.items {
            meal.items = items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(notes) = &patch.notes {
            meal.notes = notes.clone();
        }
        if let Some(available) = patch.available {
            meal.available = available;
        }

        meal
    }
}

/// Request body for patching one meal entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPatch {
    #[serde(default)]
    pub items: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_menu_lunch_only_on_sunday() {
        let menu = WeeklyMenu::default();

        for day in DayOfWeek::ALL {
            let lunch = menu.meal(day, MealType::Lunch).unwrap();
            assert_eq!(lunch.available, day == DayOfWeek::Sunday, "{:?}", day);
            assert!(menu.meal(day, MealType::Breakfast).unwrap().available);
            assert!(menu.meal(day, MealType::Dinner).unwrap().available);
        }

        let monday_lunch = menu.meal(DayOfWeek::Monday, MealType::Lunch).unwrap();
        assert_eq!(monday_lunch.notes, "Not typically available");
        assert!(monday_lunch.items.is_empty());
    }

    #[test]
    fn test_patch_changes_only_given_fields() {
        let mut menu = WeeklyMenu::default();
        let patch = MealPatch {
            items: Some(vec!["Poha".to_string(), "  ".to_string(), " Chai ".to_string()]),
            notes: None,
            available: None,
        };

        let updated = menu.patch(DayOfWeek::Tuesday, MealType::Breakfast, &patch).clone();
        assert_eq!(updated.items, vec!["Poha".to_string(), "Chai".to_string()]);
        assert!(updated.available);

        let untouched = menu.meal(DayOfWeek::Wednesday, MealType::Breakfast).unwrap();
        assert_eq!(untouched.items, vec!["Toast".to_string(), "Tea/Coffee".to_string()]);
    }

    #[test]
    fn test_wire_shape_is_nested_record() {
        let json = serde_json::to_value(WeeklyMenu::default()).unwrap();
        assert_eq!(json["Sunday"]["Lunch"]["available"], true);
        assert_eq!(json["Monday"]["Dinner"]["items"][0], "Roti");
    }
}
