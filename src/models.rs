use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Priority of a task, mapped to the note colors used in the UI shells.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Not urgent.
    #[default]
    Green,
    /// Medium. Older files stored this as "yellow".
    #[serde(alias = "yellow")]
    Blue,
    /// Important.
    Red,
}

impl Priority {
    /// Parses a user-supplied priority name (`green`/`low`, `blue`/`medium`,
    /// `red`/`high`).
    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_lowercase().as_str() {
            "green" | "low" => Some(Priority::Green),
            "blue" | "yellow" | "medium" => Some(Priority::Blue),
            "red" | "high" => Some(Priority::Red),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Green => "green",
            Priority::Blue => "blue",
            Priority::Red => "red",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse(s).ok_or_else(|| format!("unknown priority '{s}' (green/blue/red)"))
    }
}

/// How a task repeats once completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn parse(s: &str) -> Option<Recurrence> {
        match s.to_lowercase().as_str() {
            "none" => Some(Recurrence::None),
            "daily" => Some(Recurrence::Daily),
            "weekly" => Some(Recurrence::Weekly),
            "monthly" => Some(Recurrence::Monthly),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    /// Next due date after completing a task due on `date`.
    ///
    /// Monthly recurrence adds one calendar month, clamping the day to the
    /// length of the target month (31.01. -> 28./29.02.).
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Recurrence::None => None,
            Recurrence::Daily => date.checked_add_days(Days::new(1)),
            Recurrence::Weekly => date.checked_add_days(Days::new(7)),
            Recurrence::Monthly => date.checked_add_months(Months::new(1)),
        }
    }
}

impl std::str::FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Recurrence::parse(s)
            .ok_or_else(|| format!("unknown recurrence '{s}' (none/daily/weekly/monthly)"))
    }
}

/// A single sticky-note task.
///
/// Serialized field names match the on-disk JSON format; dates are stored as
/// `DD.MM.YYYY` and also accepted as ISO `YYYY-MM-DD` on load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique identifier, stable across sessions. Legacy files carry no ids;
    /// the store assigns them on load.
    #[serde(default)]
    pub id: u64,
    /// The task name. Never empty for tasks created through the store.
    pub name: String,
    /// Free-form info text, may be empty.
    #[serde(default)]
    pub info: String,
    /// Optional due date (calendar date, no time component).
    #[serde(rename = "date", default, with = "date_repr")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "recurrence_repr")]
    pub recurrence: Recurrence,
    /// Date the task was created on. Missing in some legacy entries.
    #[serde(rename = "created_date", default, with = "date_repr")]
    pub created: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    /// Completion timestamp, present exactly when `completed` is true.
    #[serde(rename = "finished_date", default, with = "datetime_repr")]
    pub finished: Option<NaiveDateTime>,
}

/// Parses a date in `DD.MM.YYYY` or ISO `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(s, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| StoreError::InvalidDate(s.to_string()))
}

/// Formats a date in the on-disk `DD.MM.YYYY` form.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%d.%m.%Y").to_string()
}

mod date_repr {
    use chrono::NaiveDate;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<NaiveDate>, ser: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => ser.serialize_str(&super::format_date(*d)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(de)? {
            Some(s) if !s.is_empty() => super::parse_date(&s)
                .map(Some)
                .map_err(|e| D::Error::custom(e.to_string())),
            _ => Ok(None),
        }
    }
}

mod datetime_repr {
    use chrono::{NaiveDateTime, NaiveTime};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d.%m.%Y %H:%M:%S";

    pub fn serialize<S: Serializer>(t: &Option<NaiveDateTime>, ser: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => ser.serialize_str(&t.format(FORMAT).to_string()),
            None => ser.serialize_none(),
        }
    }

    // Legacy files recorded only the completion date; accept a bare date and
    // treat it as midnight.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(de)? {
            Some(s) if !s.is_empty() => NaiveDateTime::parse_from_str(&s, FORMAT)
                .or_else(|_| {
                    super::parse_date(&s)
                        .map(|d| d.and_time(NaiveTime::MIN))
                        .map_err(|_| ())
                })
                .map(Some)
                .map_err(|()| D::Error::custom(format!("invalid timestamp '{s}'"))),
            _ => Ok(None),
        }
    }
}

mod recurrence_repr {
    use super::Recurrence;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(r: &Recurrence, ser: S) -> Result<S::Ok, S::Error> {
        match r {
            Recurrence::None => ser.serialize_none(),
            other => ser.serialize_str(other.label()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Recurrence, D::Error> {
        match Option::<String>::deserialize(de)? {
            Some(s) => Recurrence::parse(&s)
                .ok_or_else(|| D::Error::custom(format!("unknown recurrence '{s}'"))),
            None => Ok(Recurrence::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_date_formats() {
        assert_eq!(parse_date("20.10.2024").unwrap(), date(2024, 10, 20));
        assert_eq!(parse_date("2024-10-20").unwrap(), date(2024, 10, 20));
        assert!(parse_date("10/20/2024").is_err());
        assert!(parse_date("31.02.2024").is_err());
    }

    #[test]
    fn recurrence_advances() {
        let d = date(2024, 1, 1);
        assert_eq!(Recurrence::None.advance(d), None);
        assert_eq!(Recurrence::Daily.advance(d), Some(date(2024, 1, 2)));
        assert_eq!(Recurrence::Weekly.advance(d), Some(date(2024, 1, 8)));
        assert_eq!(Recurrence::Monthly.advance(d), Some(date(2024, 2, 1)));
    }

    #[test]
    fn monthly_advance_clamps_day() {
        assert_eq!(
            Recurrence::Monthly.advance(date(2024, 1, 31)),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            Recurrence::Monthly.advance(date(2023, 1, 31)),
            Some(date(2023, 2, 28))
        );
    }

    #[test]
    fn legacy_yellow_priority_loads_as_blue() {
        let t: Task = serde_json::from_str(
            r#"{"name": "Old", "date": "01.02.2023", "priority": "yellow"}"#,
        )
        .unwrap();
        assert_eq!(t.priority, Priority::Blue);
        assert_eq!(t.due_date, Some(date(2023, 2, 1)));
        assert!(!t.completed);
    }
}
