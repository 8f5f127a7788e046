use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Canonical storage format for due dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const ACCEPTED_DATE_FORMATS: [&str; 3] = [DATE_FORMAT, "%Y/%m/%d", "%m/%d/%Y"];

/// A checked request field and the rejection raised when a value is not a member.
pub trait Field: FromStr<Err = ValidationError> {
    const INVALID: ValidationError;
}

impl Field for Status {
    const INVALID: ValidationError = ValidationError::InvalidStatus;
}

impl Field for Priority {
    const INVALID: ValidationError = ValidationError::InvalidPriority;
}

impl Field for Category {
    const INVALID: ValidationError = ValidationError::InvalidCategory;
}

impl Field for DueDate {
    const INVALID: ValidationError = ValidationError::InvalidDueDate;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Status {
    #[serde(rename = "TO DO")]
    #[sqlx(rename = "TO DO")]
    ToDo,
    #[serde(rename = "IN PROGRESS")]
    #[sqlx(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    #[sqlx(rename = "DONE")]
    Done,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "TO DO",
            Status::InProgress => "IN PROGRESS",
            Status::Done => "DONE",
        }
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TO DO" => Ok(Status::ToDo),
            "IN PROGRESS" => Ok(Status::InProgress),
            "DONE" => Ok(Status::Done),
            _ => Err(Self::INVALID),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            _ => Err(Self::INVALID),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Category {
    Work,
    Home,
    Learning,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "WORK",
            Category::Home => "HOME",
            Category::Learning => "LEARNING",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WORK" => Ok(Category::Work),
            "HOME" => Ok(Category::Home),
            "LEARNING" => Ok(Category::Learning),
            _ => Err(Self::INVALID),
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(Status, Priority, Category);

/// A validated due date, displayed and stored in canonical `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DueDate(NaiveDate);

impl DueDate {
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl FromStr for DueDate {
    type Err = ValidationError;

    /// Accepts ISO dates with or without zero padding, slash separated dates
    /// and full timestamps. Impossible calendar dates are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        for format in ACCEPTED_DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, format) {
                return Ok(DueDate(date));
            }
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(DueDate(ts.date_naive()));
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Ok(DueDate(ts.date()));
        }

        Err(Self::INVALID)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Parses an optional raw field. Absence and `null` pass; anything other than
/// a member string, including numbers and repeated query keys, is rejected.
pub fn parse_field<T: Field>(value: Option<&Value>) -> Result<Option<T>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some),
        Some(_) => Err(T::INVALID),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn enums_accept_only_exact_members() {
        assert_eq!("TO DO".parse::<Status>(), Ok(Status::ToDo));
        assert_eq!("IN PROGRESS".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("done".parse::<Status>(), Err(ValidationError::InvalidStatus));
        assert_eq!("".parse::<Status>(), Err(ValidationError::InvalidStatus));

        assert_eq!("MEDIUM".parse::<Priority>(), Ok(Priority::Medium));
        assert_eq!("URGENT".parse::<Priority>(), Err(ValidationError::InvalidPriority));

        assert_eq!("LEARNING".parse::<Category>(), Ok(Category::Learning));
        assert_eq!("SCHOOL".parse::<Category>(), Err(ValidationError::InvalidCategory));
    }

    #[test]
    fn serialized_names_match_stored_names() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"IN PROGRESS\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"LOW\"");
        assert_eq!(serde_json::to_string(&Category::Home).unwrap(), "\"HOME\"");
        assert_eq!(Status::ToDo.to_string(), "TO DO");
    }

    #[test]
    fn due_date_is_normalized() {
        let date: DueDate = "2023-1-5".parse().unwrap();
        assert_eq!(date.canonical(), "2023-01-05");

        let date: DueDate = "2021/12/31".parse().unwrap();
        assert_eq!(date.canonical(), "2021-12-31");

        let date: DueDate = "04/02/2021".parse().unwrap();
        assert_eq!(date.canonical(), "2021-04-02");

        let date: DueDate = "2022-03-04T10:00:00Z".parse().unwrap();
        assert_eq!(date.canonical(), "2022-03-04");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once: DueDate = "2023-1-5".parse().unwrap();
        let twice: DueDate = once.canonical().parse().unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.to_string(), "2023-01-05");
    }

    #[test]
    fn bad_dates_are_rejected() {
        for raw in ["", "tomorrow", "2023-13-01", "2021-02-29", "2023-01-01x"] {
            assert_eq!(
                raw.parse::<DueDate>(),
                Err(ValidationError::InvalidDueDate),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn free_form_dates_are_not_accepted() {
        for raw in ["Dec 12 2021", "12 December 2021", "2021.12.12", "20211212", "12-31-2021"] {
            assert_eq!(
                raw.parse::<DueDate>(),
                Err(ValidationError::InvalidDueDate),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn optional_fields_tolerate_absence() {
        assert_eq!(parse_field::<Status>(None), Ok(None));
        assert_eq!(parse_field::<Status>(Some(&Value::Null)), Ok(None));
        assert_eq!(parse_field::<Status>(Some(&json!("DONE"))), Ok(Some(Status::Done)));
        assert_eq!(
            parse_field::<Priority>(Some(&json!("NOPE"))),
            Err(ValidationError::InvalidPriority)
        );
    }

    #[test]
    fn non_string_values_are_rejected_per_field() {
        assert_eq!(parse_field::<Status>(Some(&json!(5))), Err(ValidationError::InvalidStatus));
        assert_eq!(
            parse_field::<Category>(Some(&json!(["WORK", "HOME"]))),
            Err(ValidationError::InvalidCategory)
        );
        assert_eq!(
            parse_field::<DueDate>(Some(&json!({ "day": 1 }))),
            Err(ValidationError::InvalidDueDate)
        );
        assert_eq!(parse_field::<Priority>(Some(&json!(true))), Err(ValidationError::InvalidPriority));
    }
}
