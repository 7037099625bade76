//! Field naming and value normalisation for submitted schedule forms.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

pub const DATE_FMT: &str = "%Y-%m-%d";
pub const SLOT_TIME_FMT: &str = "%H-%M-%S";
pub const REVISION_FIELD: &str = "revision";

/// Absent and empty values both mean "no value"; anything else is kept verbatim.
pub fn normalize(raw: Option<&str>) -> Option<String> {
    match raw {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => None,
    }
}

pub fn night_field(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}", prefix, date.format(DATE_FMT))
}

pub fn slot_field(date: NaiveDate, time: NaiveTime) -> String {
    format!("queue_{}_{}", date.format(DATE_FMT), time.format(SLOT_TIME_FMT))
}

/// Submitted field values keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct ScheduleForm {
    fields: HashMap<String, String>,
}

impl ScheduleForm {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn value(&self, name: &str) -> Option<String> {
        normalize(self.fields.get(name).map(String::as_str))
    }

    /// Checkbox semantics: ticked boxes submit a value, unticked ones are absent.
    pub fn flag(&self, name: &str) -> bool {
        match self.value(name) {
            Some(value) => !matches!(value.as_str(), "0" | "false" | "off"),
            None => false,
        }
    }

    pub fn revision(&self) -> Option<String> {
        self.value(REVISION_FIELD)
    }

    #[cfg(test)]
    pub fn insert<K: ToString, V: ToString>(&mut self, name: K, value: V) {
        self.fields.insert(name.to_string(), value.to_string());
    }
}

impl From<HashMap<String, String>> for ScheduleForm {
    fn from(fields: HashMap<String, String>) -> Self {
        Self::new(fields)
    }
}
