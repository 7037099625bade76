use std::collections::BTreeMap;

use chrono::{Duration, NaiveTime, Timelike};

use crate::error::{ScheduleError, ScheduleResult};

const SECS_PER_DAY: i64 = 24 * 3600;
const DEFAULT_BIND: &str = "127.0.0.1:8080";

pub struct ServerConfig {
    pub database_url: Option<String>,
    pub bind: String,
}

impl ServerConfig {
    /// Reads `DATABASE_URL` and `BIND_ADDR` after `.env` has been loaded.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.is_empty());
        let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        Self { database_url, bind }
    }
}

/// Month and day on which each half of a semester begins.
#[derive(Clone, Copy, Debug)]
pub struct SemesterRule {
    pub a_start: (u32, u32),
    pub b_start: (u32, u32),
}

/// Selectable time-of-day subdivisions of a telescope night.
///
/// The telescope day is a 24 hour cycle starting at `day_start`, so a grid
/// running from 16:00 to 07:00 crosses midnight and still counts as ascending.
#[derive(Clone, Copy, Debug)]
pub struct SlotGrid {
    pub day_start: NaiveTime,
    pub first: NaiveTime,
    pub last: NaiveTime,
    pub interval_minutes: u32,
}

impl SlotGrid {
    /// Seconds since the start of the telescope day.
    pub fn order_key(&self, time: NaiveTime) -> i64 {
        let secs = time.num_seconds_from_midnight() as i64
            - self.day_start.num_seconds_from_midnight() as i64;
        secs.rem_euclid(SECS_PER_DAY)
    }

    pub fn slots_full(&self) -> Vec<NaiveTime> {
        let step = i64::from(self.interval_minutes.max(1)) * 60;
        let end = self.order_key(self.last);

        let mut slots = Vec::new();
        let mut key = self.order_key(self.first);
        while key <= end {
            slots.push(self.day_start + Duration::seconds(key));
            key += step;
        }
        slots
    }
}

#[derive(Clone, Debug)]
pub struct TelescopeConfig {
    pub name: String,
    pub semester: SemesterRule,
    /// Oldest year offered in semester navigation.
    pub floor_year: i32,
    pub grid: SlotGrid,
}

pub struct Telescopes {
    telescopes: BTreeMap<String, TelescopeConfig>,
}

impl Telescopes {
    pub fn new<I: IntoIterator<Item = TelescopeConfig>>(telescopes: I) -> Self {
        Self {
            telescopes: telescopes
                .into_iter()
                .map(|tel| (tel.name.to_uppercase(), tel))
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            TelescopeConfig {
                name: "JCMT".to_string(),
                semester: SemesterRule {
                    a_start: (2, 2),
                    b_start: (8, 2),
                },
                floor_year: 2015,
                grid: SlotGrid {
                    day_start: NaiveTime::from_hms(14, 0, 0),
                    first: NaiveTime::from_hms(16, 0, 0),
                    last: NaiveTime::from_hms(7, 0, 0),
                    interval_minutes: 60,
                },
            },
            TelescopeConfig {
                name: "UKIRT".to_string(),
                semester: SemesterRule {
                    a_start: (2, 1),
                    b_start: (8, 1),
                },
                floor_year: 2016,
                grid: SlotGrid {
                    day_start: NaiveTime::from_hms(12, 0, 0),
                    first: NaiveTime::from_hms(18, 0, 0),
                    last: NaiveTime::from_hms(6, 0, 0),
                    interval_minutes: 60,
                },
            },
        ])
    }

    /// Looks up a telescope by case-insensitive name.
    pub fn get(&self, name: Option<&str>) -> ScheduleResult<&TelescopeConfig> {
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ScheduleError::Configuration("No telescope selected".to_string())),
        };
        self.telescopes
            .get(&name.to_uppercase())
            .ok_or_else(|| ScheduleError::Configuration(format!("Unknown telescope: {}", name)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.telescopes.values().map(|tel| tel.name.as_str())
    }
}
