//! Semester codes and their date boundaries.
//!
//! A semester code is a two digit year followed by `A` or `B`, e.g. `24B`.
//! Each telescope decides on which days of the year its A and B halves begin.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::{
    config::TelescopeConfig,
    error::{ScheduleError, ScheduleResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Half {
    A,
    B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Field order gives the chronological ordering: year first, then A before B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Semester {
    year: i32,
    half: Half,
}

impl Semester {
    pub fn new(year: i32, half: Half) -> Self {
        Self { year, half }
    }

    pub fn next(self) -> Self {
        match self.half {
            Half::A => Self::new(self.year, Half::B),
            Half::B => Self::new(self.year + 1, Half::A),
        }
    }

    pub fn prev(self) -> Self {
        match self.half {
            Half::A => Self::new(self.year - 1, Half::B),
            Half::B => Self::new(self.year, Half::A),
        }
    }

    pub fn adjacent(self, direction: Direction) -> Self {
        match direction {
            Direction::Prev => self.prev(),
            Direction::Next => self.next(),
        }
    }
}

impl FromStr for Semester {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        let malformed = || ScheduleError::Format(format!("semester code '{}'", s));

        if bytes.len() != 3 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
            return Err(malformed());
        }
        let half = match bytes[2].to_ascii_uppercase() {
            b'A' => Half::A,
            b'B' => Half::B,
            _ => return Err(malformed()),
        };
        let year = 2000 + i32::from(bytes[0] - b'0') * 10 + i32::from(bytes[1] - b'0');

        Ok(Self::new(year, half))
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let half = match self.half {
            Half::A => 'A',
            Half::B => 'B',
        };
        write!(f, "{:02}{}", self.year.rem_euclid(100), half)
    }
}

fn cutover(tel: &TelescopeConfig, year: i32, half: Half) -> NaiveDate {
    let (month, day) = match half {
        Half::A => tel.semester.a_start,
        Half::B => tel.semester.b_start,
    };
    NaiveDate::from_ymd(year, month, day)
}

pub fn determine_semester(tel: &TelescopeConfig, date: NaiveDate) -> Semester {
    let year = date.year();
    if date < cutover(tel, year, Half::A) {
        Semester::new(year - 1, Half::B)
    } else if date < cutover(tel, year, Half::B) {
        Semester::new(year, Half::A)
    } else {
        Semester::new(year, Half::B)
    }
}

/// Inclusive first and last dates of a semester.
pub fn semester_boundary(tel: &TelescopeConfig, semester: Semester) -> (NaiveDate, NaiveDate) {
    let following = semester.next();
    (
        cutover(tel, semester.year, semester.half),
        cutover(tel, following.year, following.half).pred(),
    )
}

pub fn adjacent_semester(code: &str, direction: Direction) -> ScheduleResult<String> {
    let semester: Semester = code.parse()?;
    Ok(semester.adjacent(direction).to_string())
}

/// Semesters from the one containing `today` back to A of the floor year,
/// newest first.
pub fn semester_options(tel: &TelescopeConfig, today: NaiveDate) -> Vec<Semester> {
    let floor = Semester::new(tel.floor_year, Half::A);
    let mut semester = determine_semester(tel, today);

    let mut options = vec![semester];
    while semester > floor {
        semester = semester.prev();
        options.push(semester);
    }
    options
}
