use blake2::{Blake2b, Digest};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::config::SlotGrid;

/// One calendar night of a telescope's schedule.
///
/// `slots` only holds overrides: entries whose queue differs from `queue`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Night {
    pub telescope: String,
    pub date: NaiveDate,
    pub queue: Option<String>,
    pub staff_op: Option<String>,
    pub staff_eo: Option<String>,
    pub staff_it: Option<String>,
    pub notes: Option<String>,
    pub notes_private: bool,
    pub holiday: bool,
    pub slots: Vec<Slot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// Date of the owning night.
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub queue: String,
}

/// Display metadata for a queue code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueueInfo {
    pub queue: String,
    pub name: String,
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub hidden: bool,
}

impl Night {
    /// A night with nothing recorded.
    pub fn empty<S: ToString>(telescope: S, date: NaiveDate) -> Self {
        Self {
            telescope: telescope.to_string(),
            date,
            queue: None,
            staff_op: None,
            staff_eo: None,
            staff_it: None,
            notes: None,
            notes_private: false,
            holiday: false,
            slots: Vec::new(),
        }
    }

    pub fn slot_at(&self, time: NaiveTime) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.time == time)
    }

    /// Orders slots by their position in the telescope day.
    pub fn sort_slots(&mut self, grid: &SlotGrid) {
        self.slots.sort_by_key(|slot| grid.order_key(slot.time));
    }
}

/// Digest over a fetched range of nights, published with a view so that an
/// edit can detect that the range changed underneath it.
pub fn schedule_revision(nights: &[Night]) -> String {
    let mut hasher = Blake2b::new();
    for night in nights {
        feed_str(&mut hasher, Some(night.telescope.as_str()));
        feed_str(&mut hasher, Some(night.date.to_string().as_str()));
        for value in &[
            &night.queue,
            &night.staff_op,
            &night.staff_eo,
            &night.staff_it,
            &night.notes,
        ] {
            feed_str(&mut hasher, value.as_deref());
        }
        hasher.update(&[night.notes_private as u8, night.holiday as u8]);

        hasher.update(&(night.slots.len() as u64).to_le_bytes());
        for slot in &night.slots {
            feed_str(&mut hasher, Some(slot.time.to_string().as_str()));
            feed_str(&mut hasher, Some(slot.queue.as_str()));
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Length-prefixed so that adjacent fields cannot run into each other, with a
/// tag byte keeping `None` apart from an empty string.
fn feed_str(hasher: &mut Blake2b, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update(&[1u8]);
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }
        None => hasher.update(&[0u8]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn night_with(queue: &str) -> Night {
        let date = NaiveDate::from_ymd(2023, 6, 1);
        Night {
            queue: Some(queue.to_string()),
            slots: vec![Slot {
                date,
                time: NaiveTime::from_hms(2, 0, 0),
                queue: "UH".to_string(),
            }],
            ..Night::empty("JCMT", date)
        }
    }

    #[test]
    fn revision_follows_content() {
        let a = vec![night_with("PI")];
        let b = vec![night_with("PI")];
        let c = vec![night_with("DDT")];

        assert_eq!(schedule_revision(&a), schedule_revision(&b));
        assert_ne!(schedule_revision(&a), schedule_revision(&c));
        assert_eq!(schedule_revision(&a).len(), 128);
    }

    #[test]
    fn revision_covers_every_field() {
        let base = vec![night_with("PI")];
        let revision = schedule_revision(&base);

        let mut notes = base.clone();
        notes[0].notes = Some("dome closed".to_string());
        assert_ne!(schedule_revision(&notes), revision);

        let mut blank = base.clone();
        blank[0].staff_op = Some(String::new());
        assert_ne!(schedule_revision(&blank), revision);

        let mut private = base.clone();
        private[0].notes_private = true;
        assert_ne!(schedule_revision(&private), revision);

        let mut slot = base.clone();
        slot[0].slots[0].queue = "EC".to_string();
        assert_ne!(schedule_revision(&slot), revision);

        let mut shifted = base.clone();
        shifted[0].staff_op = Some("ab".to_string());
        shifted[0].staff_eo = Some("c".to_string());
        let mut other = base;
        other[0].staff_op = Some("a".to_string());
        other[0].staff_eo = Some("bc".to_string());
        assert_ne!(schedule_revision(&shifted), schedule_revision(&other));
    }

    #[test]
    fn slots_sort_in_telescope_day_order() {
        let date = NaiveDate::from_ymd(2023, 6, 1);
        let grid = SlotGrid {
            day_start: NaiveTime::from_hms(14, 0, 0),
            first: NaiveTime::from_hms(16, 0, 0),
            last: NaiveTime::from_hms(7, 0, 0),
            interval_minutes: 60,
        };
        let slot = |h| Slot {
            date,
            time: NaiveTime::from_hms(h, 0, 0),
            queue: "EC".to_string(),
        };
        let mut night = Night {
            slots: vec![slot(3), slot(22), slot(16)],
            ..Night::empty("JCMT", date)
        };
        night.sort_slots(&grid);

        let hours: Vec<NaiveTime> = night.slots.iter().map(|s| s.time).collect();
        assert_eq!(
            hours,
            vec![
                NaiveTime::from_hms(16, 0, 0),
                NaiveTime::from_hms(22, 0, 0),
                NaiveTime::from_hms(3, 0, 0),
            ]
        );
        assert!(night.slot_at(NaiveTime::from_hms(22, 0, 0)).is_some());
        assert!(night.slot_at(NaiveTime::from_hms(23, 0, 0)).is_none());
    }
}
