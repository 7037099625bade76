use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::{
    fetch_range,
    form::{night_field, slot_field, DATE_FMT},
    model::{schedule_revision, Night, QueueInfo},
};
use crate::{
    config::TelescopeConfig,
    database::ScheduleRepository,
    error::ScheduleResult,
    semester::{semester_boundary, semester_options, Semester},
};

const SLOT_DISPLAY_FMT: &str = "%H:%M";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Staff,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveSlot {
    pub time: NaiveTime,
    pub queue: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct SlotView {
    pub time: String,
    pub queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NightView {
    pub date: String,
    pub queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_op: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_eo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_it: Option<String>,
    pub notes: Option<String>,
    pub notes_private: bool,
    pub holiday: bool,
    pub slots: Vec<SlotView>,
    /// Edit form field names for the night's own values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueueCount {
    /// `None` counts slots with no queue assigned.
    pub queue: Option<String>,
    pub slots: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScheduleView {
    pub telescope: String,
    pub semester: String,
    pub prev: String,
    pub next: String,
    pub options: Vec<String>,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    pub queues: Vec<QueueInfo>,
    pub summary: Vec<QueueCount>,
    pub nights: Vec<NightView>,
}

/// Queue in effect at every grid time: the override if there is one, else the
/// night's default.
pub fn effective_grid(slot_times: &[NaiveTime], night: &Night) -> Vec<EffectiveSlot> {
    slot_times
        .iter()
        .map(|&time| EffectiveSlot {
            time,
            queue: night
                .slot_at(time)
                .map(|slot| slot.queue.clone())
                .or_else(|| night.queue.clone()),
        })
        .collect()
}

pub fn queue_summary(slot_times: &[NaiveTime], nights: &[Night]) -> Vec<QueueCount> {
    let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
    for night in nights {
        for slot in effective_grid(slot_times, night) {
            *counts.entry(slot.queue).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(queue, slots)| QueueCount { queue, slots })
        .collect()
}

fn night_view(slot_times: &[NaiveTime], night: &Night, visibility: Visibility) -> NightView {
    let staff = visibility == Visibility::Staff;
    let slots = effective_grid(slot_times, night)
        .into_iter()
        .map(|slot| SlotView {
            time: slot.time.format(SLOT_DISPLAY_FMT).to_string(),
            queue: slot.queue,
            field: if staff {
                Some(slot_field(night.date, slot.time))
            } else {
                None
            },
        })
        .collect();

    let mut view = NightView {
        date: night.date.format(DATE_FMT).to_string(),
        queue: night.queue.clone(),
        staff_op: None,
        staff_eo: None,
        staff_it: None,
        notes: night.notes.clone(),
        notes_private: night.notes_private,
        holiday: night.holiday,
        slots,
        fields: None,
    };
    if staff {
        view.staff_op = night.staff_op.clone();
        view.staff_eo = night.staff_eo.clone();
        view.staff_it = night.staff_it.clone();
        view.fields = Some(night_fields(night.date));
    } else if night.notes_private {
        view.notes = None;
    }
    view
}

/// Assembles the display grid for an already fetched semester.
pub fn build_view(
    tel: &TelescopeConfig,
    semester: Semester,
    nights: &[Night],
    queues: BTreeMap<String, QueueInfo>,
    visibility: Visibility,
    today: NaiveDate,
) -> ScheduleView {
    let slot_times = tel.grid.slots_full();
    let (start, end) = semester_boundary(tel, semester);

    ScheduleView {
        telescope: tel.name.clone(),
        semester: semester.to_string(),
        prev: semester.prev().to_string(),
        next: semester.next().to_string(),
        options: semester_options(tel, today)
            .iter()
            .map(ToString::to_string)
            .collect(),
        start: start.format(DATE_FMT).to_string(),
        end: end.format(DATE_FMT).to_string(),
        revision: match visibility {
            Visibility::Staff => Some(schedule_revision(nights)),
            Visibility::Public => None,
        },
        queues: queues
            .into_iter()
            .map(|(_, info)| info)
            .filter(|info| visibility == Visibility::Staff || !info.hidden)
            .collect(),
        summary: queue_summary(&slot_times, nights),
        nights: nights
            .iter()
            .map(|night| night_view(&slot_times, night, visibility))
            .collect(),
    }
}

pub fn schedule_view(
    repo: &dyn ScheduleRepository,
    tel: &TelescopeConfig,
    semester: Semester,
    visibility: Visibility,
    today: NaiveDate,
) -> ScheduleResult<ScheduleView> {
    let (start, end) = semester_boundary(tel, semester);
    let nights = fetch_range(repo, tel, start, end)?;
    let queues = repo.get_sched_queue_info(&tel.name, visibility == Visibility::Staff)?;

    Ok(build_view(tel, semester, &nights, queues, visibility, today))
}

/// Form field names for a night's editable metadata, in display order.
pub fn night_fields(date: NaiveDate) -> Vec<String> {
    [
        "queue",
        "staff_op",
        "staff_eo",
        "staff_it",
        "notes",
        "notes_private",
        "holiday",
    ]
    .iter()
    .map(|prefix| night_field(prefix, date))
    .collect()
}
