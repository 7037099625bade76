use chrono::NaiveTime;
use tracing::{debug, info, warn};

use super::{
    fetch_range,
    form::{night_field, slot_field, ScheduleForm},
    model::{schedule_revision, Night, Slot},
};
use crate::{
    config::{SlotGrid, TelescopeConfig},
    database::ScheduleRepository,
    error::{ScheduleError, ScheduleResult},
    semester::{semester_boundary, Semester},
};

/// Builds the edited range from the fetched nights and the submitted form.
///
/// The fetched nights are left untouched. Slots are rebuilt from the full grid
/// and only kept where the submitted value differs from the night's new
/// default queue, so stale overrides disappear.
pub fn reconcile(grid: &SlotGrid, nights: &[Night], form: &ScheduleForm) -> Vec<Night> {
    let slot_times = grid.slots_full();

    let mut ordered: Vec<&Night> = nights.iter().collect();
    ordered.sort_by_key(|night| night.date);

    ordered
        .into_iter()
        .map(|night| reconcile_night(&slot_times, night, form))
        .collect()
}

fn reconcile_night(slot_times: &[NaiveTime], night: &Night, form: &ScheduleForm) -> Night {
    let date = night.date;
    let queue = form.value(&night_field("queue", date));

    let slots = slot_times
        .iter()
        .filter_map(|&time| {
            let value = form.value(&slot_field(date, time))?;
            if queue.as_deref() == Some(value.as_str()) {
                None
            } else {
                Some(Slot {
                    date,
                    time,
                    queue: value,
                })
            }
        })
        .collect();

    Night {
        telescope: night.telescope.clone(),
        date,
        queue,
        staff_op: form.value(&night_field("staff_op", date)),
        staff_eo: form.value(&night_field("staff_eo", date)),
        staff_it: form.value(&night_field("staff_it", date)),
        notes: form.value(&night_field("notes", date)),
        notes_private: form.flag(&night_field("notes_private", date)),
        holiday: form.flag(&night_field("holiday", date)),
        slots,
    }
}

/// Applies a submitted form to a whole semester with a single write.
pub fn edit_schedule(
    repo: &dyn ScheduleRepository,
    tel: &TelescopeConfig,
    semester: Semester,
    form: &ScheduleForm,
) -> ScheduleResult<Vec<Night>> {
    let (start, end) = semester_boundary(tel, semester);
    let current = fetch_range(repo, tel, start, end)?;

    if let Some(submitted) = form.revision() {
        if submitted != schedule_revision(&current) {
            warn!(telescope = %tel.name, %semester, "rejecting edit of stale schedule");
            return Err(ScheduleError::StaleEdit { submitted });
        }
    }

    let nights = reconcile(&tel.grid, &current, form);
    let changed = nights
        .iter()
        .zip(current.iter())
        .filter(|(new, old)| new != old)
        .count();
    debug!(telescope = %tel.name, %semester, changed, "reconciled schedule");

    repo.update_schedule(&nights)?;
    info!(
        telescope = %tel.name,
        %semester,
        nights = nights.len(),
        changed,
        "schedule updated"
    );

    Ok(nights)
}
