pub mod memory;
pub mod mysql;

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    error::ScheduleResult,
    schedule::model::{Night, QueueInfo},
};

/// Bulk access to stored schedule nights.
pub trait ScheduleRepository: Send + Sync {
    /// One night per date in `[start, end]`, ascending. Dates with nothing
    /// stored come back as empty nights.
    fn get_schedule(
        &self,
        telescope: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ScheduleResult<Vec<Night>>;

    fn get_sched_queue_info(
        &self,
        telescope: &str,
        include_hidden: bool,
    ) -> ScheduleResult<BTreeMap<String, QueueInfo>>;

    /// Replaces the stored night and all of its slots for every date given.
    fn update_schedule(&self, nights: &[Night]) -> ScheduleResult<()>;
}

/// Expands the stored nights of a range into a gap-free sequence.
pub fn fill_gaps(
    telescope: &str,
    start: NaiveDate,
    end: NaiveDate,
    mut stored: BTreeMap<NaiveDate, Night>,
) -> Vec<Night> {
    let mut nights = Vec::new();
    let mut date = start;
    while date <= end {
        nights.push(
            stored
                .remove(&date)
                .unwrap_or_else(|| Night::empty(telescope, date)),
        );
        date = date.succ();
    }
    nights
}
