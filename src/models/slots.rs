use crate::{schedule::model::Slot, schema::schedule_slot};
use chrono::{NaiveDate, NaiveTime};

#[derive(Queryable, Insertable)]
#[table_name = "schedule_slot"]
pub struct SlotRow {
    pub telescope: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub queue: String,
}

impl SlotRow {
    pub fn new(telescope: &str, slot: &Slot) -> Self {
        Self {
            telescope: telescope.to_string(),
            date: slot.date,
            time: slot.time,
            queue: slot.queue.clone(),
        }
    }

    pub fn into_slot(self) -> Slot {
        Slot {
            date: self.date,
            time: self.time,
            queue: self.queue,
        }
    }
}
