use crate::{schedule::model::Night, schema::schedule};
use chrono::NaiveDate;

#[derive(Queryable, Insertable)]
#[table_name = "schedule"]
pub struct NightRow {
    pub telescope: String,
    pub date: NaiveDate,
    pub queue: Option<String>,
    pub staff_op: Option<String>,
    pub staff_eo: Option<String>,
    pub staff_it: Option<String>,
    pub notes: Option<String>,
    pub notes_private: bool,
    pub holiday: bool,
}

impl NightRow {
    pub fn into_night(self) -> Night {
        Night {
            telescope: self.telescope,
            date: self.date,
            queue: self.queue,
            staff_op: self.staff_op,
            staff_eo: self.staff_eo,
            staff_it: self.staff_it,
            notes: self.notes,
            notes_private: self.notes_private,
            holiday: self.holiday,
            slots: Vec::new(),
        }
    }
}

impl From<&Night> for NightRow {
    fn from(night: &Night) -> Self {
        Self {
            telescope: night.telescope.clone(),
            date: night.date,
            queue: night.queue.clone(),
            staff_op: night.staff_op.clone(),
            staff_eo: night.staff_eo.clone(),
            staff_it: night.staff_it.clone(),
            notes: night.notes.clone(),
            notes_private: night.notes_private,
            holiday: night.holiday,
        }
    }
}
