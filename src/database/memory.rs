use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::NaiveDate;
use parking_lot::RwLock;

use super::{fill_gaps, ScheduleRepository};
use crate::{
    error::{ScheduleError, ScheduleResult},
    schedule::model::{Night, QueueInfo},
};

/// Process-local repository used when no database is configured.
#[derive(Default)]
pub struct MemoryRepository {
    nights: RwLock<BTreeMap<(String, NaiveDate), Night>>,
    queues: RwLock<BTreeMap<String, BTreeMap<String, QueueInfo>>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn add_queue<S: ToString>(&self, telescope: S, info: QueueInfo) {
        self.queues
            .write()
            .entry(telescope.to_string())
            .or_default()
            .insert(info.queue.clone(), info);
    }

    /// Number of successful `update_schedule` calls.
    #[cfg(test)]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ScheduleRepository for MemoryRepository {
    fn get_schedule(
        &self,
        telescope: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ScheduleResult<Vec<Night>> {
        if start > end {
            return Ok(Vec::new());
        }
        let nights = self.nights.read();
        let stored = nights
            .range((telescope.to_string(), start)..=(telescope.to_string(), end))
            .map(|((_, date), night)| (*date, night.clone()))
            .collect();
        Ok(fill_gaps(telescope, start, end, stored))
    }

    fn get_sched_queue_info(
        &self,
        telescope: &str,
        include_hidden: bool,
    ) -> ScheduleResult<BTreeMap<String, QueueInfo>> {
        Ok(self
            .queues
            .read()
            .get(telescope)
            .map(|queues| {
                queues
                    .iter()
                    .filter(|(_, info)| include_hidden || !info.hidden)
                    .map(|(code, info)| (code.clone(), info.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update_schedule(&self, nights: &[Night]) -> ScheduleResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ScheduleError::storage_msg("write rejected"));
        }

        let mut stored = self.nights.write();
        for night in nights {
            stored.insert((night.telescope.clone(), night.date), night.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
