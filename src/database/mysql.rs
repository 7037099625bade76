use std::collections::BTreeMap;

use anyhow::Context;
use chrono::NaiveDate;
use diesel::{prelude::*, r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;
use tracing::debug;

use super::{fill_gaps, ScheduleRepository};
use crate::{
    error::{ScheduleError, ScheduleResult},
    models::{nights::NightRow, queues::QueueRow, slots::SlotRow},
    schedule::model::{Night, QueueInfo},
};

pub type DbPool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

pub struct MysqlRepository {
    pool: DbPool,
}

impl MysqlRepository {
    pub fn connect(conn_url: &str) -> anyhow::Result<Self> {
        let manager = ConnectionManager::<MysqlConnection>::new(conn_url);
        let pool = r2d2::Pool::builder()
            .build(manager)
            .context("Failed to create pool")?;
        Ok(Self { pool })
    }

    fn get_db_conn(&self) -> ScheduleResult<PooledConnection<ConnectionManager<MysqlConnection>>> {
        self.pool.get().map_err(ScheduleError::storage)
    }
}

impl ScheduleRepository for MysqlRepository {
    fn get_schedule(
        &self,
        telescope: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ScheduleResult<Vec<Night>> {
        use crate::schema::{schedule, schedule_slot};

        let conn = self.get_db_conn()?;
        let rows = schedule::table
            .filter(schedule::telescope.eq(telescope))
            .filter(schedule::date.between(start, end))
            .order(schedule::date.asc())
            .load::<NightRow>(&conn)
            .map_err(ScheduleError::storage)?;
        let slot_rows = schedule_slot::table
            .filter(schedule_slot::telescope.eq(telescope))
            .filter(schedule_slot::date.between(start, end))
            .order((schedule_slot::date.asc(), schedule_slot::time.asc()))
            .load::<SlotRow>(&conn)
            .map_err(ScheduleError::storage)?;
        debug!(
            telescope,
            %start,
            %end,
            nights = rows.len(),
            slots = slot_rows.len(),
            "loaded schedule rows"
        );

        let mut stored: BTreeMap<NaiveDate, Night> = rows
            .into_iter()
            .map(|row| (row.date, row.into_night()))
            .collect();
        for row in slot_rows {
            stored
                .entry(row.date)
                .or_insert_with(|| Night::empty(telescope, row.date))
                .slots
                .push(row.into_slot());
        }

        Ok(fill_gaps(telescope, start, end, stored))
    }

    fn get_sched_queue_info(
        &self,
        telescope: &str,
        include_hidden: bool,
    ) -> ScheduleResult<BTreeMap<String, QueueInfo>> {
        use crate::schema::schedule_queue;

        let conn = self.get_db_conn()?;
        let rows = schedule_queue::table
            .filter(schedule_queue::telescope.eq(telescope))
            .select((
                schedule_queue::queue,
                schedule_queue::name,
                schedule_queue::foreground,
                schedule_queue::background,
                schedule_queue::hidden,
            ))
            .load::<QueueRow>(&conn)
            .map_err(ScheduleError::storage)?;

        Ok(rows
            .into_iter()
            .filter(|row| include_hidden || !row.hidden)
            .map(|row| (row.queue.clone(), QueueInfo::from(row)))
            .collect())
    }

    fn update_schedule(&self, nights: &[Night]) -> ScheduleResult<()> {
        use crate::schema::{schedule, schedule_slot};

        let conn = self.get_db_conn()?;
        conn.transaction::<_, diesel::result::Error, _>(|| {
            for night in nights {
                diesel::replace_into(schedule::table)
                    .values(NightRow::from(night))
                    .execute(&conn)?;

                diesel::delete(
                    schedule_slot::table
                        .filter(schedule_slot::telescope.eq(&night.telescope))
                        .filter(schedule_slot::date.eq(night.date)),
                )
                .execute(&conn)?;

                let slots: Vec<SlotRow> = night
                    .slots
                    .iter()
                    .map(|slot| SlotRow::new(&night.telescope, slot))
                    .collect();
                if !slots.is_empty() {
                    diesel::insert_into(schedule_slot::table)
                        .values(&slots)
                        .execute(&conn)?;
                }
            }
            Ok(())
        })
        .map_err(ScheduleError::storage)
    }
}
