use crate::schedule::model::QueueInfo;

#[derive(Queryable)]
pub struct QueueRow {
    pub queue: String,
    pub name: String,
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub hidden: bool,
}

impl From<QueueRow> for QueueInfo {
    fn from(row: QueueRow) -> Self {
        Self {
            queue: row.queue,
            name: row.name,
            foreground: row.foreground,
            background: row.background,
            hidden: row.hidden,
        }
    }
}
