use serde::Serialize;

use super::{model::QueueInfo, view::ScheduleView};

#[derive(Default, Serialize)]
pub struct ViewResponse {
    pub success: bool,
    pub err: String,
    #[serde(flatten)]
    pub schedule: ScheduleView,
}

#[derive(Default, Serialize)]
pub struct QueuesResponse {
    pub success: bool,
    pub err: String,
    pub queues: Vec<QueueInfo>,
}

#[derive(Default, Serialize)]
pub struct SemestersResponse {
    pub success: bool,
    pub err: String,
    pub telescope: String,
    pub semester: String,
    pub prev: String,
    pub next: String,
    pub options: Vec<String>,
}

crate::impl_err_response! {
    ViewResponse,
    QueuesResponse,
    SemestersResponse,
}
