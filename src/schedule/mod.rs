pub mod editor;
pub mod form;
pub mod model;
mod requests;
mod responses;
pub mod view;

use std::collections::HashMap;

use actix_web::{error::BlockingError, get, http::header, web, HttpResponse, Responder};
use chrono::NaiveDate;
use tracing::warn;

use crate::{
    config::TelescopeConfig,
    database::ScheduleRepository,
    error::{ScheduleError, ScheduleResult},
    protocol::SimpleResponse,
    semester::{adjacent_semester, determine_semester, Direction, Semester},
    utils::today,
    AppState,
};

use self::{form::ScheduleForm, model::Night, requests::*, responses::*, view::Visibility};

/// A whole semester of slot fields does not fit the default form limit.
const EDIT_FORM_LIMIT: usize = 4 * 1024 * 1024;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(public_view)
        .service(staff_view)
        .service(queues)
        .service(semesters)
        .service(
            web::resource("/edit")
                .app_data(web::FormConfig::default().limit(EDIT_FORM_LIMIT))
                .route(web::post().to(edit)),
        );
}

crate::get_funcs! {
    (public_view, "/view", ViewRequest, ViewResponse),
    (staff_view, "/staff", ViewRequest, ViewResponse),
    (queues, "/queues", QueuesRequest, QueuesResponse),
    (semesters, "/semesters", SemestersRequest, SemestersResponse),
}

/// Fetches a gap-free range with each night's slots in telescope day order.
pub fn fetch_range(
    repo: &dyn ScheduleRepository,
    tel: &TelescopeConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> ScheduleResult<Vec<Night>> {
    let mut nights = repo.get_schedule(&tel.name, start, end)?;
    for night in nights.iter_mut() {
        night.sort_slots(&tel.grid);
    }
    Ok(nights)
}

/// An omitted semester means the one containing `today`.
fn resolve_semester(
    tel: &TelescopeConfig,
    code: Option<&str>,
    today: NaiveDate,
) -> ScheduleResult<Semester> {
    match code.map(str::trim) {
        Some(code) if !code.is_empty() => code.parse(),
        _ => Ok(determine_semester(tel, today)),
    }
}

/// Edits rewrite a whole semester, so the target must be named explicitly.
fn require_semester(code: Option<&str>) -> ScheduleResult<Semester> {
    match code.map(str::trim) {
        Some(code) if !code.is_empty() => code.parse(),
        _ => Err(ScheduleError::Format("missing semester code".to_string())),
    }
}

fn unblock(err: BlockingError<ScheduleError>) -> ScheduleError {
    match err {
        BlockingError::Error(err) => err,
        BlockingError::Canceled => ScheduleError::storage_msg("repository task canceled"),
    }
}

fn view_location(telescope: &str, semester: Semester) -> String {
    format!("/schedule/view?tel={}&semester={}", telescope, semester)
}

async fn public_view_impl(
    state: web::Data<AppState>,
    info: web::Query<ViewRequest>,
) -> anyhow::Result<ViewResponse> {
    load_view(state, info.into_inner(), Visibility::Public).await
}

async fn staff_view_impl(
    state: web::Data<AppState>,
    info: web::Query<ViewRequest>,
) -> anyhow::Result<ViewResponse> {
    load_view(state, info.into_inner(), Visibility::Staff).await
}

async fn load_view(
    state: web::Data<AppState>,
    info: ViewRequest,
    visibility: Visibility,
) -> anyhow::Result<ViewResponse> {
    let tel = state.telescopes.get(info.tel.as_deref())?.clone();
    let today = today();
    let semester = resolve_semester(&tel, info.semester.as_deref(), today)?;

    let repo = state.repo.clone();
    let schedule = web::block(move || {
        view::schedule_view(&*repo, &tel, semester, visibility, today)
    })
    .await
    .map_err(unblock)?;

    Ok(ViewResponse {
        success: true,
        err: "".to_string(),
        schedule,
    })
}

async fn queues_impl(
    state: web::Data<AppState>,
    info: web::Query<QueuesRequest>,
) -> anyhow::Result<QueuesResponse> {
    let info = info.into_inner();
    let telescope = state.telescopes.get(info.tel.as_deref())?.name.clone();

    let repo = state.repo.clone();
    let queue_info = web::block(move || repo.get_sched_queue_info(&telescope, info.hidden))
        .await
        .map_err(unblock)?;

    Ok(QueuesResponse {
        success: true,
        err: "".to_string(),
        queues: queue_info.into_iter().map(|(_, info)| info).collect(),
    })
}

async fn semesters_impl(
    state: web::Data<AppState>,
    info: web::Query<SemestersRequest>,
) -> anyhow::Result<SemestersResponse> {
    let info = info.into_inner();
    let tel = state.telescopes.get(info.tel.as_deref())?;
    let today = today();
    let semester = resolve_semester(tel, info.semester.as_deref(), today)?.to_string();

    Ok(SemestersResponse {
        success: true,
        err: "".to_string(),
        telescope: tel.name.clone(),
        prev: adjacent_semester(&semester, Direction::Prev)?,
        next: adjacent_semester(&semester, Direction::Next)?,
        semester,
        options: crate::semester::semester_options(tel, today)
            .iter()
            .map(ToString::to_string)
            .collect(),
    })
}

async fn edit(
    state: web::Data<AppState>,
    info: web::Query<ViewRequest>,
    form: web::Form<HashMap<String, String>>,
) -> impl Responder {
    match edit_impl(state, info.into_inner(), form.into_inner()).await {
        Ok(location) => HttpResponse::SeeOther()
            .header(header::LOCATION, location)
            .finish(),
        Err(err) => {
            warn!(handler = "edit", "{:#}", err);
            HttpResponse::Ok().json(SimpleResponse::err(err.to_string()))
        }
    }
}

/// Returns the view to redirect to once the edit is stored.
async fn edit_impl(
    state: web::Data<AppState>,
    info: ViewRequest,
    fields: HashMap<String, String>,
) -> anyhow::Result<String> {
    let tel = state.telescopes.get(info.tel.as_deref())?.clone();
    let semester = require_semester(info.semester.as_deref())?;
    let location = view_location(&tel.name, semester);

    let form = ScheduleForm::from(fields);
    let repo = state.repo.clone();
    web::block(move || editor::edit_schedule(&*repo, &tel, semester, &form))
        .await
        .map_err(unblock)?;

    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Telescopes,
        database::memory::MemoryRepository,
        schedule::model::{QueueInfo, Slot},
    };
    use actix_web::{http::StatusCode, test, App};
    use chrono::NaiveTime;
    use serde_json::Value;
    use std::sync::Arc;

    fn state(repo: &Arc<MemoryRepository>) -> AppState {
        AppState {
            repo: repo.clone(),
            telescopes: Arc::new(Telescopes::builtin()),
        }
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd(2023, 6, 1)
    }

    fn seeded_repo() -> Arc<MemoryRepository> {
        let repo = Arc::new(MemoryRepository::new());
        let night = Night {
            queue: Some("PI".to_string()),
            staff_op: Some("jdoe".to_string()),
            notes: Some("instrument swap".to_string()),
            notes_private: true,
            slots: vec![Slot {
                date: june_first(),
                time: NaiveTime::from_hms(20, 0, 0),
                queue: "EC".to_string(),
            }],
            ..Night::empty("JCMT", june_first())
        };
        repo.update_schedule(&[night]).unwrap();
        repo.add_queue(
            "JCMT",
            QueueInfo {
                queue: "PI".to_string(),
                name: "PI science".to_string(),
                ..Default::default()
            },
        );
        repo.add_queue(
            "JCMT",
            QueueInfo {
                queue: "ENG".to_string(),
                name: "Engineering".to_string(),
                hidden: true,
                ..Default::default()
            },
        );
        repo
    }

    fn night_json<'a>(body: &'a Value, date: &str) -> &'a Value {
        body["nights"]
            .as_array()
            .unwrap()
            .iter()
            .find(|night| night["date"] == date)
            .unwrap()
    }

    #[actix_rt::test]
    async fn public_view_hides_staff_fields() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/schedule/view?tel=JCMT&semester=23A")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["semester"], "23A");
        assert_eq!(body["prev"], "22B");
        assert_eq!(body["next"], "23B");
        assert_eq!(body["start"], "2023-02-02");
        assert_eq!(body["end"], "2023-08-01");
        assert_eq!(body["nights"].as_array().unwrap().len(), 181);
        assert!(body.get("revision").is_none());
        assert_eq!(body["queues"].as_array().unwrap().len(), 1);

        let night = night_json(&body, "2023-06-01");
        assert_eq!(night["queue"], "PI");
        assert!(night.get("staff_op").is_none());
        assert_eq!(night["notes"], Value::Null);
        let slots = night["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0]["time"], "16:00");
        assert_eq!(slots[0]["queue"], "PI");
        assert_eq!(slots[4]["time"], "20:00");
        assert_eq!(slots[4]["queue"], "EC");

        let empty = night_json(&body, "2023-06-02");
        assert!(empty["slots"]
            .as_array()
            .unwrap()
            .iter()
            .all(|slot| slot["queue"] == Value::Null));
    }

    #[actix_rt::test]
    async fn staff_view_shows_private_data() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/schedule/staff?tel=jcmt&semester=23a")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["telescope"], "JCMT");
        assert!(body["revision"].as_str().is_some());
        assert_eq!(body["queues"].as_array().unwrap().len(), 2);
        let night = night_json(&body, "2023-06-01");
        assert_eq!(night["staff_op"], "jdoe");
        assert_eq!(night["notes"], "instrument swap");
        assert_eq!(night["slots"][4]["field"], "queue_2023-06-01_20-00-00");
    }

    #[actix_rt::test]
    async fn edit_redirects_and_persists() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        let form = vec![
            ("queue_2023-06-01", "A"),
            ("queue_2023-06-01_18-00-00", "B"),
            ("queue_2023-06-01_20-00-00", "A"),
            ("holiday_2023-06-01", "on"),
        ];
        let req = test::TestRequest::post()
            .uri("/schedule/edit?tel=JCMT&semester=23A")
            .set_form(&form)
            .to_request();
        let resp = test::call_service(&mut app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/schedule/view?tel=JCMT&semester=23A"
        );

        let stored = repo.get_schedule("JCMT", june_first(), june_first()).unwrap();
        assert_eq!(stored[0].queue.as_deref(), Some("A"));
        assert!(stored[0].holiday);
        assert_eq!(stored[0].staff_op, None);
        assert_eq!(
            stored[0].slots,
            vec![Slot {
                date: june_first(),
                time: NaiveTime::from_hms(18, 0, 0),
                queue: "B".to_string(),
            }]
        );
    }

    #[actix_rt::test]
    async fn stale_edit_is_refused() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/schedule/edit?tel=JCMT&semester=23A")
            .set_form(&vec![("queue_2023-06-01", "DDT"), ("revision", "0123")])
            .to_request();
        let resp = test::call_service(&mut app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let stored = repo.get_schedule("JCMT", june_first(), june_first()).unwrap();
        assert_eq!(stored[0].queue.as_deref(), Some("PI"));
    }

    #[actix_rt::test]
    async fn bad_selectors_are_reported() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/schedule/view?tel=Keck&semester=23A")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["err"], "Unknown telescope: Keck");

        let req = test::TestRequest::get()
            .uri("/schedule/view?semester=23A")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["err"], "No telescope selected");

        let req = test::TestRequest::get()
            .uri("/schedule/view?tel=JCMT&semester=2023A")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["err"], "Wrong format: semester code '2023A'");

        let req = test::TestRequest::post()
            .uri("/schedule/edit?tel=JCMT&semester=23Q")
            .set_form(&vec![("queue_2023-06-01", "DDT")])
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["success"], false);
        assert_eq!(repo.write_count(), 1);
    }

    #[actix_rt::test]
    async fn edit_without_semester_is_refused() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        for uri in &["/schedule/edit?tel=JCMT", "/schedule/edit?tel=JCMT&semester=%20"] {
            let req = test::TestRequest::post()
                .uri(uri)
                .set_form(&vec![("queue_2023-06-01", "DDT")])
                .to_request();
            let resp = test::call_service(&mut app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["err"], "Wrong format: missing semester code");
        }

        assert_eq!(repo.write_count(), 1);
        let stored = repo.get_schedule("JCMT", june_first(), june_first()).unwrap();
        assert_eq!(stored[0].queue.as_deref(), Some("PI"));
        assert_eq!(stored[0].staff_op.as_deref(), Some("jdoe"));
    }

    #[actix_rt::test]
    async fn queues_and_semesters() {
        let repo = seeded_repo();
        let mut app = test::init_service(
            App::new()
                .data(state(&repo))
                .service(web::scope("/schedule").configure(config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/schedule/queues?tel=JCMT")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["queues"].as_array().unwrap().len(), 1);
        assert_eq!(body["queues"][0]["queue"], "PI");

        let req = test::TestRequest::get()
            .uri("/schedule/queues?tel=JCMT&hidden=true")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["queues"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/schedule/semesters?tel=UKIRT&semester=24B")
            .to_request();
        let body: Value = test::read_body_json(test::call_service(&mut app, req).await).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["telescope"], "UKIRT");
        assert_eq!(body["semester"], "24B");
        assert_eq!(body["prev"], "24A");
        assert_eq!(body["next"], "25A");
        assert_eq!(body["options"].as_array().unwrap().last().unwrap(), "16A");
    }
}
