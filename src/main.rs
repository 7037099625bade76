#[macro_use]
extern crate diesel;

mod config;
mod database;
mod error;
mod models;
mod protocol;
mod schedule;
mod schema;
mod semester;
mod utils;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::{
    config::{ServerConfig, Telescopes},
    database::{memory::MemoryRepository, mysql::MysqlRepository, ScheduleRepository},
};

pub struct AppState {
    pub repo: Arc<dyn ScheduleRepository>,
    pub telescopes: Arc<Telescopes>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Filter comes from `RUST_LOG`, e.g. `RUST_LOG=sched_server=debug`.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to start the logger");

    let config = ServerConfig::from_env();
    let repo: Arc<dyn ScheduleRepository> = match &config.database_url {
        Some(conn_url) => Arc::new(MysqlRepository::connect(conn_url).expect("Failed to create pool")),
        None => {
            warn!("DATABASE_URL not set, schedule is kept in memory only");
            Arc::new(MemoryRepository::new())
        }
    };
    let telescopes = Arc::new(Telescopes::builtin());
    info!(
        bind = %config.bind,
        telescopes = ?telescopes.names().collect::<Vec<_>>(),
        "starting schedule server"
    );

    HttpServer::new(move || {
        App::new()
            .data(AppState {
                repo: repo.clone(),
                telescopes: telescopes.clone(),
            })
            .service(web::scope("/schedule").configure(schedule::config))
    })
    .bind(&config.bind)?
    .run()
    .await
}
