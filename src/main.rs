use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;

use attendance::api::students::Engine;
use attendance::config::Config;
use attendance::docs::ApiDoc;
use attendance::engine::AttendanceEngine;
use attendance::routes;
use attendance::store::MemoryStore;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;

#[get("/")]
async fn index() -> impl Responder {
    "Student Attendance System"
}

#[get("/api-doc/openapi.json")]
async fn openapi_doc() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store = Arc::new(MemoryStore::new());
    let engine: Data<Engine> = Data::new(
        AttendanceEngine::new(store, config.write_retries)
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let engine_for_warmup = engine.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = engine_for_warmup.warm_roll_cache().await {
            eprintln!("Failed to warmup roll cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .app_data(engine.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .service(openapi_doc)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
