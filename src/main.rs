use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod pdf;
mod report;
mod routes;
mod utils;

use config::Config;
use db::init_db;
use pdf::CjkFont;

use crate::docs::ApiDoc;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HR Reports"
}

fn load_cjk_font(config: &Config) -> CjkFont {
    let Some(path) = &config.cjk_font_path else {
        info!("CJK_FONT_PATH not set, PDF output uses Helvetica only");
        return CjkFont(None);
    };
    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path, size = bytes.len(), "Loaded CJK font face");
            CjkFont(Some(Arc::new(bytes)))
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to read CJK font, falling back to Helvetica");
            CjkFont(None)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // `hr-reports hash-password <password>` prints an Argon2 hash for
    // seeding staff rows, then exits without touching the environment
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = args.next().unwrap_or_default();
        println!("{}", auth::password::hash_password(&password));
        return Ok(());
    }

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

    let pool = init_db(&config.database_url).await;
    let cjk_font = load_cjk_font(&config);

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(cjk_font.clone()))
            .service(index)
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
