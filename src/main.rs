use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use wayfarer_site::config::SiteConfig;
use wayfarer_site::db::hosted::create_hosted_client;
use wayfarer_site::db::memory::MemoryBackend;
use wayfarer_site::db::SharedBackend;
use wayfarer_site::routes;
use wayfarer_site::services::admin_service::AdminConsole;
use wayfarer_site::SiteState;

/// In-process backend preloaded with the built-in catalog.
async fn demo_backend(image_bucket: &str) -> SharedBackend {
    let backend: SharedBackend = Arc::new(MemoryBackend::new().with_profile_trigger());
    match AdminConsole::new(backend.clone(), image_bucket).seed().await {
        Ok(report) => println!(
            "Demo catalog seeded: {} destinations, {} packages",
            report.destinations_inserted, report.packages_inserted
        ),
        Err(e) => log::error!("Failed to seed demo catalog: {}", e),
    }
    backend
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let config = SiteConfig::from_env();
    println!("Attempting to bind to {}:{}", config.host, config.port);

    let backend = match &config.backend {
        Some(backend_config) => {
            println!("Connecting to hosted backend at {}...", backend_config.url);
            create_hosted_client(backend_config)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?
        }
        None => {
            println!("HOSTED_BACKEND_URL not set, running against the in-process backend");
            demo_backend(&config.image_bucket).await
        }
    };

    let state = web::Data::new(SiteState {
        backend,
        image_bucket: config.image_bucket.clone(),
    });

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
