use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::SiteState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(state: web::Data<SiteState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let backend_result = check_backend(&state).await;
    health
        .services
        .insert("hosted_backend".to_string(), backend_result.clone());

    let storage_result = check_image_bucket(&state);
    health
        .services
        .insert("image_storage".to_string(), storage_result.clone());

    if backend_result.status != "ok" || storage_result.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_backend(state: &SiteState) -> ServiceStatus {
    match state.backend.ping().await {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Hosted backend reachable".to_string()),
        },
        Err(e) => {
            log::error!("Hosted backend health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to reach backend: {}", e)),
            }
        }
    }
}

fn check_image_bucket(state: &SiteState) -> ServiceStatus {
    if state.image_bucket.trim().is_empty() {
        ServiceStatus {
            status: "error".to_string(),
            details: Some("IMAGE_BUCKET not configured".to_string()),
        }
    } else {
        ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("Image bucket '{}'", state.image_bucket)),
        }
    }
}
