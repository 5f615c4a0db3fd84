use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::auth_context::SessionContext;
use crate::models::destination::DestinationInput;
use crate::models::package::{PackageCard, PackageDraft};
use crate::routes::admin::{console, error_response};
use crate::services::image_service::ImageData;
use crate::SiteState;

/// Destination form body; `image` replaces the current image when present.
#[derive(Deserialize)]
pub struct DestinationRequest {
    #[serde(flatten)]
    destination: DestinationInput,
    #[serde(default)]
    image: Option<ImageData>,
}

pub async fn list_destinations(
    state: web::Data<SiteState>,
    session: SessionContext,
) -> impl Responder {
    HttpResponse::Ok().json(console(&state, &session).destinations().await)
}

async fn save_destination(
    state: &SiteState,
    session: &SessionContext,
    id: Option<Uuid>,
    request: DestinationRequest,
) -> HttpResponse {
    match console(state, session)
        .save_destination(id, request.destination, request.image.as_ref())
        .await
    {
        Ok(destination) if id.is_none() => HttpResponse::Created().json(destination),
        Ok(destination) => HttpResponse::Ok().json(destination),
        Err(err) => error_response(err),
    }
}

pub async fn create_destination(
    state: web::Data<SiteState>,
    session: SessionContext,
    input: web::Json<DestinationRequest>,
) -> impl Responder {
    save_destination(&state, &session, None, input.into_inner()).await
}

pub async fn update_destination(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    input: web::Json<DestinationRequest>,
) -> impl Responder {
    save_destination(&state, &session, Some(path.into_inner()), input.into_inner()).await
}

pub async fn delete_destination(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> impl Responder {
    match console(&state, &session)
        .delete_destination(path.into_inner())
        .await
    {
        Ok(_) => HttpResponse::Ok().body("Destination deleted"),
        Err(err) => error_response(err),
    }
}

pub async fn list_packages(state: web::Data<SiteState>, session: SessionContext) -> impl Responder {
    let packages: Vec<PackageCard> = console(&state, &session)
        .packages()
        .await
        .into_iter()
        .map(PackageCard::from)
        .collect();
    HttpResponse::Ok().json(packages)
}

async fn save_package(
    state: &SiteState,
    session: &SessionContext,
    id: Option<Uuid>,
    draft: PackageDraft,
) -> HttpResponse {
    match console(state, session).save_package(id, draft).await {
        Ok(package) if id.is_none() => HttpResponse::Created().json(PackageCard::from(package)),
        Ok(package) => HttpResponse::Ok().json(PackageCard::from(package)),
        Err(err) => error_response(err),
    }
}

pub async fn create_package(
    state: web::Data<SiteState>,
    session: SessionContext,
    input: web::Json<PackageDraft>,
) -> impl Responder {
    save_package(&state, &session, None, input.into_inner()).await
}

pub async fn update_package(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    input: web::Json<PackageDraft>,
) -> impl Responder {
    save_package(&state, &session, Some(path.into_inner()), input.into_inner()).await
}

pub async fn delete_package(
    state: web::Data<SiteState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> impl Responder {
    match console(&state, &session)
        .delete_package(path.into_inner())
        .await
    {
        Ok(_) => HttpResponse::Ok().body("Package deleted"),
        Err(err) => error_response(err),
    }
}

pub async fn seed(state: web::Data<SiteState>, session: SessionContext) -> impl Responder {
    match console(&state, &session).seed().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(err) => error_response(err),
    }
}
