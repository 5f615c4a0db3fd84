use actix_web::{web, HttpResponse, Responder};

use crate::models::package::PackageCard;
use crate::services::catalog_service::CatalogService;
use crate::SiteState;

pub async fn get_destinations(state: web::Data<SiteState>) -> impl Responder {
    let destinations = CatalogService::new(state.backend.clone())
        .destinations()
        .await;
    HttpResponse::Ok().json(destinations)
}

pub async fn get_packages(state: web::Data<SiteState>) -> impl Responder {
    let packages: Vec<PackageCard> = CatalogService::new(state.backend.clone())
        .packages()
        .await
        .into_iter()
        .map(PackageCard::from)
        .collect();
    HttpResponse::Ok().json(packages)
}
