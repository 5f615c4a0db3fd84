pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod view;

use db::SharedBackend;

/// Shared by every request handler.
pub struct SiteState {
    pub backend: SharedBackend,
    pub image_bucket: String,
}
