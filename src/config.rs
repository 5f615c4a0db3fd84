use std::env;
use std::path::PathBuf;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const IMAGE_BUCKET: &str = "destination-images";
const ADMIN_FLAG_PATH: &str = ".wayfarer/local-storage.json";

/// Connection settings for the hosted backend (URL + public key).
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

/// The fixed credential pair that opens the admin console.
///
/// This is a demo placeholder and not an access control: anyone holding the
/// client holds the pair. The HTTP admin scope checks the profile role instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "wayfarer-admin".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the site against the in-process backend.
    pub backend: Option<BackendConfig>,
    pub image_bucket: String,
    pub admin: AdminCredentials,
    pub admin_flag_path: PathBuf,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| PORT.to_string())
            .parse()
            .unwrap_or(PORT);

        let backend = match (env::var("HOSTED_BACKEND_URL"), env::var("HOSTED_BACKEND_KEY")) {
            (Ok(url), Ok(api_key)) if !url.is_empty() => Some(BackendConfig { url, api_key }),
            (Ok(_), Err(_)) => {
                log::warn!("HOSTED_BACKEND_URL is set but HOSTED_BACKEND_KEY is missing");
                None
            }
            _ => None,
        };

        let defaults = AdminCredentials::default();
        let admin = AdminCredentials {
            username: env::var("ADMIN_USERNAME").unwrap_or(defaults.username),
            password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.password),
        };

        Self {
            host,
            port,
            backend,
            image_bucket: env::var("IMAGE_BUCKET").unwrap_or_else(|_| IMAGE_BUCKET.to_string()),
            admin,
            admin_flag_path: env::var("ADMIN_FLAG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(ADMIN_FLAG_PATH)),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            backend: None,
            image_bucket: IMAGE_BUCKET.to_string(),
            admin: AdminCredentials::default(),
            admin_flag_path: PathBuf::from(ADMIN_FLAG_PATH),
        }
    }
}
