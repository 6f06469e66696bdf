use std::{env, net::SocketAddr, path::PathBuf};

use url::Url;

use crate::error::AppError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: Url::parse(DEFAULT_GEMINI_BASE_URL).expect("default base url is valid"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|err| AppError::Config(format!("invalid MAX_UPLOAD_BYTES: {err}")))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let api_key = env::var("API_KEY")
            .or_else(|_| env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let base_url = Url::parse(
            &env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
        )
        .map_err(|err| AppError::Config(format!("invalid GEMINI_BASE_URL: {err}")))?;

        Ok(Self {
            listen_addr,
            data_dir,
            max_upload_bytes,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url,
            },
        })
    }
}
