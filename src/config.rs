//! Environment-backed configuration, read once at startup.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL_ID: &str = "HuggingFaceTB/SmolVLM2-500M-Video-Instruct";

#[derive(Clone, Debug)]
pub struct Config {
    pub model_id: String,
    pub port: u16,
    /// Warm-up input and the fallback image for requests that bring none.
    pub demo_image: String,
    pub result_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Config {
        dotenvy::dotenv().ok();

        let model_id = std::env::var("MODEL_ID").unwrap_or(DEFAULT_MODEL_ID.to_owned());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| u16::from_str(&s).ok())
            .unwrap_or(8888);
        let demo_image = std::env::var("DEMO_IMAGE").unwrap_or("./images/cat.jpg".to_owned());
        let result_timeout_secs = std::env::var("RESULT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| u64::from_str(&s).ok())
            .unwrap_or(120);

        Config {
            model_id,
            port,
            demo_image,
            result_timeout: Duration::from_secs(result_timeout_secs),
        }
    }
}
