// src/config.rs

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;

use crate::analytics::TimeZoneChoice;

const DEFAULT_RESULTS_DB_PATH: &str = "database/resultsdb.json";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:4200,http://127.0.0.1:4200";

#[derive(Debug, Clone)]
pub struct Config {
    pub results_db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Time zone used to bucket results into calendar months.
    pub analytics_timezone: TimeZoneChoice,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let results_db_path = env::var("RESULTS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESULTS_DB_PATH));

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => parse_port(&raw).unwrap_or_else(|| {
                tracing::warn!("Invalid PORT '{}', falling back to {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            Err(_) => DEFAULT_PORT,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let analytics_timezone = env::var("ANALYTICS_TIMEZONE")
            .ok()
            .and_then(|raw| {
                let parsed = raw.parse::<TimeZoneChoice>().ok();
                if parsed.is_none() {
                    tracing::warn!("Unknown ANALYTICS_TIMEZONE '{}', using local time", raw);
                }
                parsed
            })
            .unwrap_or_default();

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        Self {
            results_db_path,
            host,
            port,
            rust_log,
            analytics_timezone,
            cors_origins,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(raw: &str) -> Option<u16> {
    raw.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
