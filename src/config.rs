use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,

    /// Bounded retries for version-conflicted writes before the engine
    /// gives up and reports a storage failure.
    pub write_retries: u32,

    // Rate limiting
    pub rate_create_per_min: u32,
    pub rate_attendance_per_min: u32,
    pub rate_list_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:4000".to_string()),

            write_retries: env::var("ENGINE_WRITE_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap(),

            rate_create_per_min: env::var("RATE_CREATE_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_attendance_per_min: env::var("RATE_ATTENDANCE_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap(),
            rate_list_per_min: env::var("RATE_LIST_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }
}
