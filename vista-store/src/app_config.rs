use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Storefront backend, e.g. `http://localhost:5000`.
    pub base_url: String,
    /// Vendor collection endpoint; absolute since it may live on another host.
    pub vendor_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("api.base_url", "http://localhost:5000")?
            .set_default("api.vendor_base_url", "http://localhost:5000/api/vendors")?
            .set_default("api.timeout_seconds", default_timeout() as i64)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `VISTA__API__BASE_URL=http://api:5000`
            .add_source(config::Environment::with_prefix("VISTA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
