use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct WellparkApiConfig {
    pub base_url: String,
    pub history_per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Observations per repeating cycle supplied to the model search.
    pub season_length: usize,
    /// Hours of predictions produced per lot.
    pub horizon: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub endpoint: String,
    pub model: String,
    pub key_file: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    pub idle_backoff_secs: u64,
    pub vision: VisionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: WellparkApiConfig,
    pub forecast: ForecastConfig,
    pub recognition: RecognitionConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("WELLPARK_CONFIG").unwrap_or_else(|_| "wellpark-config.toml".to_string());
        let contents = fs::read_to_string(&path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}
