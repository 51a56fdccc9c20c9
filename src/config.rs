use std::{env, time::Duration};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const MONGODB_DATABASE: &str = "TravelBuddy";
const PROVIDER_TIMEOUT_SECS: u64 = 8;
const GENERATION_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub opentripmap_api_key: Option<String>,
    pub triposo_account: Option<String>,
    pub triposo_api_token: Option<String>,
    pub geoapify_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    pub osm_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub provider_timeout: Duration,
    pub generation_timeout: Duration,
    pub catalog_path: Option<String>,
    pub providers: ProviderCredentials,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| PORT.to_string())
            .parse()
            .unwrap_or(PORT);

        Self {
            host,
            port,
            mongo_uri: non_empty_var("MONGODB_URI"),
            mongo_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| MONGODB_DATABASE.to_string()),
            provider_timeout: secs_var("PROVIDER_TIMEOUT_SECS", PROVIDER_TIMEOUT_SECS),
            generation_timeout: secs_var("GENERATION_TIMEOUT_SECS", GENERATION_TIMEOUT_SECS),
            catalog_path: non_empty_var("CATALOG_PATH"),
            providers: ProviderCredentials {
                opentripmap_api_key: non_empty_var("OPENTRIPMAP_API_KEY"),
                triposo_account: non_empty_var("TRIPOSO_ACCOUNT"),
                triposo_api_token: non_empty_var("TRIPOSO_API_TOKEN"),
                geoapify_api_key: non_empty_var("GEOAPIFY_API_KEY"),
                yelp_api_key: non_empty_var("YELP_API_KEY"),
                osm_enabled: env::var("OSM_ENABLED")
                    .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                    .unwrap_or(true),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongo_uri: None,
            mongo_database: MONGODB_DATABASE.to_string(),
            provider_timeout: Duration::from_secs(PROVIDER_TIMEOUT_SECS),
            generation_timeout: Duration::from_secs(GENERATION_TIMEOUT_SECS),
            catalog_path: None,
            providers: ProviderCredentials {
                opentripmap_api_key: None,
                triposo_account: None,
                triposo_api_token: None,
                geoapify_api_key: None,
                yelp_api_key: None,
                osm_enabled: false,
            },
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_var(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}
