// Service configuration loading
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_range_ttl_hours")]
    pub range_ttl_hours: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            range_ttl_hours: default_range_ttl_hours(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_range_ttl_hours() -> u64 {
    24
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/upstream"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied_for_missing_sections() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[upstream]\nbase_url = \"http://localhost:8000\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let app: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(app.upstream.base_url, "http://localhost:8000");
        assert_eq!(app.upstream.timeout_secs, 30);
        assert_eq!(app.upstream.retry_attempts, 2);
        assert_eq!(app.cache.range_ttl_hours, 24);
        assert_eq!(app.server.bind, "0.0.0.0:8080");
    }
}
