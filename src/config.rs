use crate::media::AudioFormat;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub backend: BackendConfig,
    pub client: ClientConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
}

/// Where the proxy forwards uploads (server-side origin)
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
}

/// Where the recording client sends uploads (public origin)
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaConfig {
    /// Container assumed when capture format detection fails
    pub default_format: AudioFormat,
}

impl Config {
    /// Load configuration: built-in defaults, then an optional file, then
    /// `VOXNOTE_*` environment overrides (e.g. `VOXNOTE_BACKEND__BASE_URL`).
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("service.bind", "127.0.0.1")?
            .set_default("service.port", 8787_i64)?
            .set_default("backend.base_url", "http://localhost:3000")?
            .set_default("client.api_base_url", "http://localhost:3000")?
            .set_default("media.default_format", "webm")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("VOXNOTE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
