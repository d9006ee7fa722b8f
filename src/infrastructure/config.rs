use crate::domain::device::Device;
use crate::domain::household::Household;
use crate::domain::layout::CardMetrics;
use crate::domain::resize::DEFAULT_SENSITIVITY;
use crate::domain::water_tank::TankDefaults;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "HOME_DASHBOARD";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub layout: LayoutSettings,
    pub tank: TankDefaults,
    pub registry: RegistrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LayoutSettings {
    pub sensitivity: f64,
    pub tile_width: f64,
    pub tile_height: f64,
    pub gutter: f64,
}

impl LayoutSettings {
    pub fn metrics(&self) -> CardMetrics {
        CardMetrics {
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            gutter: self.gutter,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrySettings {
    /// JSON file with devices and households to start from
    pub seed: String,
    /// Delay between the reset command and removing a device
    pub reset_grace_ms: u64,
}

/// Devices and households loaded into the in-memory stores at startup
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedData {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub households: Vec<Household>,
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    let metrics = CardMetrics::default();
    let tank = TankDefaults::default();

    config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("layout.sensitivity", DEFAULT_SENSITIVITY)?
        .set_default("layout.tile_width", metrics.tile_width)?
        .set_default("layout.tile_height", metrics.tile_height)?
        .set_default("layout.gutter", metrics.gutter)?
        .set_default("tank.height_cm", tank.height_cm)?
        .set_default("tank.max_level_cm", tank.max_level_cm)?
        .set_default("tank.volume_m3", tank.volume_m3)?
        .set_default("registry.seed", "config/seed.json")?
        .set_default("registry.reset_grace_ms", 1000)
}

/// Defaults, then `config/app.*`, then `HOME_DASHBOARD__SECTION__KEY` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = defaults()?
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// A missing seed file means starting empty
pub fn load_seed_data(path: &Path) -> anyhow::Result<SeedData> {
    if !path.exists() {
        tracing::info!("No seed file at {}, starting empty", path.display());
        return Ok(SeedData::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse seed file {}", path.display()))
}
