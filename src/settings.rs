use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use navgrid_navigation::{ObstacleBox, SearchLimits, WorldPoint};
use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Highest tick rate whose period still fits a timer interval comfortably.
pub const MAX_TICK_HZ: u32 = 10_000;

/// Placement and resolution of the navigation grid.
#[derive(Debug, Clone, Deserialize)]
pub struct GridSettings {
    pub center: WorldPoint,
    pub width: f32,
    pub depth: f32,
    pub cell_size: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteSettings {
    pub origin: WorldPoint,
    pub destination: WorldPoint,
}

/// Motion parameters of the simulated agent.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AgentSettings {
    /// Forward speed (m/s).
    pub speed: f32,
    /// Heading blend rate (1/s); the heading catches up within `1 / turn_speed` seconds.
    pub turn_speed: f32,
    /// How far before each waypoint the agent may start turning (m).
    pub turn_distance: f32,
    /// Simulation ticks per second.
    pub tick_hz: u32,
    /// Give up if the destination is not reached within this many seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub grid: GridSettings,
    #[serde(default)]
    pub obstacles: Vec<ObstacleBox>,
    pub route: RouteSettings,
    pub agent: AgentSettings,
    #[serde(default)]
    pub search: SearchLimits,
}

impl Settings {
    /// Rejects agent parameters the simulation cannot run with. Grid and turn
    /// distance values are checked by the navigation crate when they are used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let agent = &self.agent;
        if !(agent.speed > 0.0) || !agent.speed.is_finite() {
            return Err(ConfigError::Message(format!(
                "agent.speed must be positive, got {}",
                agent.speed
            )));
        }
        if !(agent.turn_speed > 0.0) || !agent.turn_speed.is_finite() {
            return Err(ConfigError::Message(format!(
                "agent.turn_speed must be positive, got {}",
                agent.turn_speed
            )));
        }
        if agent.tick_hz == 0 || agent.tick_hz > MAX_TICK_HZ {
            return Err(ConfigError::Message(format!(
                "agent.tick_hz must be between 1 and {}, got {}",
                MAX_TICK_HZ, agent.tick_hz
            )));
        }
        if agent.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "agent.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// `NAVGRID__SECTION__KEY` environment overrides.
fn environment() -> Environment {
    Environment::with_prefix("NAVGRID")
        .separator("__")
        .try_parsing(true)
}

/// Builds the layered configuration, deserialises it and validates the result.
fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file, with `NAVGRID__SECTION__KEY` environment
/// variables layered on top.
pub fn load_settings(path: &str) -> Result<Settings, ConfigError> {
    load_settings_with(path, environment())
}

fn load_settings_with(path: &str, environment: Environment) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let builder = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(environment);

    match build_settings(builder) {
        Ok(settings) => {
            info!(
                obstacles = settings.obstacles.len(),
                cell_size = settings.grid.cell_size,
                "Successfully loaded configuration"
            );
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
