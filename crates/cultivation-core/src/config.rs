//! Layered configuration loading (§6 "Configuration").
//!
//! A base file merged with an optional local-override file, then
//! environment variables, using [`config::Config`]'s layered-source builder
//! the way the `emergence-core/src/config.rs` pattern does, narrowed to
//! the key set §6 names. `SERVER_HOST`/`SERVER_PORT` env vars override
//! `system.host`/`system.port` (priority: env > config > default
//! `127.0.0.1:8002`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use cultivation_llm::CallMode;

/// Default host when neither config nor environment set one.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port when neither config nor environment set one.
pub const DEFAULT_PORT: u16 = 8002;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The layered config sources could not be built or deserialized.
    #[error("failed to load configuration: {source}")]
    Build {
        /// The underlying error from the `config` crate.
        #[from]
        source: config::ConfigError,
    },
}

/// Top-level simulation configuration, mirroring §6's key namespaces.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// LLM backend settings (`llm.*`).
    #[serde(default)]
    pub llm: LlmConfig,
    /// AI dispatch tuning (`ai.*`).
    #[serde(default)]
    pub ai: AiConfig,
    /// Game-content parameters (`game.*`).
    #[serde(default)]
    pub game: GameConfig,
    /// System/server settings (`system.*`).
    #[serde(default)]
    pub system: SystemConfig,
    /// Filesystem paths (`paths.*`).
    #[serde(default)]
    pub paths: PathsConfig,
}

impl SimulationConfig {
    /// Load configuration from a base file, an optional local-override
    /// file, and environment variables, in that priority order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Build`] if any source cannot be read/parsed,
    /// or the merged result cannot be deserialized into [`SimulationConfig`].
    pub fn load(base_path: &Path, local_override_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from(base_path).format(config::FileFormat::Yaml).required(true));

        if let Some(path) = local_override_path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Yaml).required(false));
        }

        builder = builder
            .set_default("system.host", DEFAULT_HOST)?
            .set_default("system.port", i64::from(DEFAULT_PORT))?
            .add_source(config::Environment::default().prefix("SERVER").try_parsing(true).separator("_"));

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, applying the same
    /// environment overrides [`Self::load`] would.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Build`] if the string cannot be parsed or
    /// deserialized.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .set_default("system.host", DEFAULT_HOST)?
            .set_default("system.port", i64::from(DEFAULT_PORT))?;
        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SERVER_HOST`/`SERVER_PORT` env var overrides, if set.
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.system.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.system.port = port;
            }
        }
    }
}

/// LLM backend configuration (`llm.*`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmConfig {
    /// `llm.base_url`.
    #[serde(default)]
    pub base_url: String,
    /// `llm.key`.
    #[serde(default)]
    pub key: String,
    /// `llm.model_name`.
    #[serde(default)]
    pub model_name: String,
    /// `llm.fast_model_name`.
    #[serde(default)]
    pub fast_model_name: String,
    /// `llm.mode`: the process-wide default call mode, resolved by
    /// task name when absent from [`Self::default_modes`].
    #[serde(default)]
    pub mode: Option<CallMode>,
    /// `llm.default_modes`: per-task-name call mode overrides.
    #[serde(default)]
    pub default_modes: BTreeMap<String, CallMode>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            key: String::new(),
            model_name: String::new(),
            fast_model_name: String::new(),
            mode: None,
            default_modes: BTreeMap::new(),
        }
    }
}

/// AI dispatch tuning (`ai.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AiConfig {
    /// `ai.max_concurrent_requests`: the LLM dispatch semaphore's capacity.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: u32,
    /// `ai.max_parse_retries`: retries for `call_llm_json`.
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: u32,
}

const fn default_max_concurrent_requests() -> u32 {
    10
}

const fn default_max_parse_retries() -> u32 {
    3
}

impl Default for AiConfig {
    fn default() -> Self {
        Self { max_concurrent_requests: default_max_concurrent_requests(), max_parse_retries: default_max_parse_retries() }
    }
}

/// Game-content parameters (`game.*`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameConfig {
    /// `game.sect_num`: number of sects to initialize at startup.
    #[serde(default)]
    pub sect_num: u32,
    /// `game.init_npc_num`: size of the seed agent population.
    #[serde(default)]
    pub init_npc_num: u32,
    /// `game.world_history`: free-form setting text for startup narration.
    #[serde(default)]
    pub world_history: String,
    /// `game.gathering.*_prob`: per-gathering-type trigger probabilities.
    #[serde(default)]
    pub gathering: GatheringConfig,
    /// `game.nickname.*`: nickname-eligibility event-count thresholds (§4.8).
    #[serde(default)]
    pub nickname: NicknameConfig,
    /// `game.fortune_prob`/`game.misfortune_prob`: random world-event odds (§4.7 phase 8).
    #[serde(default)]
    pub world_events: WorldEventsConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sect_num: 0,
            init_npc_num: 0,
            world_history: String::new(),
            gathering: GatheringConfig::default(),
            nickname: NicknameConfig::default(),
            world_events: WorldEventsConfig::default(),
        }
    }
}

/// Per-gathering-type trigger probabilities (`game.gathering.*_prob`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GatheringConfig {
    /// `game.gathering.sect_teaching_prob`: chance each tick an eligible sect
    /// runs a sect-teaching gathering.
    #[serde(default = "default_sect_teaching_prob")]
    pub sect_teaching_prob: f64,
    /// `game.gathering.base_epiphany_prob`: base chance a student adopts the
    /// teacher's technique during a sect-teaching gathering, before a
    /// student's own `extra_epiphany_probability` effect is added.
    #[serde(default = "default_base_epiphany_prob")]
    pub base_epiphany_prob: f64,
}

const fn default_sect_teaching_prob() -> f64 {
    0.1
}

const fn default_base_epiphany_prob() -> f64 {
    0.05
}

impl Default for GatheringConfig {
    fn default() -> Self {
        Self { sect_teaching_prob: default_sect_teaching_prob(), base_epiphany_prob: default_base_epiphany_prob() }
    }
}

/// Nickname-eligibility event-count thresholds (`game.nickname.*`, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NicknameConfig {
    /// `game.nickname.major_event_threshold`.
    #[serde(default = "default_major_event_threshold")]
    pub major_event_threshold: u32,
    /// `game.nickname.minor_event_threshold`.
    #[serde(default = "default_minor_event_threshold")]
    pub minor_event_threshold: u32,
}

const fn default_major_event_threshold() -> u32 {
    3
}

const fn default_minor_event_threshold() -> u32 {
    5
}

impl Default for NicknameConfig {
    fn default() -> Self {
        Self { major_event_threshold: default_major_event_threshold(), minor_event_threshold: default_minor_event_threshold() }
    }
}

/// Random world-event odds (`game.fortune_prob`/`game.misfortune_prob`, §4.7 phase 8).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorldEventsConfig {
    /// `game.fortune_prob`: chance an eligible agent receives a fortune this tick.
    #[serde(default = "default_fortune_prob")]
    pub fortune_prob: f64,
    /// `game.misfortune_prob`: chance an eligible agent suffers a misfortune this tick.
    #[serde(default = "default_misfortune_prob")]
    pub misfortune_prob: f64,
}

const fn default_fortune_prob() -> f64 {
    0.01
}

const fn default_misfortune_prob() -> f64 {
    0.01
}

impl Default for WorldEventsConfig {
    fn default() -> Self {
        Self { fortune_prob: default_fortune_prob(), misfortune_prob: default_misfortune_prob() }
    }
}

/// System/server settings (`system.*`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemConfig {
    /// `system.language`.
    #[serde(default)]
    pub language: String,
    /// `system.host`, overridable by `SERVER_HOST`.
    #[serde(default = "default_host")]
    pub host: String,
    /// `system.port`, overridable by `SERVER_PORT`.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { language: String::new(), host: default_host(), port: default_port() }
    }
}

/// Filesystem paths (`paths.*`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathsConfig {
    /// `paths.saves`: directory save files are written to/read from.
    #[serde(default)]
    pub saves: String,
    /// `paths.templates`: directory prompt templates are loaded from.
    #[serde(default)]
    pub templates: String,
    /// `paths.game_configs`: directory static data tables are loaded from.
    #[serde(default)]
    pub game_configs: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self { saves: String::new(), templates: String::new(), game_configs: String::new() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_sections_are_absent() {
        let config = SimulationConfig::parse("{}").expect("parses");
        assert_eq!(config.system.host, DEFAULT_HOST);
        assert_eq!(config.system.port, DEFAULT_PORT);
        assert_eq!(config.ai.max_concurrent_requests, 10);
        assert!((config.game.gathering.sect_teaching_prob - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_configured_llm_section() {
        let yaml = r#"
llm:
  base_url: "https://example.invalid"
  key: "secret"
  model_name: "big"
  fast_model_name: "small"
  mode: "fast"
"#;
        let config = SimulationConfig::parse(yaml).expect("parses");
        assert_eq!(config.llm.base_url, "https://example.invalid");
        assert_eq!(config.llm.mode, Some(CallMode::Fast));
    }

    #[test]
    fn server_host_env_override_takes_priority() {
        std::env::set_var("SERVER_HOST", "0.0.0.0");
        let config = SimulationConfig::parse("system:\n  host: \"10.0.0.1\"\n").expect("parses");
        assert_eq!(config.system.host, "0.0.0.0");
        std::env::remove_var("SERVER_HOST");
    }
}
