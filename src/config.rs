use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("olrecord/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub base_url:     String,
    pub timeout_secs: u64,
    pub user_agent:   String,
}

impl Config {
    pub fn default_as_string() -> Result<String> {
        Ok(toml::to_string(&Self::default())?)
    }

    /// Defaults, overridden by `olrecord.toml`, overridden by `OLRECORD_*` variables.
    pub fn read_config() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("olrecord.toml"))
            .merge(Env::prefixed("OLRECORD_"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url:     DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent:   DEFAULT_USER_AGENT.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let s = Config::default_as_string().unwrap();
        assert!(s.contains("base_url = \"https://openlibrary.org\""));
        assert!(s.contains("timeout_secs = 10"));
        let parsed: Config = toml::from_str(&s).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string("timeout_secs = 3"))
            .extract()
            .unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
