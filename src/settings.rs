use crate::chat::session::Timings;
use figment::{
    providers::{Env, Format, Json, Serialized},
    Figment,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use snafu::{ensure, Snafu};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_AGENT_NAME: &str = "AI Agent";
pub const SETTINGS_DIRECTORY_NAME: &str = "mockchat";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "MOCKCHAT_";
const AGENT_NAME_KEY: &str = "agent_name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub agent_name: String,
    pub typing_delay_min_ms: u64,
    pub typing_delay_max_ms: u64,
    pub user_sent_ms: u64,
    pub user_delivered_ms: u64,
    pub agent_delivered_ms: u64,
    pub agent_read_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            typing_delay_min_ms: 1000,
            typing_delay_max_ms: 2500,
            user_sent_ms: 300,
            user_delivered_ms: 600,
            agent_delivered_ms: 500,
            agent_read_ms: 1000,
            seed: None,
        }
    }
}

impl Settings {
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".mockchat"))
            .join(SETTINGS_FILE_NAME)
    }

    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::default_config_path())
    }

    /// Defaults, then the JSON file at `path` if present, then `MOCKCHAT_*`
    /// environment variables.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if path.exists() {
            figment = figment.merge(Json::file(path));
        } else {
            tracing::info!("settings file not found at {:?}, using defaults", path);
        }
        Self::extract(Self::merge_env(figment))
    }

    /// Env values are parsed as typed, so the name is read raw to keep
    /// `MOCKCHAT_AGENT_NAME=007` a string.
    fn merge_env(figment: Figment) -> Figment {
        let figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&[AGENT_NAME_KEY]));
        match Env::var(&format!("{ENV_PREFIX}{}", AGENT_NAME_KEY.to_uppercase())) {
            Some(name) => figment.merge(Serialized::default(AGENT_NAME_KEY, name)),
            None => figment,
        }
    }

    fn extract(figment: Figment) -> Result<Self, SettingsError> {
        let settings = match figment.extract::<Settings>() {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!("failed to parse settings: {}. using defaults", error);
                Settings::default()
            }
        };
        settings.normalized().validated()
    }

    fn normalized(mut self) -> Self {
        self.agent_name = self.agent_name.trim().to_string();
        if self.agent_name.is_empty() {
            self.agent_name = DEFAULT_AGENT_NAME.to_string();
        }
        self
    }

    fn validated(self) -> Result<Self, SettingsError> {
        ensure!(
            self.typing_delay_min_ms < self.typing_delay_max_ms,
            EmptyTypingRangeSnafu {
                min_ms: self.typing_delay_min_ms,
                max_ms: self.typing_delay_max_ms,
            }
        );
        ensure!(
            self.user_sent_ms < self.user_delivered_ms,
            StageOrderSnafu {
                earlier: "user_sent_ms",
                earlier_ms: self.user_sent_ms,
                later: "user_delivered_ms",
                later_ms: self.user_delivered_ms,
            }
        );
        ensure!(
            self.agent_delivered_ms < self.agent_read_ms,
            StageOrderSnafu {
                earlier: "agent_delivered_ms",
                earlier_ms: self.agent_delivered_ms,
                later: "agent_read_ms",
                later_ms: self.agent_read_ms,
            }
        );
        Ok(self)
    }

    pub fn timings(&self) -> Timings {
        Timings {
            typing_delay: Duration::from_millis(self.typing_delay_min_ms)
                ..Duration::from_millis(self.typing_delay_max_ms),
            user_sent: Duration::from_millis(self.user_sent_ms),
            user_delivered: Duration::from_millis(self.user_delivered_ms),
            agent_delivered: Duration::from_millis(self.agent_delivered_ms),
            agent_read: Duration::from_millis(self.agent_read_ms),
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SettingsError {
    #[snafu(display("typing delay range {min_ms}..{max_ms} ms is empty"))]
    EmptyTypingRange { min_ms: u64, max_ms: u64 },
    #[snafu(display("{earlier} ({earlier_ms} ms) must be shorter than {later} ({later_ms} ms)"))]
    StageOrder {
        earlier: &'static str,
        earlier_ms: u64,
        later: &'static str,
        later_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::{Settings, SettingsError, DEFAULT_AGENT_NAME};
    use crate::chat::session::Timings;
    use figment::providers::{Format, Json, Serialized};
    use figment::{Figment, Jail};
    use rand::Rng;
    use std::path::Path;

    fn from_json(json: &str) -> Result<Settings, SettingsError> {
        Settings::extract(Figment::from(Serialized::defaults(Settings::default())).merge(Json::string(json)))
    }

    #[test]
    fn defaults_match_builtin_timings() {
        let settings = Settings::default();
        assert_eq!(settings.timings(), Timings::default());
        assert_eq!(settings.agent_name, DEFAULT_AGENT_NAME);
    }

    fn load_in(jail: &Jail, file: &str) -> figment::error::Result<Settings> {
        Settings::load_from(&jail.directory().join(file)).map_err(|error| error.to_string().into())
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{ "agent_name": "Support Bot", "seed": 9 }"#)?;

            let settings = load_in(jail, "settings.json")?;
            assert_eq!(settings.agent_name, "Support Bot");
            assert_eq!(settings.seed, Some(9));
            assert_eq!(settings.user_sent_ms, 300);
            assert_eq!(settings.typing_delay_max_ms, 2500);
            Ok(())
        });
    }

    #[test]
    fn missing_file_uses_defaults() {
        Jail::expect_with(|jail| {
            assert!(!Path::new("settings.json").exists());
            let settings = load_in(jail, "settings.json")?;
            assert_eq!(settings, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "settings.json",
                r#"{ "agent_name": "Support Bot", "seed": 9, "user_sent_ms": 200 }"#,
            )?;
            jail.set_env("MOCKCHAT_SEED", 5);
            jail.set_env("MOCKCHAT_AGENT_NAME", "Night Shift");

            let settings = load_in(jail, "settings.json")?;
            assert_eq!(settings.agent_name, "Night Shift");
            assert_eq!(settings.seed, Some(5));
            assert_eq!(settings.user_sent_ms, 200);
            Ok(())
        });
    }

    #[test]
    fn numeric_agent_name_keeps_the_rest_of_the_environment() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.json", r#"{ "user_sent_ms": 200 }"#)?;
            jail.set_env("MOCKCHAT_AGENT_NAME", "007");
            jail.set_env("MOCKCHAT_SEED", 5);

            let settings = load_in(jail, "settings.json")?;
            assert_eq!(settings.agent_name, "007");
            assert_eq!(settings.seed, Some(5));
            assert_eq!(settings.user_sent_ms, 200);

            jail.set_env("MOCKCHAT_AGENT_NAME", "42");
            assert_eq!(load_in(jail, "settings.json")?.agent_name, "42");
            Ok(())
        });
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let settings = from_json("{ not json").expect("defaults should validate");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn blank_agent_name_uses_default() {
        let settings = from_json(r#"{ "agent_name": "   " }"#).expect("settings should load");
        assert_eq!(settings.agent_name, DEFAULT_AGENT_NAME);
    }

    #[test]
    fn empty_typing_range_is_rejected() {
        let error = from_json(r#"{ "typing_delay_min_ms": 2000, "typing_delay_max_ms": 2000 }"#)
            .expect_err("empty range should fail");
        assert!(matches!(error, SettingsError::EmptyTypingRange { .. }));
        assert!(error.to_string().contains("2000..2000"));
    }

    #[test]
    fn out_of_order_stages_are_rejected() {
        let error = from_json(r#"{ "agent_delivered_ms": 1200, "agent_read_ms": 1000 }"#)
            .expect_err("read before delivered should fail");
        assert!(error.to_string().contains("agent_delivered_ms"));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let settings = Settings {
            seed: Some(17),
            ..Settings::default()
        };
        let a: u64 = settings.rng().gen();
        let b: u64 = settings.rng().gen();
        assert_eq!(a, b);
    }
}
