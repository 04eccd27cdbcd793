//! Application configuration. Store location, user, week start and timezone.

use chrono::Weekday;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

/// Default directory holding `study.db`.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// First day of week when none (or an invalid one) is configured.
pub const DEFAULT_FIRST_DAY_OF_WEEK: Weekday = Weekday::Mon;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for the SQLite database. Read from STUDY_PULSE_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// JSON snapshot to read instead of SQLite. Read from STUDY_PULSE_SNAPSHOT_PATH.
    #[serde(default)]
    pub snapshot_path: Option<String>,

    /// User whose dashboard is shown; prompts when unset. Read from STUDY_PULSE_USER_ID.
    #[serde(default)]
    pub user_id: Option<i64>,

    /// Weekday name ("monday", "sun", ...). Read from STUDY_PULSE_FIRST_DAY_OF_WEEK.
    #[serde(default)]
    pub first_day_of_week: Option<String>,

    /// IANA zone name ("Europe/Berlin"). Host local zone when unset. Read from STUDY_PULSE_TIMEZONE.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("STUDY_PULSE").try_parsing(true));
        if let Ok(path) = std::env::var("STUDY_PULSE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Returns the data directory. Defaults to `./data`.
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    /// Returns the configured first day of week. Defaults to Monday if unset or invalid.
    pub fn first_day_of_week_or_default(&self) -> Weekday {
        match self.first_day_of_week.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_FIRST_DAY_OF_WEEK,
            Some(raw) => raw.parse::<Weekday>().unwrap_or_else(|_| {
                warn!(value = raw, "invalid first_day_of_week; using Monday");
                DEFAULT_FIRST_DAY_OF_WEEK
            }),
        }
    }

    /// Returns the configured named timezone, or `None` to use the host's local zone.
    /// An unknown name is logged and treated as unset.
    pub fn timezone(&self) -> Option<Tz> {
        let raw = self.timezone.as_deref().map(str::trim)?;
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                warn!(value = raw, "unknown timezone; using local time");
                None
            }
        }
    }

    /// Returns true if a JSON snapshot should be used instead of SQLite.
    pub fn uses_snapshot(&self) -> bool {
        self.snapshot_path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}
