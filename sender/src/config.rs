use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use config::{Config, File, FileFormat, Source, ValueKind};
use serde::Deserialize;
use tracing::{info, warn};

use crate::connection::ConnectionString;

pub const DEFAULT_CONFIG_PATH: &str = "./sender.config.json";
pub const DEFAULT_COUNT: u32 = 5;

/// Values read from `sender.config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub count: u32,
    pub msgprefix: String,
    pub queue_name: String,
    pub connection_string: String,
}

/// On-disk shape. Absent keys keep their defaults; `count` is checked after parsing.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawFileConfig {
    count: i64,
    msgprefix: String,
    #[serde(rename = "queueName", alias = "queuename")]
    queue_name: String,
    #[serde(rename = "connectionString", alias = "connectionstring")]
    connection_string: String,
}

impl Default for RawFileConfig {
    fn default() -> Self {
        let d = FileConfig::default();
        Self {
            count: i64::from(d.count),
            msgprefix: d.msgprefix,
            queue_name: d.queue_name,
            connection_string: d.connection_string,
        }
    }
}

impl TryFrom<RawFileConfig> for FileConfig {
    type Error = anyhow::Error;

    fn try_from(raw: RawFileConfig) -> Result<Self> {
        let count = u32::try_from(raw.count)
            .map_err(|_| anyhow!("count must be between 0 and {}, got {}", u32::MAX, raw.count))?;
        Ok(Self {
            count,
            msgprefix: raw.msgprefix,
            queue_name: raw.queue_name,
            connection_string: raw.connection_string,
        })
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            msgprefix: String::new(),
            queue_name: String::new(),
            connection_string: String::new(),
        }
    }
}

impl FileConfig {
    /// Read the JSON file at `path`, falling back to defaults (with a warning)
    /// when it is missing or cannot be used.
    pub fn load(path: &str) -> Self {
        if !Path::new(path).exists() {
            warn!("Config file not found at '{}'; using defaults.", path);
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(cfg) => {
                info!(path, "loaded config file");
                cfg
            }
            Err(e) => {
                warn!("Failed to read config file '{}': {:#}; using defaults.", path, e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::new(path, FileFormat::Json))
            .build()
            .with_context(|| format!("reading {path}"))?;
        check_kinds(&cfg)?;
        let raw: RawFileConfig = cfg
            .try_deserialize()
            .context("deserializing sender config")?;
        raw.try_into()
    }
}

/// Reject values the `config` crate would otherwise coerce (`5.5`, `true`, `"7"` as a count).
fn check_kinds(cfg: &Config) -> Result<()> {
    let table = cfg.collect().context("reading config table")?;
    for (key, value) in &table {
        let ok = match key.to_ascii_lowercase().as_str() {
            "count" => matches!(
                value.kind,
                ValueKind::I64(_) | ValueKind::I128(_) | ValueKind::U64(_) | ValueKind::U128(_)
            ),
            "msgprefix" | "queuename" | "connectionstring" => {
                matches!(value.kind, ValueKind::String(_))
            }
            _ => true,
        };
        if !ok {
            return Err(anyhow!("'{}' has the wrong type: {:?}", key, value.kind));
        }
    }
    Ok(())
}

/// Values supplied on the command line; `None` leaves the file value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub count: Option<u32>,
    pub prefix: Option<String>,
    pub queue_name: Option<String>,
    pub connection_string: Option<String>,
}

/// Effective configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub count: u32,
    pub prefix: String,
    pub queue_name: String,
    pub connection_string: String,
}

impl Settings {
    /// File values, each replaced by its flag when one was given.
    pub fn merge(file: FileConfig, overrides: &Overrides) -> Self {
        Self {
            count: overrides.count.unwrap_or(file.count),
            prefix: overrides.prefix.clone().unwrap_or(file.msgprefix),
            queue_name: overrides.queue_name.clone().unwrap_or(file.queue_name),
            connection_string: overrides
                .connection_string
                .clone()
                .unwrap_or(file.connection_string),
        }
    }

    pub fn has_connection(&self) -> bool {
        !self.connection_string.trim().is_empty()
    }

    pub fn require_queue_name(&self) -> Result<&str> {
        if self.queue_name.trim().is_empty() {
            return Err(anyhow!(
                "Queue name is required. Pass -n/--name or set \"queueName\" in the config file."
            ));
        }
        Ok(&self.queue_name)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conn = ConnectionString::parse(&self.connection_string)
            .map(|c| c.redacted())
            .unwrap_or_else(|_| "<unparsable>".to_string());
        writeln!(f, "{:<20}: {}", "count", self.count)?;
        writeln!(f, "{:<20}: {}", "msgprefix", self.prefix)?;
        writeln!(f, "{:<20}: {}", "queueName", self.queue_name)?;
        write!(f, "{:<20}: {}", "connectionString", conn)
    }
}
