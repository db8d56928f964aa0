use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::optimizer::PackingConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub cli: CliConfig,
    pub optimizer: OptimizerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(env_string)
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// `lookup` returns the trimmed, non-empty value of a variable, if any.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cli: CliConfig::from_lookup(&lookup),
            optimizer: OptimizerConfig::from_lookup(&lookup),
        }
    }
}

/// How the command-line tool prints its result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable listing of bins and their items.
    #[default]
    Text,
    /// Pretty-printed JSON response.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Configuration for the command-line front end.
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    input: Option<PathBuf>,
    output_format: OutputFormat,
}

impl CliConfig {
    const INPUT_VAR: &'static str = "CUBEPACK_INPUT";
    const OUTPUT_FORMAT_VAR: &'static str = "CUBEPACK_OUTPUT_FORMAT";

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let output_format = match lookup(Self::OUTPUT_FORMAT_VAR) {
            Some(raw) => raw.parse::<OutputFormat>().unwrap_or_else(|err| {
                warn!(
                    "{} invalid: {}. Using {}.",
                    Self::OUTPUT_FORMAT_VAR,
                    err,
                    OutputFormat::default()
                );
                OutputFormat::default()
            }),
            None => OutputFormat::default(),
        };

        Self {
            input: lookup(Self::INPUT_VAR).map(PathBuf::from),
            output_format,
        }
    }

    /// Request file configured via the environment, if any.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }
}

/// Configuration for the packing heuristic.
#[derive(Clone, Debug, Default)]
pub struct OptimizerConfig {
    packing: PackingConfig,
}

impl OptimizerConfig {
    const ALLOW_ROTATION_VAR: &'static str = "CUBEPACK_ALLOW_ROTATIONS";
    const ENFORCE_WEIGHT_VAR: &'static str = "CUBEPACK_ENFORCE_WEIGHT_LIMIT";

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let allow_item_rotation = lookup(Self::ALLOW_ROTATION_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_ROTATION_VAR))
            .unwrap_or(PackingConfig::DEFAULT_ALLOW_ITEM_ROTATION);

        let enforce_weight_limit = lookup(Self::ENFORCE_WEIGHT_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ENFORCE_WEIGHT_VAR))
            .unwrap_or(PackingConfig::DEFAULT_ENFORCE_WEIGHT_LIMIT);

        let packing = PackingConfig::builder()
            .allow_item_rotation(allow_item_rotation)
            .enforce_weight_limit(enforce_weight_limit)
            .build();

        Self { packing }
    }

    /// Returns the configured PackingConfig.
    pub fn packing_config(&self) -> PackingConfig {
        self.packing
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name, other
            );
            None
        }
    }
}
