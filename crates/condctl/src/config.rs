//! # CLI Configuration
//!
//! Settings read from environment variables, overridable by flags.

use clap::ValueEnum;

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "condctl=info,conditions=info";

/// Output encoding of printed documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// CLI configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Output format (`CONDCTL_OUTPUT`)
    pub output: OutputFormat,
    /// Path of the condition set document (`CONDCTL_CONDITION_SET`)
    /// When unset, the living set without dependents is used
    pub condition_set: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            output: env_var_or_default("CONDCTL_OUTPUT", OutputFormat::default()),
            condition_set: std::env::var("CONDCTL_CONDITION_SET")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("YAML".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert_eq!("yml".parse::<OutputFormat>(), Ok(OutputFormat::Yaml));
        assert!("toml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_missing_env_var_uses_default() {
        let value = env_var_or_default("CONDCTL_TEST_SURELY_UNSET_VARIABLE", 7_u16);
        assert_eq!(value, 7);
    }
}
