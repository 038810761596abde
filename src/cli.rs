use crate::config::AppConfigOverrides;
use anyhow::{anyhow, bail, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub requests: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub materials: Option<PathBuf>,
    pub instance: Option<String>,
    align: Option<bool>,
    show_hidden: Option<bool>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw_flag) = iter.next() {
            let flag = raw_flag.as_ref();
            if !flag.starts_with("--") {
                bail!("Unexpected argument '{flag}'. Flags take the form --name value.");
            }
            let key = &flag[2..];
            let value =
                iter.next().ok_or_else(|| anyhow!("Expected a value after '{flag}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "catalog" => overrides.catalog = Some(PathBuf::from(value)),
                "requests" => overrides.requests = Some(PathBuf::from(value)),
                "output" => overrides.output = Some(PathBuf::from(value)),
                "materials" => overrides.materials = Some(PathBuf::from(value)),
                "instance" => overrides.instance = Some(value),
                "align" => overrides.align = Some(parse_bool_flag("align", &value)?),
                "show-hidden" => overrides.show_hidden = Some(parse_bool_flag("show-hidden", &value)?),
                _ => bail!(
                    "Unknown flag '{flag}'. Supported flags: --config, --catalog, --requests, --output, \
                     --materials, --instance, --align, --show-hidden."
                ),
            }
        }
        Ok(overrides)
    }

    pub fn config_overrides(&self) -> AppConfigOverrides {
        AppConfigOverrides { align_to_surface: self.align, show_hidden_parameters: self.show_hidden }
    }
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_paths_and_switches() {
        let args = ["app", "--catalog", "assets.json", "--requests", "drops.json", "--align", "off"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.catalog, Some(PathBuf::from("assets.json")));
        assert_eq!(overrides.requests, Some(PathBuf::from("drops.json")));
        assert_eq!(overrides.config_overrides().align_to_surface, Some(false));
        assert_eq!(overrides.config_overrides().show_hidden_parameters, None);
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["app", "--align", "on", "--align", "no", "--instance", "/Game/A", "--instance", "/Game/B"];
        let overrides = CliOverrides::parse(args).expect("parse overrides");
        assert_eq!(overrides.config_overrides().align_to_surface, Some(false));
        assert_eq!(overrides.instance.as_deref(), Some("/Game/B"));
    }

    #[test]
    fn missing_value_errors() {
        let err = CliOverrides::parse(["app", "--catalog"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_bad_switches() {
        let err = CliOverrides::parse(["app", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
        let err = CliOverrides::parse(["app", "--show-hidden", "maybe"]).unwrap_err();
        assert!(err.to_string().contains("Invalid show-hidden value"));
    }
}
