use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::core::{CostDimension, QuarterDef, QuarterMapping};
use crate::error::AppError;

pub(crate) const ENV_ACCESS_KEY_ID: &str = "LOCOSTATS_ACCESS_KEY_ID";
pub(crate) const ENV_ACCESS_KEY_SECRET: &str = "LOCOSTATS_ACCESS_KEY_SECRET";

const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigSortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ConfigColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub(crate) struct DimensionConfig {
    pub(crate) label: String,
    pub(crate) field: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    #[serde(default)]
    pub(crate) account_id: Option<String>,
    #[serde(default)]
    pub(crate) form_id: Option<String>,
    #[serde(default)]
    pub(crate) service_event_form_id: Option<String>,
    #[serde(default)]
    pub(crate) wheelset_form_id: Option<String>,
    #[serde(default)]
    pub(crate) page_size: Option<u32>,
    #[serde(default)]
    pub(crate) max_pages: Option<u32>,
    #[serde(default)]
    pub(crate) access_key_id: Option<String>,
    #[serde(default)]
    pub(crate) access_key_secret: Option<String>,
    #[serde(default)]
    pub(crate) currency: Option<String>,
    #[serde(default)]
    pub(crate) decimal_comma: Option<bool>,
    #[serde(default)]
    pub(crate) breakdown: bool,
    #[serde(default)]
    pub(crate) debug: bool,
    #[serde(default)]
    pub(crate) order: Option<ConfigSortOrder>,
    #[serde(default)]
    pub(crate) color: Option<ConfigColorMode>,
    #[serde(default)]
    pub(crate) timezone: Option<String>,
    /// Quarter name -> month names, in declaration order
    #[serde(default)]
    pub(crate) quarters: toml::Table,
    #[serde(default)]
    pub(crate) dimensions: Vec<DimensionConfig>,
    /// File this config was read from
    #[serde(skip)]
    pub(crate) source: Option<PathBuf>,
}

impl Config {
    pub(crate) fn load() -> Self {
        // Try config locations in order of priority
        for path in Self::get_config_paths() {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match Self::parse(&content) {
                    Ok(mut config) => {
                        config.source = Some(path);
                        return config;
                    }
                    Err(e) => {
                        // Logging is not initialized yet
                        eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::default()
    }

    pub(crate) fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content)
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/locostats/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("locostats").join("config.toml"));
        }

        // 2. Platform config dir (e.g. ~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("locostats").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.locostats.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".locostats.toml"));
        }

        paths
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Access key id, environment first
    pub(crate) fn access_key_id(&self) -> Option<String> {
        std::env::var(ENV_ACCESS_KEY_ID)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.access_key_id.clone())
    }

    pub(crate) fn access_key_secret(&self) -> Option<String> {
        std::env::var(ENV_ACCESS_KEY_SECRET)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.access_key_secret.clone())
    }

    /// Configured quarter table, or calendar quarters when none is set
    pub(crate) fn quarter_mapping(&self) -> Result<QuarterMapping, AppError> {
        if self.quarters.is_empty() {
            return Ok(QuarterMapping::standard());
        }
        let quarters = self
            .quarters
            .iter()
            .map(|(name, months)| {
                let months = months
                    .as_array()
                    .and_then(|list| {
                        list.iter()
                            .map(|m| m.as_str().map(str::to_string))
                            .collect::<Option<Vec<_>>>()
                    })
                    .ok_or_else(|| AppError::InvalidQuarterMapping {
                        reason: format!("quarter {name} must be a list of month names"),
                    })?;
                Ok(QuarterDef {
                    name: name.clone(),
                    months,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        let mapping = QuarterMapping::new(quarters);
        mapping.validate()?;
        Ok(mapping)
    }

    pub(crate) fn cost_dimensions(&self) -> Vec<CostDimension> {
        if self.dimensions.is_empty() {
            return CostDimension::standard();
        }
        self.dimensions
            .iter()
            .map(|d| CostDimension::new(d.label.clone(), d.field.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_paths_are_locostats() {
        let paths = Config::get_config_paths();
        assert!(!paths.is_empty());
        for p in &paths {
            assert!(p.to_string_lossy().contains("locostats"));
        }
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.page_size(), 100);
        assert_eq!(config.quarter_mapping().unwrap(), QuarterMapping::standard());
        assert_eq!(config.cost_dimensions(), CostDimension::standard());
        assert!(config.decimal_comma.is_none());
    }

    #[test]
    fn full_config_parses() {
        let config = Config::parse(
            r#"
            base_url = "https://forms.example.test"
            account_id = "Acc1"
            form_id = "Maintenance_A00"
            service_event_form_id = "Service_A00"
            wheelset_form_id = "Wheelset_A00"
            page_size = 50
            max_pages = 20
            currency = "CHF"
            decimal_comma = false
            order = "desc"
            color = "never"
            timezone = "Europe/Berlin"
            breakdown = true

            [[dimensions]]
            label = "Budget"
            field = "Total_Budget"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://forms.example.test"));
        assert_eq!(config.wheelset_form_id.as_deref(), Some("Wheelset_A00"));
        assert_eq!(config.page_size(), 50);
        assert_eq!(config.max_pages, Some(20));
        assert_eq!(config.order, Some(ConfigSortOrder::Desc));
        assert_eq!(config.color, Some(ConfigColorMode::Never));
        assert_eq!(config.decimal_comma, Some(false));
        assert!(config.breakdown);
        assert_eq!(
            config.cost_dimensions(),
            vec![CostDimension::new("Budget", "Total_Budget")]
        );
    }

    #[test]
    fn custom_quarters() {
        let config = Config::parse(
            r#"
            [quarters]
            H1 = ["January", "February", "March", "April", "May", "June"]
            H2 = ["July", "August", "September", "October", "November", "December"]
            "#,
        )
        .unwrap();
        let mapping = config.quarter_mapping().unwrap();
        assert_eq!(mapping.quarters().len(), 2);
        assert_eq!(mapping.quarter_of("May"), Some("H1"));
        assert_eq!(mapping.quarter_of("December"), Some("H2"));
    }

    #[test]
    fn quarters_keep_declaration_order() {
        let config = Config::parse(
            r#"
            [quarters]
            Winter = ["December", "January", "February"]
            Spring = ["March", "April", "May"]
            Summer = ["June", "July", "August"]
            Autumn = ["September", "October", "November"]
            "#,
        )
        .unwrap();
        let mapping = config.quarter_mapping().unwrap();
        let names: Vec<&str> = mapping.quarters().iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, ["Winter", "Spring", "Summer", "Autumn"]);
        assert_eq!(mapping.quarter_of("January"), Some("Winter"));
    }

    #[test]
    fn quarter_months_must_be_strings() {
        let config = Config::parse(
            r#"
            [quarters]
            Q1 = "January"
            "#,
        )
        .unwrap();
        let err = config.quarter_mapping().unwrap_err();
        assert!(err.to_string().contains("list of month names"));

        let config = Config::parse("quarters = { Q1 = [1, 2, 3] }").unwrap();
        assert!(config.quarter_mapping().is_err());
    }

    #[test]
    fn incomplete_quarters_rejected() {
        let config = Config::parse(
            r#"
            [quarters]
            Q1 = ["January", "February", "March"]
            "#,
        )
        .unwrap();
        let err = config.quarter_mapping().unwrap_err();
        assert!(err.to_string().contains("not mapped"));
    }

    #[test]
    fn bad_order_value_is_parse_error() {
        assert!(Config::parse(r#"order = "sideways""#).is_err());
    }
}
