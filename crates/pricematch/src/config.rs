use serde::Deserialize;

use crate::error::CompareError;
use crate::model::PriceField;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CompareConfig {
    /// Minimum name similarity (exclusive) for a candidate pair.
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    /// Log one diagnostic line per examined pair. Never changes results.
    #[serde(default)]
    pub print_diagnostics: bool,
    /// p-value below which the price difference is called significant.
    #[serde(default = "default_significance")]
    pub significance_level: f64,
    #[serde(default)]
    pub stores: StoresConfig,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_threshold(),
            print_diagnostics: false,
            significance_level: default_significance(),
            stores: StoresConfig::default(),
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

fn default_significance() -> f64 {
    0.05
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct StoresConfig {
    #[serde(default = "woolworths_default")]
    pub woolworths: StoreConfig,
    #[serde(default = "coles_default")]
    pub coles: StoreConfig,
}

impl Default for StoresConfig {
    fn default() -> Self {
        Self {
            woolworths: woolworths_default(),
            coles: coles_default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Record field holding the `"$x per y"` unit-price string.
    pub price_field: PriceField,
    /// Record field read for the whole-catalog price profile.
    #[serde(default = "default_profile_field")]
    pub profile_field: PriceField,
}

// Woolworths publishes a separate unit-price field; Coles folds it into `price`.
fn woolworths_default() -> StoreConfig {
    StoreConfig {
        price_field: PriceField::UnitPrice,
        profile_field: default_profile_field(),
    }
}

fn coles_default() -> StoreConfig {
    StoreConfig {
        price_field: PriceField::Price,
        profile_field: default_profile_field(),
    }
}

fn default_profile_field() -> PriceField {
    PriceField::Price
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl CompareConfig {
    pub fn from_toml(input: &str) -> Result<Self, CompareError> {
        let config: CompareConfig =
            toml::from_str(input).map_err(|e| CompareError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(CompareError::ConfigValidation(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }

        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(CompareError::ConfigValidation(format!(
                "significance_level must be within (0, 1), got {}",
                self.significance_level
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = CompareConfig::from_toml("").unwrap();
        assert_eq!(config.similarity_threshold, 0.5);
        assert!(!config.print_diagnostics);
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.stores.woolworths.price_field, PriceField::UnitPrice);
        assert_eq!(config.stores.coles.price_field, PriceField::Price);
        assert_eq!(config.stores.woolworths.profile_field, PriceField::Price);
        assert_eq!(config.stores.coles.profile_field, PriceField::Price);
    }

    #[test]
    fn parse_full() {
        let input = r#"
similarity_threshold = 0.7
print_diagnostics = true
significance_level = 0.01

[stores.woolworths]
price_field = "price"
profile_field = "unit_price"

[stores.coles]
price_field = "unit_price"
"#;
        let config = CompareConfig::from_toml(input).unwrap();
        assert_eq!(config.stores.woolworths.profile_field, PriceField::UnitPrice);
        assert_eq!(config.stores.coles.profile_field, PriceField::Price);
        assert_eq!(config.similarity_threshold, 0.7);
        assert!(config.print_diagnostics);
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.stores.woolworths.price_field, PriceField::Price);
        assert_eq!(config.stores.coles.price_field, PriceField::UnitPrice);
    }

    #[test]
    fn one_store_overridden() {
        let input = r#"
[stores.coles]
price_field = "unit_price"
"#;
        let config = CompareConfig::from_toml(input).unwrap();
        assert_eq!(config.stores.woolworths.price_field, PriceField::UnitPrice);
        assert_eq!(config.stores.coles.price_field, PriceField::UnitPrice);
    }

    #[test]
    fn reject_threshold_out_of_range() {
        let err = CompareConfig::from_toml("similarity_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("similarity_threshold"));
    }

    #[test]
    fn reject_bad_significance() {
        let err = CompareConfig::from_toml("significance_level = 0.0").unwrap_err();
        assert!(matches!(err, CompareError::ConfigValidation(_)));
    }

    #[test]
    fn reject_unknown_price_field() {
        let input = r#"
[stores.coles]
price_field = "cost"
"#;
        let err = CompareConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, CompareError::ConfigParse(_)));
    }
}
