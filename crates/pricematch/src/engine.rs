use crate::catalog::Catalog;
use crate::config::CompareConfig;
use crate::error::CompareError;
use crate::matcher::{match_catalogs, MatchOptions};
use crate::model::{ComparisonReport, RunMeta};
use crate::stats::{compare, price_profile};

/// Run a full comparison per config: match, test, profile.
///
/// Too few matches for a t-test is not a failure of the run; it is reported
/// in `summary_error` and `summary` is left empty.
pub fn run(
    config: &CompareConfig,
    store_a: &Catalog,
    store_b: &Catalog,
) -> Result<ComparisonReport, CompareError> {
    config.validate()?;

    let options = MatchOptions::from(config);
    let matches = match_catalogs(store_a, store_b, &options);

    let (summary, summary_error) = match compare(&matches, config.significance_level) {
        Ok(summary) => {
            log::info!(
                "{} matched products, total difference {:.2}, p = {:.4} ({})",
                summary.count,
                summary.total_difference,
                summary.p_value,
                summary.verdict
            );
            (Some(summary), None)
        }
        Err(e @ CompareError::InsufficientSample { .. }) => {
            log::warn!("{e}");
            (None, Some(e.to_string()))
        }
        Err(e) => return Err(e),
    };

    let profiles = vec![
        price_profile(store_a, config.stores.woolworths.profile_field),
        price_profile(store_b, config.stores.coles.profile_field),
    ];

    Ok(ComparisonReport {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            similarity_threshold: config.similarity_threshold,
            store_a_products: store_a.len(),
            store_b_products: store_b.len(),
        },
        matches,
        summary,
        summary_error,
        profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogEntry, Store};

    #[test]
    fn rejects_invalid_config() {
        let config = CompareConfig {
            similarity_threshold: -0.1,
            ..CompareConfig::default()
        };
        let a = Catalog::new(Store::Woolworths);
        let b = Catalog::new(Store::Coles);
        assert!(matches!(run(&config, &a, &b), Err(CompareError::ConfigValidation(_))));
    }

    #[test]
    fn insufficient_sample_is_reported() {
        let a = Catalog::from_entries(
            Store::Woolworths,
            vec![CatalogEntry::new("Brown Onions").with_unit_price("$3 per 1kg")],
        );
        let b = Catalog::from_entries(
            Store::Coles,
            vec![CatalogEntry::new("Brown Onions").with_price("$3.50 per 1kg")],
        );
        let report = run(&CompareConfig::default(), &a, &b).unwrap();
        assert_eq!(report.matches.len(), 1);
        assert!(report.summary.is_none());
        assert!(report.summary_error.unwrap().contains("insufficient sample"));
        assert_eq!(report.meta.store_a_products, 1);
        assert_eq!(report.profiles.len(), 2);
    }

    #[test]
    fn store_a_profiled_from_shelf_price() {
        let a = Catalog::from_entries(
            Store::Woolworths,
            vec![
                CatalogEntry::new("Brown Onions")
                    .with_price("3.00")
                    .with_unit_price("$3.00 / 1KG"),
                CatalogEntry::new("Carrots Loose")
                    .with_price("2.20")
                    .with_unit_price("$2.20 / 1KG"),
                CatalogEntry::new("Lurpak Butter 250g")
                    .with_price("6.00")
                    .with_unit_price("$2.40 / 100G"),
            ],
        );
        let b = Catalog::new(Store::Coles);
        let report = run(&CompareConfig::default(), &a, &b).unwrap();
        let profile = &report.profiles[0];
        assert_eq!(profile.count, 3);
        assert_eq!(profile.median, Some(3.0));
        assert!((profile.mean.unwrap() - 11.2 / 3.0).abs() < 1e-9);
    }
}
