use std::fmt;

use crate::catalog::Catalog;
use crate::config::CompareConfig;
use crate::error::{Incomparable, ParseFailure};
use crate::model::{CatalogEntry, MatchedProduct, PriceField, Product, Store, UnitPrice};
use crate::reconcile::reconcile;
use crate::similarity::SimilarityIndex;
use crate::unit_price::parse_unit_price;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub similarity_threshold: f64,
    pub print_diagnostics: bool,
    pub store_a_field: PriceField,
    pub store_b_field: PriceField,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions::from(&CompareConfig::default())
    }
}

impl From<&CompareConfig> for MatchOptions {
    fn from(config: &CompareConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            print_diagnostics: config.print_diagnostics,
            store_a_field: config.stores.woolworths.price_field,
            store_b_field: config.stores.coles.price_field,
        }
    }
}

impl MatchOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

/// Why a candidate pair above the threshold was not emitted.
#[derive(Debug, Clone, PartialEq)]
enum Skip {
    OnSpecial,
    MissingPrice(Store),
    Unparseable(Store, ParseFailure),
    Incomparable(Incomparable),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnSpecial => write!(f, "candidate on special"),
            Self::MissingPrice(store) => write!(f, "{store}: no unit price"),
            Self::Unparseable(store, e) => write!(f, "{store}: {e}"),
            Self::Incomparable(e) => write!(f, "incomparable: {e}"),
        }
    }
}

/// Match every store A product against every store B product.
///
/// Greedy and many-to-many: each store A product may pair with any number of
/// store B candidates whose name similarity is strictly above the threshold.
/// No global assignment is attempted. Candidates on special, unparseable or
/// missing unit prices, and quantities that cannot be reconciled are skipped.
/// Output follows store A catalog order, then store B catalog order.
pub fn match_catalogs(store_a: &Catalog, store_b: &Catalog, options: &MatchOptions) -> Vec<MatchedProduct> {
    let candidates = store_b.names();
    let index = SimilarityIndex::new(candidates.as_slice());
    let subjects: Vec<(&str, &CatalogEntry)> = store_a.iter().collect();

    let per_subject = |(name, entry): &(&str, &CatalogEntry)| {
        match_subject(name, entry, store_a.store(), store_b, &candidates, &index, options)
    };

    #[cfg(feature = "parallel")]
    let grouped: Vec<Vec<MatchedProduct>> = {
        use rayon::prelude::*;
        subjects.par_iter().map(per_subject).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let grouped: Vec<Vec<MatchedProduct>> = subjects.iter().map(per_subject).collect();

    let matches: Vec<MatchedProduct> = grouped.into_iter().flatten().collect();
    log::debug!(
        "matched {} pair(s) from {} x {} products at threshold {}",
        matches.len(),
        store_a.len(),
        store_b.len(),
        options.similarity_threshold
    );
    matches
}

fn match_subject(
    name: &str,
    entry: &CatalogEntry,
    store: Store,
    store_b: &Catalog,
    candidates: &[&str],
    index: &SimilarityIndex,
    options: &MatchOptions,
) -> Vec<MatchedProduct> {
    let scores = index.score(name);
    let subject_price = unit_price_of(entry, options.store_a_field, store);
    let mut matched = Vec::new();

    for (candidate, similarity) in candidates.iter().zip(scores) {
        if similarity <= options.similarity_threshold {
            continue;
        }
        let Some(candidate_entry) = store_b.get(candidate) else {
            continue;
        };

        let outcome = subject_price.clone().and_then(|a| {
            pair(name, a, candidate, candidate_entry, store, store_b.store(), similarity, options)
        });

        match outcome {
            Ok(m) => {
                if options.print_diagnostics {
                    log::info!(
                        "similarity {:.3} | {store}: {name} ({}) | {}: {candidate} ({}) | difference {:.2}",
                        similarity,
                        m.store_a().unit_price,
                        store_b.store(),
                        m.store_b().unit_price,
                        m.difference()
                    );
                }
                matched.push(m);
            }
            Err(skip) => {
                if options.print_diagnostics {
                    log::info!("similarity {similarity:.3} | {name} / {candidate} | skipped: {skip}");
                } else {
                    log::debug!("skip {name} / {candidate}: {skip}");
                }
            }
        }
    }

    matched
}

#[allow(clippy::too_many_arguments)]
fn pair(
    name: &str,
    subject_price: UnitPrice,
    candidate: &str,
    candidate_entry: &CatalogEntry,
    store_a: Store,
    store_b: Store,
    similarity: f64,
    options: &MatchOptions,
) -> Result<MatchedProduct, Skip> {
    if candidate_entry.on_special {
        return Err(Skip::OnSpecial);
    }
    let candidate_price = unit_price_of(candidate_entry, options.store_b_field, store_b)?;
    let (a, b) = reconcile(&subject_price, &candidate_price).map_err(Skip::Incomparable)?;

    MatchedProduct::new(
        Product {
            name: name.to_string(),
            store: store_a,
            unit_price: a,
        },
        Product {
            name: candidate.to_string(),
            store: store_b,
            unit_price: b,
        },
        similarity,
    )
    .map_err(Skip::Incomparable)
}

fn unit_price_of(entry: &CatalogEntry, field: PriceField, store: Store) -> Result<UnitPrice, Skip> {
    let raw = entry.price_text(field).ok_or(Skip::MissingPrice(store))?;
    parse_unit_price(raw).map_err(|e| Skip::Unparseable(store, e))
}
