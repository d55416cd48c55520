use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Incomparable;

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// The two chains being compared. Woolworths is store A (subject side),
/// Coles is store B (candidate side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    Woolworths,
    Coles,
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Woolworths => write!(f, "Woolworths"),
            Self::Coles => write!(f, "Coles"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// A single scraped record, as handed over by the scraping layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default, alias = "unitPrice")]
    pub unit_price: Option<String>,
    #[serde(
        default,
        alias = "special",
        alias = "onSpecial",
        deserialize_with = "deserialize_flag"
    )]
    pub on_special: bool,
}

impl CatalogEntry {
    pub fn new(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_price(mut self, price: &str) -> Self {
        self.price = Some(price.to_string());
        self
    }

    pub fn with_unit_price(mut self, unit_price: &str) -> Self {
        self.unit_price = Some(unit_price.to_string());
        self
    }

    pub fn on_special(mut self, on_special: bool) -> Self {
        self.on_special = on_special;
        self
    }

    /// The raw string held in `field`, if present.
    pub fn price_text(&self, field: PriceField) -> Option<&str> {
        match field {
            PriceField::Price => self.price.as_deref(),
            PriceField::UnitPrice => self.unit_price.as_deref(),
        }
    }
}

/// Which record field carries a store's unit-price string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Price,
    UnitPrice,
}

/// Scrapers emit the special flag as a bool or as "True"/"False" strings.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        Some(Flag::Number(n)) => n != 0,
        None => false,
    })
}

// ---------------------------------------------------------------------------
// Normalized pricing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kilogram,
    Gram,
    Each,
    Unknown,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kilogram => write!(f, "kg"),
            Self::Gram => write!(f, "g"),
            Self::Each => write!(f, "each"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Serializes as a number, or `null` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Known(f64),
    Unknown,
}

impl Quantity {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Known(q) => Some(*q),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(q) => write!(f, "{q}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Price for `quantity` of `unit`, e.g. $5 per 1 kg.
///
/// `price >= 0`, and `quantity` is a positive `Known` value whenever
/// `unit != Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitPrice {
    pub price: f64,
    pub unit: Unit,
    pub quantity: Quantity,
}

impl UnitPrice {
    pub fn new(price: f64, unit: Unit, quantity: f64) -> Self {
        Self {
            price,
            unit,
            quantity: Quantity::Known(quantity),
        }
    }

    pub fn unknown(price: f64) -> Self {
        Self {
            price,
            unit: Unit::Unknown,
            quantity: Quantity::Unknown,
        }
    }
}

impl std::fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:.2} per {} {}", self.price, self.quantity, self.unit)
    }
}

// ---------------------------------------------------------------------------
// Products + matches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: String,
    pub store: Store,
    pub unit_price: UnitPrice,
}

/// A store A product paired with a store B product on a common unit basis.
///
/// Only built through [`MatchedProduct::new`], so both sides always share a
/// known unit and quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedProduct {
    store_a: Product,
    store_b: Product,
    similarity: f64,
}

impl MatchedProduct {
    /// Pair two products. Refuses pairs whose unit prices are not already on
    /// the same unit and quantity.
    pub fn new(store_a: Product, store_b: Product, similarity: f64) -> Result<Self, Incomparable> {
        let (a, b) = (&store_a.unit_price, &store_b.unit_price);
        if a.unit != b.unit {
            return Err(Incomparable::UnitMismatch);
        }
        if a.unit == Unit::Unknown {
            return Err(Incomparable::UnknownUnit);
        }
        if a.quantity != b.quantity {
            return Err(Incomparable::NotMultiple);
        }
        Ok(Self {
            store_a,
            store_b,
            similarity,
        })
    }

    pub fn store_a(&self) -> &Product {
        &self.store_a
    }

    pub fn store_b(&self) -> &Product {
        &self.store_b
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    /// Store B price minus store A price.
    pub fn difference(&self) -> f64 {
        self.store_b.unit_price.price - self.store_a.unit_price.price
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Which store's aggregate price over the matched set is lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Cheaper(Store),
    Draw,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cheaper(store) => write!(f, "{store} is cheaper"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Significant difference in price.
    Reject,
    FailToReject,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub total_difference: f64,
    pub verdict: Verdict,
    pub mean: f64,
    pub std_dev: f64,
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub significance_level: f64,
    pub decision: Decision,
}

impl Summary {
    pub fn is_significant(&self) -> bool {
        self.decision == Decision::Reject
    }
}

/// Descriptive statistics over every parseable price in one catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceProfile {
    pub store: Store,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub meta: RunMeta,
    pub matches: Vec<MatchedProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    /// Set instead of `summary` when the matched set is too small to test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_error: Option<String>,
    pub profiles: Vec<PriceProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
    pub similarity_threshold: f64,
    pub store_a_products: usize,
    pub store_b_products: usize,
}
