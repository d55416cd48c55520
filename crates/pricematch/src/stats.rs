// Paired price comparison: one-sample two-sided t-test on the per-pair
// differences (store B price - store A price) against a zero mean, plus
// descriptive price profiles for whole catalogs.

use std::f64::consts::PI;

use crate::catalog::Catalog;
use crate::error::CompareError;
use crate::model::{Decision, MatchedProduct, PriceField, PriceProfile, Store, Summary, Verdict};
use crate::unit_price::{parse_bare_price, parse_unit_price};

pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Summarize the price differences over a matched set.
///
/// Needs at least two matches for a sample variance; fewer is
/// `InsufficientSample`.
pub fn compare(matches: &[MatchedProduct], significance_level: f64) -> Result<Summary, CompareError> {
    if matches.len() < 2 {
        return Err(CompareError::InsufficientSample {
            count: matches.len(),
        });
    }
    let differences: Vec<f64> = matches.iter().map(MatchedProduct::difference).collect();
    let stores = (matches[0].store_a().store, matches[0].store_b().store);
    paired_test(&differences, stores, significance_level)
}

pub fn compare_default(matches: &[MatchedProduct]) -> Result<Summary, CompareError> {
    compare(matches, DEFAULT_SIGNIFICANCE)
}

/// t-test over `differences`, each being `store_b - store_a`.
pub fn paired_test(
    differences: &[f64],
    (store_a, store_b): (Store, Store),
    significance_level: f64,
) -> Result<Summary, CompareError> {
    let n = differences.len();
    if n < 2 {
        return Err(CompareError::InsufficientSample { count: n });
    }

    let total: f64 = differences.iter().sum();
    let mean = total / n as f64;
    let variance = differences.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    let df = (n - 1) as f64;

    let (t_statistic, p_value) = if std_dev == 0.0 {
        if mean == 0.0 {
            (0.0, 1.0)
        } else {
            (mean.signum() * f64::INFINITY, 0.0)
        }
    } else {
        let t = mean / (std_dev / (n as f64).sqrt());
        (t, two_sided_p(t, df))
    };

    let verdict = if total < 0.0 {
        Verdict::Cheaper(store_b)
    } else if total > 0.0 {
        Verdict::Cheaper(store_a)
    } else {
        Verdict::Draw
    };

    let decision = if p_value < significance_level {
        Decision::Reject
    } else {
        Decision::FailToReject
    };

    log::debug!(
        "n={n} total={total:.2} mean={mean:.4} sd={std_dev:.4} t={t_statistic:.4} p={p_value:.4} -> {decision:?}"
    );

    Ok(Summary {
        count: n,
        total_difference: total,
        verdict,
        mean,
        std_dev,
        t_statistic,
        degrees_of_freedom: df,
        p_value,
        significance_level,
        decision,
    })
}

/// Descriptive statistics of every price readable from `field`. Unit-price
/// strings contribute their price; plain shelf prices are read as-is.
pub fn price_profile(catalog: &Catalog, field: PriceField) -> PriceProfile {
    let mut prices: Vec<f64> = catalog
        .iter()
        .filter_map(|(_, entry)| entry.price_text(field))
        .filter_map(|raw| {
            parse_unit_price(raw)
                .map(|up| up.price)
                .ok()
                .or_else(|| parse_bare_price(raw))
        })
        .collect();
    prices.sort_by(f64::total_cmp);

    let count = prices.len();
    if count == 0 {
        return PriceProfile {
            store: catalog.store(),
            count,
            mean: None,
            median: None,
            std_dev: None,
        };
    }

    let mean = prices.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        prices[count / 2]
    } else {
        (prices[count / 2 - 1] + prices[count / 2]) / 2.0
    };
    // Population standard deviation
    let std_dev = (prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / count as f64).sqrt();

    PriceProfile {
        store: catalog.store(),
        count,
        mean: Some(mean),
        median: Some(median),
        std_dev: Some(std_dev),
    }
}

// ---------------------------------------------------------------------------
// Student's t distribution
// ---------------------------------------------------------------------------

/// P(|T| >= |t|) for T ~ t(df).
pub fn two_sided_p(t: f64, df: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    let x = df / (df + t * t);
    regularized_beta(x, df / 2.0, 0.5).clamp(0.0, 1.0)
}

/// Lanczos approximation (g = 7, n = 9), valid for x >= 0.5.
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 9] = [
        0.999_999_999_999_809_9,
        676.520_368_121_885_1,
        -1_259.139_216_722_402_8,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_572e-6,
        1.505_632_735_149_311_6e-7,
    ];
    if x < 0.5 {
        // Reflection
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + 7.5;
    let mut sum = COEFFS[0];
    for (i, c) in COEFFS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized incomplete beta I_x(a, b).
fn regularized_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(x, a, b) / a
    } else {
        1.0 - front * beta_continued_fraction(1.0 - x, b, a) / b
    }
}

/// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}
