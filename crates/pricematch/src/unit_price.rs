//! Normalization of store unit-price strings.
//!
//! Both chains publish unit prices as `"$<price> per <quantity><unit>"` or
//! `"$<price> / <quantity><unit>"`, e.g. `"$5.00 per 1kg"`, `"$2.00 / 10g"`,
//! `"$0.90 / 1ea"`. Everything is normalized into a [`UnitPrice`].

use crate::error::ParseFailure;
use crate::model::{Unit, UnitPrice};

const SEPARATORS: [&str; 2] = [" per ", " / "];

/// Parse a raw unit-price string.
///
/// Numeric failures inside a recognized unit branch fail the whole call: a
/// string like `"$3 per each"` is a `ParseFailure`, not an unknown quantity.
/// Only text matching no unit token and no bare number yields
/// [`Unit::Unknown`].
pub fn parse_unit_price(raw: &str) -> Result<UnitPrice, ParseFailure> {
    let (price_part, unit_part) = split_separator(raw).ok_or(ParseFailure::NoSeparator)?;
    let price = parse_price(price_part)?;
    let unit_and_quantity = unit_part.to_lowercase();

    if unit_and_quantity.contains("kg") {
        let quantity = parse_quantity(&unit_and_quantity.replace("kg", ""))?;
        return Ok(UnitPrice::new(price, Unit::Kilogram, quantity));
    }

    // "each" contains "ea"; strip the long form first so "1 each" reads as 1.
    if unit_and_quantity.contains("ea") {
        let stripped = unit_and_quantity.replace("each", "").replace("ea", "");
        let quantity = parse_quantity(&stripped)?;
        return Ok(UnitPrice::new(price, Unit::Each, quantity));
    }

    if unit_and_quantity.contains('g') {
        let quantity = parse_quantity(&unit_and_quantity.replace('g', ""))?;
        return Ok(UnitPrice::new(price, Unit::Gram, quantity));
    }

    match parse_number(&unit_and_quantity) {
        Some(quantity) if quantity > 0.0 => Ok(UnitPrice::new(price, Unit::Each, quantity)),
        _ => Ok(UnitPrice::unknown(price)),
    }
}

/// Parse a plain shelf price such as `"$4.50"` or `"4.50"`.
pub fn parse_bare_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
    parse_number(digits).filter(|p| *p >= 0.0)
}

/// First two segments around the first separator that occurs in `raw`.
fn split_separator(raw: &str) -> Option<(&str, &str)> {
    let sep = SEPARATORS.iter().find(|sep| raw.contains(*sep))?;
    let mut parts = raw.split(sep);
    Some((parts.next()?, parts.next()?))
}

fn parse_price(segment: &str) -> Result<f64, ParseFailure> {
    let amount = segment
        .trim_start()
        .strip_prefix('$')
        .ok_or(ParseFailure::MissingCurrency)?;
    match parse_number(amount) {
        Some(price) if price >= 0.0 => Ok(price),
        _ => Err(ParseFailure::InvalidPrice(amount.trim().to_string())),
    }
}

fn parse_quantity(text: &str) -> Result<f64, ParseFailure> {
    match parse_number(text) {
        Some(q) if q > 0.0 => Ok(q),
        _ => Err(ParseFailure::InvalidQuantity(text.trim().to_string())),
    }
}

/// Finite decimal number, surrounding whitespace ignored.
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
