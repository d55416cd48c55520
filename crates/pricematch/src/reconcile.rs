use crate::error::Incomparable;
use crate::model::{Quantity, Unit, UnitPrice};

/// Put two unit prices on the same quantity basis.
///
/// Same unit required. When one quantity is an exact integer multiple of the
/// other, the smaller side's price and quantity are both scaled up by that
/// factor. Fractional rescaling is never attempted. The returned pair keeps
/// the argument order.
pub fn reconcile(a: &UnitPrice, b: &UnitPrice) -> Result<(UnitPrice, UnitPrice), Incomparable> {
    if a.unit != b.unit {
        return Err(Incomparable::UnitMismatch);
    }
    if a.unit == Unit::Unknown {
        return Err(Incomparable::UnknownUnit);
    }

    let (Some(qa), Some(qb)) = (a.quantity.value(), b.quantity.value()) else {
        return Err(Incomparable::UnknownUnit);
    };

    if qa == qb {
        return Ok((*a, *b));
    }

    if qa > qb {
        let k = multiple_of(qa, qb).ok_or(Incomparable::NotMultiple)?;
        Ok((*a, scale(b, k)))
    } else {
        let k = multiple_of(qb, qa).ok_or(Incomparable::NotMultiple)?;
        Ok((scale(a, k), *b))
    }
}

/// `big / small` when `big` is an exact integer multiple of `small`.
fn multiple_of(big: f64, small: f64) -> Option<f64> {
    if small <= 0.0 || big % small != 0.0 {
        return None;
    }
    Some((big / small).round())
}

fn scale(up: &UnitPrice, k: f64) -> UnitPrice {
    UnitPrice {
        price: up.price * k,
        unit: up.unit,
        quantity: up
            .quantity
            .value()
            .map_or(Quantity::Unknown, |q| Quantity::Known(q * k)),
    }
}
