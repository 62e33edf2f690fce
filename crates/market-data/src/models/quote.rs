use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Merged market data for one holding.
///
/// Zero is the wire convention for "not available": a stock whose providers
/// are both down reports `{cmp: 0, peRatio: 0, eps: 0}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    /// Current market price
    pub cmp: Decimal,
    /// Price-to-earnings ratio
    pub pe_ratio: Decimal,
    /// Earnings per share
    pub eps: Decimal,
}

impl QuoteResult {
    pub fn new(cmp: Decimal, pe_ratio: Decimal, eps: Decimal) -> Self {
        Self { cmp, pe_ratio, eps }
    }

    /// The placeholder returned when no provider could be reached.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.cmp.is_zero() && self.pe_ratio.is_zero() && self.eps.is_zero()
    }
}

/// A partial quote as reported by a single provider.
///
/// Fields are `None` when the provider did not report a usable value.
/// Zero and negative values are folded into `None` on construction, so
/// "missing" and "reported as zero" are the same thing here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuoteFields {
    pub price: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub eps: Option<Decimal>,
}

impl QuoteFields {
    pub fn new(price: Option<Decimal>, pe_ratio: Option<Decimal>, eps: Option<Decimal>) -> Self {
        Self {
            price: positive(price),
            pe_ratio: positive(pe_ratio),
            eps: positive(eps),
        }
    }

    /// Build from raw provider floats. NaN and infinities count as absent.
    pub fn from_f64(price: Option<f64>, pe_ratio: Option<f64>, eps: Option<f64>) -> Self {
        Self::new(
            price.and_then(decimal_from_f64),
            pe_ratio.and_then(decimal_from_f64),
            eps.and_then(decimal_from_f64),
        )
    }

    /// No provider value at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.pe_ratio.is_none() && self.eps.is_none()
    }

    /// Field-wise precedence: keep our value when present, otherwise take
    /// the fallback's.
    pub fn or(self, fallback: QuoteFields) -> QuoteFields {
        QuoteFields {
            price: self.price.or(fallback.price),
            pe_ratio: self.pe_ratio.or(fallback.pe_ratio),
            eps: self.eps.or(fallback.eps),
        }
    }

    /// Reduce partial quotes given in precedence order: the first positive
    /// value wins for each field.
    pub fn merge_first_positive<I>(sources: I) -> QuoteFields
    where
        I: IntoIterator<Item = QuoteFields>,
    {
        sources
            .into_iter()
            .fold(QuoteFields::empty(), |merged, next| merged.or(next))
    }

    /// Collapse into the wire representation, absent fields become zero.
    pub fn into_result(self) -> QuoteResult {
        QuoteResult {
            cmp: self.price.unwrap_or(Decimal::ZERO),
            pe_ratio: self.pe_ratio.unwrap_or(Decimal::ZERO),
            eps: self.eps.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Convert a provider float, rejecting values that have no decimal form.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| v.is_sign_positive() && !v.is_zero())
}
