use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tickerfolio_market_data::QuoteResult;

use crate::errors::{Error, Result};
use crate::holdings::Holding;

/// A holding with its live quote applied.
///
/// Serialized flat: the holding's own fields followed by `cmp`, `peRatio`
/// and `earnings`. Zero means the figure was not available.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedHolding {
    #[serde(flatten)]
    pub holding: Holding,
    /// Current market price
    pub cmp: Decimal,
    pub pe_ratio: Decimal,
    /// `eps * quantity`
    pub earnings: Decimal,
}

impl EnrichedHolding {
    pub fn from_quote(holding: &Holding, quote: QuoteResult) -> Result<Self> {
        let earnings = quote.eps.checked_mul(holding.quantity).ok_or_else(|| {
            Error::Calculation(format!(
                "Earnings overflow for '{}' (eps {} x quantity {})",
                holding.name, quote.eps, holding.quantity
            ))
        })?;

        Ok(Self {
            holding: holding.clone(),
            cmp: quote.cmp,
            pe_ratio: quote.pe_ratio,
            earnings,
        })
    }

    /// `cmp * quantity`, `None` on overflow.
    pub fn present_value(&self) -> Option<Decimal> {
        self.cmp.checked_mul(self.holding.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn holding() -> Holding {
        Holding::new("ABC", "ABC", "ABC:NSE", "NSE", dec!(100), dec!(10))
    }

    #[test]
    fn test_earnings_is_eps_times_quantity() {
        let row =
            EnrichedHolding::from_quote(&holding(), QuoteResult::new(dec!(120), dec!(15), dec!(2)))
                .unwrap();
        assert_eq!(row.earnings, dec!(20));
        assert_eq!(row.present_value(), Some(dec!(1200)));
    }

    #[test]
    fn test_earnings_overflow_is_calculation_error() {
        let mut holding = holding();
        holding.quantity = Decimal::MAX;
        let err =
            EnrichedHolding::from_quote(&holding, QuoteResult::new(dec!(1), dec!(1), dec!(2)))
                .unwrap_err();
        assert!(matches!(err, Error::Calculation(_)));
    }

    #[test]
    fn test_serializes_flat_camel_case() {
        let row =
            EnrichedHolding::from_quote(&holding(), QuoteResult::new(dec!(125), dec!(18), dec!(2.5)))
                .unwrap();
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["name"], "ABC");
        assert_eq!(json["yahooSymbol"], "ABC");
        assert_eq!(json["googleSymbol"], "ABC:NSE");
        assert_eq!(json["purchasePrice"], 100.0);
        assert_eq!(json["cmp"], 125.0);
        assert_eq!(json["peRatio"], 18.0);
        assert_eq!(json["earnings"], 25.0);
        assert!(json.get("holding").is_none());
    }
}
