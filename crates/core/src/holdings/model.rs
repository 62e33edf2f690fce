use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SECTOR;

/// One position in the portfolio.
///
/// The wire names of the two symbols are kept from the dashboard's original
/// contract: `yahooSymbol` is the primary provider's ticker and
/// `googleSymbol` the secondary provider's.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Display name, unique within the portfolio
    pub name: String,
    #[serde(rename = "yahooSymbol")]
    pub primary_symbol: String,
    #[serde(rename = "googleSymbol")]
    pub secondary_symbol: String,
    pub exchange: String,
    pub purchase_price: Decimal,
    pub quantity: Decimal,
    #[serde(default = "default_sector")]
    pub sector: String,
}

fn default_sector() -> String {
    DEFAULT_SECTOR.to_string()
}

impl Holding {
    pub fn new(
        name: impl Into<String>,
        primary_symbol: impl Into<String>,
        secondary_symbol: impl Into<String>,
        exchange: impl Into<String>,
        purchase_price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            primary_symbol: primary_symbol.into(),
            secondary_symbol: secondary_symbol.into(),
            exchange: exchange.into(),
            purchase_price,
            quantity,
            sector: default_sector(),
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    /// Amount paid for the position, `None` on overflow.
    pub fn investment(&self) -> Option<Decimal> {
        self.purchase_price.checked_mul(self.quantity)
    }
}
