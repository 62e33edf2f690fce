use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::PERCENT_PRECISION;
use crate::enrichment::EnrichedHolding;
use crate::errors::{Error, Result};

/// Investment and valuation figures for one holding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldingAllocation {
    pub name: String,
    pub sector: String,
    pub investment: Decimal,
    pub present_value: Decimal,
    pub gain_loss: Decimal,
    /// Share of the total investment, in percent
    pub portfolio_percent: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: String,
    pub investment: Decimal,
    pub present_value: Decimal,
    pub gain_loss: Decimal,
}

impl SectorSummary {
    fn empty(sector: &str) -> Self {
        Self {
            sector: sector.to_string(),
            investment: Decimal::ZERO,
            present_value: Decimal::ZERO,
            gain_loss: Decimal::ZERO,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_investment: Decimal,
    pub present_value: Decimal,
    pub gain_loss: Decimal,
    pub holdings: Vec<HoldingAllocation>,
    /// In order of first appearance in the holdings list
    pub sectors: Vec<SectorSummary>,
}

impl PortfolioSummary {
    pub fn from_holdings(rows: &[EnrichedHolding]) -> Result<Self> {
        let mut total_investment = Decimal::ZERO;
        let mut present_value = Decimal::ZERO;
        let mut sectors: Vec<SectorSummary> = Vec::new();
        let mut figures = Vec::with_capacity(rows.len());

        for row in rows {
            let name = &row.holding.name;
            let investment = row
                .holding
                .investment()
                .ok_or_else(|| overflow("investment", name))?;
            let value = row
                .present_value()
                .ok_or_else(|| overflow("present value", name))?;

            total_investment = checked_add(total_investment, investment, name)?;
            present_value = checked_add(present_value, value, name)?;

            let index = match sectors.iter().position(|s| s.sector == row.holding.sector) {
                Some(index) => index,
                None => {
                    sectors.push(SectorSummary::empty(&row.holding.sector));
                    sectors.len() - 1
                }
            };
            let sector = &mut sectors[index];
            sector.investment = checked_add(sector.investment, investment, name)?;
            sector.present_value = checked_add(sector.present_value, value, name)?;
            sector.gain_loss = sector.present_value - sector.investment;

            figures.push((row, investment, value));
        }

        let holdings = figures
            .into_iter()
            .map(|(row, investment, value)| HoldingAllocation {
                name: row.holding.name.clone(),
                sector: row.holding.sector.clone(),
                investment,
                present_value: value,
                gain_loss: value - investment,
                portfolio_percent: percent_of(investment, total_investment),
            })
            .collect();

        Ok(Self {
            total_investment,
            present_value,
            gain_loss: present_value - total_investment,
            holdings,
            sectors,
        })
    }
}

fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(total))
        .map(|p| p.round_dp(PERCENT_PRECISION))
        .unwrap_or(Decimal::ZERO)
}

fn checked_add(acc: Decimal, value: Decimal, name: &str) -> Result<Decimal> {
    acc.checked_add(value)
        .ok_or_else(|| overflow("portfolio total", name))
}

fn overflow(what: &str, name: &str) -> Error {
    Error::Calculation(format!("{} overflow at holding '{}'", what, name))
}
