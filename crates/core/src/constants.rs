/// Sector assigned to holdings that do not name one.
pub const DEFAULT_SECTOR: &str = "Others";

/// Decimal precision for percentages in the portfolio summary
pub const PERCENT_PRECISION: u32 = 2;
