use rust_decimal::Decimal;

use super::Holding;

/// (name, yahoo symbol, finnhub symbol, exchange, purchase price, quantity, sector)
type HoldingRow = (&'static str, &'static str, &'static str, &'static str, i64, i64, &'static str);

const DEFAULT_HOLDINGS: &[HoldingRow] = &[
    ("HDFC Bank", "HDB", "HDFCBANK:NSE", "NSE", 1550, 10, "Financial Sector"),
    ("Bajaj Finance", "BAJFINANCE.NS", "BAJFINANCE:NSE", "NSE", 7200, 4, "Financial Sector"),
    ("ICICI Bank", "IBN", "ICICIBANK:NSE", "NSE", 950, 8, "Financial Sector"),
    ("Bajaj Housing", "BAJAJHFL.BO", "BAJAJHFL:BOM", "BSE", 4800, 5, "Financial Sector"),
    ("Savani Financials", "SAVFI.BO", "511577:BOM", "BSE", 40, 500, "Financial Sector"),
    ("LTI Mindtree", "LTIM.NS", "LTIM:NSE", "NSE", 6000, 2, "Tech Sector"),
    ("KPIT Tech", "KPITTECH.NS", "KPITTECH:NSE", "NSE", 1300, 3, "Tech Sector"),
    ("Tata Tech", "TATATECH.BO", "544028:BOM", "BSE", 1200, 10, "Tech Sector"),
    ("BLS E-Services", "BLSE.NS", "BLSE:NSE", "NSE", 300, 15, "Tech Sector"),
    ("Tanla", "TANLA.NS", "TANLA:NSE", "NSE", 950, 7, "Tech Sector"),
    ("Dmart", "DMART.NS", "DMART:NSE", "NSE", 3600, 2, "Consumer"),
    ("Tata Consumer", "TATACONSUM.NS", "TATACONSUM:NSE", "NSE", 1050, 6, "Consumer"),
    ("Pidilite", "PIDILITIND.NS", "PIDILITIND:NSE", "NSE", 2800, 4, "Consumer"),
    ("Tata Power", "TATAPOWER.NS", "TATAPOWER:NSE", "NSE", 240, 50, "Power"),
    ("KPI Green", "KPIGREEN.NS", "KPIGREEN:NSE", "NSE", 900, 10, "Power"),
    ("Suzlon", "SUZLON.NS", "SUZLON:NSE", "NSE", 45, 200, "Power"),
    ("Gensol", "GENSOL.NS", "GENSOL:NSE", "NSE", 1600, 3, "Power"),
    ("Hariom Pipes", "HARIOMPIPE.NS", "HARIOMPIPE:NSE", "NSE", 500, 5, "Pipe Sector"),
    ("Astral", "ASTRAL.NS", "ASTRAL:NSE", "NSE", 2200, 3, "Pipe Sector"),
    ("Polycab", "POLYCAB.NS", "POLYCAB:NSE", "NSE", 4500, 2, "Pipe Sector"),
    ("Clean Science", "CLEAN.NS", "CLEAN:NSE", "NSE", 1500, 4, "Others"),
    ("Deepak Nitrite", "DEEPAKNTR.NS", "DEEPAKNTR:NSE", "NSE", 2200, 3, "Others"),
    ("Fine Organic", "FINEORG.NS", "FINEORG:NSE", "NSE", 4900, 1, "Others"),
    ("Gravita", "GRAVITA.NS", "GRAVITA:NSE", "NSE", 800, 5, "Others"),
    ("SBI Life", "SBILIFE.NS", "SBILIFE:NSE", "NSE", 1350, 6, "Others"),
];

/// The portfolio served when no holdings file is configured.
pub fn default_holdings() -> Vec<Holding> {
    DEFAULT_HOLDINGS
        .iter()
        .map(|&(name, yahoo, finnhub, exchange, price, quantity, sector)| {
            Holding::new(
                name,
                yahoo,
                finnhub,
                exchange,
                Decimal::from(price),
                Decimal::from(quantity),
            )
            .with_sector(sector)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::validate_holdings;

    #[test]
    fn test_default_holdings_are_valid() {
        let holdings = default_holdings();
        assert_eq!(holdings.len(), 25);
        assert!(validate_holdings(&holdings).is_ok());
    }

    #[test]
    fn test_default_holdings_keep_sector_grouping() {
        let holdings = default_holdings();
        let power: Vec<_> = holdings
            .iter()
            .filter(|h| h.sector == "Power")
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(power, vec!["Tata Power", "KPI Green", "Suzlon", "Gensol"]);
    }
}
