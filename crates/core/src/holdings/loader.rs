use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};

use super::Holding;
use crate::errors::{Error, Result};

/// Read and validate a JSON array of holdings.
pub fn load_holdings_file(path: &Path) -> Result<Vec<Holding>> {
    debug!("Loading holdings from {}", path.display());
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::HoldingsConfig(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let holdings = parse_holdings(&contents)?;
    info!("Loaded {} holdings from {}", holdings.len(), path.display());
    Ok(holdings)
}

pub fn parse_holdings(json: &str) -> Result<Vec<Holding>> {
    let holdings: Vec<Holding> = serde_json::from_str(json)?;
    validate_holdings(&holdings)?;
    Ok(holdings)
}

/// Names must be unique because single-holding lookups go by name.
pub fn validate_holdings(holdings: &[Holding]) -> Result<()> {
    if holdings.is_empty() {
        return Err(Error::HoldingsConfig("No holdings configured".to_string()));
    }

    let mut names = HashSet::with_capacity(holdings.len());
    for (index, holding) in holdings.iter().enumerate() {
        if holding.name.trim().is_empty() {
            return Err(Error::HoldingsConfig(format!(
                "Holding #{} has an empty name",
                index
            )));
        }
        if holding.primary_symbol.trim().is_empty() || holding.secondary_symbol.trim().is_empty() {
            return Err(Error::HoldingsConfig(format!(
                "Holding '{}' is missing a symbol",
                holding.name
            )));
        }
        if holding.purchase_price.is_sign_negative() || holding.quantity.is_sign_negative() {
            return Err(Error::HoldingsConfig(format!(
                "Holding '{}' has a negative purchase price or quantity",
                holding.name
            )));
        }
        if !names.insert(holding.name.as_str()) {
            return Err(Error::HoldingsConfig(format!(
                "Duplicate holding name '{}'",
                holding.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const TWO_HOLDINGS: &str = r#"[
        {"name": "ABC", "yahooSymbol": "ABC.NS", "googleSymbol": "ABC:NSE",
         "purchasePrice": 100, "quantity": 10, "exchange": "NSE", "sector": "Tech Sector"},
        {"name": "XYZ", "yahooSymbol": "XYZ.BO", "googleSymbol": "XYZ:BOM",
         "purchasePrice": 42.5, "quantity": 3, "exchange": "BSE"}
    ]"#;

    #[test]
    fn test_parse_holdings() {
        let holdings = parse_holdings(TWO_HOLDINGS).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].sector, "Tech Sector");
        assert_eq!(holdings[1].purchase_price, dec!(42.5));
        assert_eq!(holdings[1].sector, "Others");
    }

    #[test]
    fn test_load_holdings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_HOLDINGS.as_bytes()).unwrap();

        let holdings = load_holdings_file(file.path()).unwrap();
        assert_eq!(holdings[0].name, "ABC");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_holdings_file(Path::new("/nonexistent/holdings.json")).unwrap_err();
        assert!(matches!(err, Error::HoldingsConfig(_)));
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = parse_holdings(r#"[{"name": "ABC"}]"#).unwrap_err();
        assert!(matches!(err, Error::HoldingsConfig(_)));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let holdings = vec![
            Holding::new("ABC", "A", "A", "NSE", dec!(1), dec!(1)),
            Holding::new("ABC", "B", "B", "NSE", dec!(1), dec!(1)),
        ];
        let err = validate_holdings(&holdings).unwrap_err();
        assert!(err.to_string().contains("Duplicate holding name 'ABC'"));
    }

    #[test]
    fn test_rejects_negative_quantity_and_blank_symbol() {
        let negative = vec![Holding::new("ABC", "A", "A", "NSE", dec!(1), dec!(-1))];
        assert!(validate_holdings(&negative).is_err());

        let blank = vec![Holding::new("ABC", " ", "A", "NSE", dec!(1), dec!(1))];
        assert!(validate_holdings(&blank).is_err());
    }

    #[test]
    fn test_rejects_empty_list() {
        assert!(parse_holdings("[]").is_err());
    }
}
