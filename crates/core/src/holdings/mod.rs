//! Portfolio holdings.
//!
//! Holdings are static: they are read once at startup, either from the
//! built-in list or from a JSON file, and never change afterwards.

mod defaults;
mod loader;
mod model;

pub use defaults::default_holdings;
pub use loader::{load_holdings_file, parse_holdings, validate_holdings};
pub use model::Holding;
