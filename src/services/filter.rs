use serde::{Deserialize, Serialize};

use crate::models::{FilteredCurrencyRecord, PriceRecord};

/// Numeric/range predicates deciding which normalized records are retained.
///
/// All comparisons are inclusive (`min <= x <= max`): a record sitting exactly
/// on a bound passes. An entirely unset bounds value is the identity filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterBounds {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_market_cap: Option<f64>,
    pub min_volume: Option<f64>,
    pub allowed_symbols: Option<Vec<String>>,
}

/// Accessors the filter needs from a record. A record type without a given
/// metric reports None, which counts as 0 against a configured floor.
pub trait Filterable {
    fn price(&self) -> f64;
    fn market_cap(&self) -> Option<f64>;
    fn volume(&self) -> Option<f64>;
    fn symbol(&self) -> &str;
}

impl FilterBounds {
    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        if let Some(min) = self.min_price {
            if record.price() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if record.price() > max {
                return false;
            }
        }
        if let Some(floor) = self.min_market_cap {
            if record.market_cap().unwrap_or(0.0) < floor {
                return false;
            }
        }
        if let Some(floor) = self.min_volume {
            if record.volume().unwrap_or(0.0) < floor {
                return false;
            }
        }
        if let Some(allowed) = &self.allowed_symbols {
            if !allowed.iter().any(|s| s == record.symbol()) {
                return false;
            }
        }
        true
    }
}

/// Retains the records that satisfy every configured bound.
pub fn apply<T: Filterable>(records: Vec<T>, bounds: &FilterBounds) -> Vec<T> {
    records.into_iter().filter(|r| bounds.matches(r)).collect()
}

impl Filterable for PriceRecord {
    fn price(&self) -> f64 {
        self.price
    }
    fn market_cap(&self) -> Option<f64> {
        self.market_cap
    }
    fn volume(&self) -> Option<f64> {
        self.volume_24h
    }
    fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Filterable for FilteredCurrencyRecord {
    fn price(&self) -> f64 {
        self.current_price
    }
    fn market_cap(&self) -> Option<f64> {
        Some(self.market_cap)
    }
    fn volume(&self) -> Option<f64> {
        Some(self.total_volume)
    }
    fn symbol(&self) -> &str {
        &self.symbol
    }
}
