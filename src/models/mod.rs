mod filtered_currency;
mod investor;
mod price;
mod social_trend;

pub use filtered_currency::FilteredCurrencyRecord;
pub use investor::InvestorRecord;
pub use price::PriceRecord;
pub use social_trend::{Platform, SocialTrendRecord};

use thiserror::Error;

/// A record field fell outside its allowed domain. The offending record is
/// excluded from the write batch; sibling records are unaffected.
#[derive(Debug, Error)]
#[error("validation error: {0}")]
pub struct ValidationError(pub String);
