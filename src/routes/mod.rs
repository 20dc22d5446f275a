pub(crate) mod currencies;
pub(crate) mod health;
pub(crate) mod investors;
pub(crate) mod jobs;
pub(crate) mod prices;
pub(crate) mod social;
