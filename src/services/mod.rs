pub mod filter;
pub mod normalizer;
pub mod scheduler;
