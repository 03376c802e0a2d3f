//! txdash fetches customers and their transactions from a remote service, filters the customers
//! by name or by transaction amount, and aggregates the transactions of one customer into daily
//! totals for charting.

mod aggregate;
pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod filter;
pub mod model;
pub mod session;
mod utils;
pub mod view;

#[cfg(test)]
mod test_env;

pub use aggregate::{daily_totals, DailySeries, DailyTotal};
pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
