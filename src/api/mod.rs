//! Access to the remote collaborator that serves the customers and transactions collections.
//!
//! The `Source` trait is the seam: `HttpSource` talks to the real service, `TestSource` serves
//! seed data from memory. `DataSource` sits on top of either one, fetches both collections and
//! validates them into a `Dataset`.

mod data_source;
mod http;
mod retry;
mod schema;
mod test_source;

use crate::error::Res;
use crate::Config;
use serde::{Deserialize, Serialize};

pub use data_source::DataSource;
pub use http::HttpSource;
pub use retry::Backoff;
pub use schema::SchemaError;
pub use test_source::TestSource;

/// When this environment variable is set and non-empty, the in-memory `TestSource` is used instead
/// of the remote service.
pub const TEST_MODE_ENV: &str = "TXDASH_IN_TEST_MODE";

/// The two collections served by the remote collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Customers,
    Transactions,
}

serde_plain::derive_display_from_serialize!(Collection);
serde_plain::derive_fromstr_from_deserialize!(Collection);

/// Retrieves one collection as raw JSON. Validation happens in `DataSource`.
#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn get(&self, collection: Collection) -> anyhow::Result<serde_json::Value>;
}

/// Selects the `Source` implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fetch from the configured remote service.
    #[default]
    Http,
    /// Serve seed data from memory.
    Test,
}

impl Mode {
    /// `Mode::Test` when `TXDASH_IN_TEST_MODE` is set and non-empty, `Mode::Http` otherwise.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `DataSource` for `mode`.
pub fn data_source(config: &Config, mode: Mode) -> Res<DataSource> {
    let source: Box<dyn Source> = match mode {
        Mode::Http => Box::new(HttpSource::new(config)?),
        Mode::Test => Box::new(TestSource::default()),
    };
    Ok(DataSource::new(source))
}
