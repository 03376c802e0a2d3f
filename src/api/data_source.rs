//! Fetches both source collections and validates them into a `Dataset`.

use crate::api::schema::parse_records;
use crate::api::{Collection, SchemaError, Source};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::Dataset;
use crate::Result;
use tracing::{debug, info, warn};

/// Retrieves the customers and transactions collections from a dynamically-dispatched `Source`.
pub struct DataSource {
    source: Box<dyn Source>,
}

impl DataSource {
    pub fn new(source: Box<dyn Source>) -> Self {
        Self { source }
    }

    /// Issues both requests concurrently. If either fails the whole fetch fails and nothing is
    /// returned.
    ///
    /// # Errors
    /// - `ErrorType::Fetch` if a request fails.
    /// - `ErrorType::Schema` if a body is not a valid customer or transaction collection.
    pub async fn fetch(&self) -> Result<Dataset> {
        info!("Fetching customers and transactions");
        let (customers, transactions) = tokio::try_join!(
            self.source.get(Collection::Customers),
            self.source.get(Collection::Transactions),
        )
        .map_err(classify)?;

        let customers = parse_records(Collection::Customers, customers)
            .pub_result(ErrorType::Schema)?;
        let transactions = parse_records(Collection::Transactions, transactions)
            .pub_result(ErrorType::Schema)?;
        let dataset = Dataset::new(customers, transactions);

        debug!(
            "Fetched {} customers and {} transactions",
            dataset.customers().len(),
            dataset.transactions().len()
        );
        let dangling = dataset.dangling_transactions().count();
        if dangling > 0 {
            warn!("{dangling} transactions reference unknown customers and will not be listed");
        }
        Ok(dataset)
    }
}

/// A `SchemaError` anywhere in the chain is a schema problem, anything else is a failed fetch.
fn classify(e: anyhow::Error) -> Error {
    if e.downcast_ref::<SchemaError>().is_some() {
        Error::new(ErrorType::Schema, e)
    } else {
        Error::new(ErrorType::Fetch, e)
    }
}
