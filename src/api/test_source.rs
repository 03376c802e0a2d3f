//! Implements the `Source` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a remote service. See `TXDASH_IN_TEST_MODE`.

use crate::api::{Collection, Source};
use crate::error::Res;
use anyhow::Context;
use serde_json::Value;
use std::collections::HashMap;

/// An implementation of the `Source` trait that holds its collections in memory. By default, it is
/// seeded with some sample data.
pub struct TestSource {
    data: HashMap<Collection, Value>,
}

impl TestSource {
    /// Create a new `TestSource` using `data`. A collection missing from the map fails to fetch.
    pub fn new(data: HashMap<Collection, Value>) -> Self {
        Self { data }
    }

    /// A source serving exactly the two given bodies.
    pub fn with_bodies(customers: Value, transactions: Value) -> Self {
        Self::new(HashMap::from([
            (Collection::Customers, customers),
            (Collection::Transactions, transactions),
        ]))
    }
}

#[async_trait::async_trait]
impl Source for TestSource {
    async fn get(&self, collection: Collection) -> Res<Value> {
        self.data
            .get(&collection)
            .with_context(|| format!("Collection '{collection}' not found"))
            .cloned()
    }
}

impl Default for TestSource {
    /// Loads seed data from this module.
    fn default() -> Self {
        Self::new(default_data())
    }
}

/// Provides the seed data from this module.
fn default_data() -> HashMap<Collection, Value> {
    let mut map = HashMap::new();
    map.insert(Collection::Customers, seed(CUSTOMER_DATA));
    map.insert(Collection::Transactions, seed(TRANSACTION_DATA));
    map
}

fn seed(json: &str) -> Value {
    // The seed constants are checked by the tests below.
    serde_json::from_str(json).unwrap_or(Value::Array(Vec::new()))
}

/// Seed customer data.
const CUSTOMER_DATA: &str = r#"[
  {"id": 1, "name": "Ahmed Ali"},
  {"id": 2, "name": "Aya Elsayed"},
  {"id": 3, "name": "Mina Adel"},
  {"id": 4, "name": "Sarah Reda"},
  {"id": 5, "name": "Mohamed Sayed"}
]"#;

/// Seed transaction data. Transaction 13 references a customer that does not exist.
const TRANSACTION_DATA: &str = r#"[
  {"id": 1, "customer_id": 1, "date": "2022-01-01", "amount": 1000},
  {"id": 2, "customer_id": 1, "date": "2022-01-02", "amount": 2000},
  {"id": 3, "customer_id": 2, "date": "2022-01-01", "amount": 550},
  {"id": 4, "customer_id": 3, "date": "2022-01-01", "amount": 500},
  {"id": 5, "customer_id": 2, "date": "2022-01-02", "amount": 1300},
  {"id": 6, "customer_id": 4, "date": "2022-01-01", "amount": 750},
  {"id": 7, "customer_id": 3, "date": "2022-01-02", "amount": 1250},
  {"id": 8, "customer_id": 5, "date": "2022-01-01", "amount": 2500},
  {"id": 9, "customer_id": 5, "date": "2022-01-02", "amount": 875},
  {"id": 10, "customer_id": 1, "date": "2022-01-02T18:30:00", "amount": 150},
  {"id": 11, "customer_id": "4", "date": "2022-01-03T09:15:00", "amount": -200},
  {"id": 12, "customer_id": 2, "date": "2022-01-03", "amount": 1000},
  {"id": 13, "customer_id": 9, "date": "2022-01-03", "amount": 400}
]"#;
