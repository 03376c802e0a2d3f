//! Types that represent the core data model: `Customer`, `Transaction` and the `Dataset` that
//! holds both collections once they have been fetched.
mod customer;
mod id;
mod transaction;

pub use customer::Customer;
pub use id::RecordId;
use serde::{Deserialize, Serialize};
pub use transaction::{DateError, Transaction, TxDate};

/// The source collections. They are fetched once and never modified afterward.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    customers: Vec<Customer>,
    transactions: Vec<Transaction>,
}

impl Dataset {
    pub fn new(customers: Vec<Customer>, transactions: Vec<Transaction>) -> Self {
        Self {
            customers,
            transactions,
        }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Finds a customer by id.
    pub fn customer(&self, id: &RecordId) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id() == id)
    }

    /// Transactions whose `customer_id` does not match any customer. These stay in the raw set but
    /// never appear in a per-customer view.
    pub fn dangling_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(|t| self.customer(t.customer_id()).is_none())
    }
}
