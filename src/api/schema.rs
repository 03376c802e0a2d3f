//! Validation of the raw JSON served by the remote collaborator.

use crate::api::Collection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

/// A response that does not have the shape of a customer or transaction collection.
#[derive(Clone, PartialEq, Eq)]
pub struct SchemaError {
    collection: Collection,
    index: Option<usize>,
    reason: String,
}

impl SchemaError {
    pub(crate) fn new(
        collection: Collection,
        index: Option<usize>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            collection,
            index,
            reason: reason.into(),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// The position of the offending record, `None` when the body as a whole is wrong.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Debug for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(ix) => write!(f, "invalid {} record at index {ix}: {}", self.collection, self.reason),
            None => write!(f, "invalid {} response: {}", self.collection, self.reason),
        }
    }
}

impl Error for SchemaError {}

/// Validates `body` as a JSON array of `T` records.
pub(super) fn parse_records<T>(collection: Collection, body: Value) -> Result<Vec<T>, SchemaError>
where
    T: DeserializeOwned,
{
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(SchemaError::new(
                collection,
                None,
                format!("expected an array, found {}", type_name(&other)),
            ))
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(ix, item)| {
            if !item.is_object() {
                return Err(SchemaError::new(
                    collection,
                    Some(ix),
                    format!("expected an object, found {}", type_name(&item)),
                ));
            }
            serde_json::from_value(item)
                .map_err(|e| SchemaError::new(collection, Some(ix), e.to_string()))
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
