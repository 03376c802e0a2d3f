use crate::model::RecordId;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

/// A single transaction as served by the remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: RecordId,
    customer_id: RecordId,
    date: TxDate,
    amount: i64,
}

impl Transaction {
    pub fn new(
        id: impl Into<RecordId>,
        customer_id: impl Into<RecordId>,
        date: TxDate,
        amount: i64,
    ) -> Self {
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            date,
            amount,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn customer_id(&self) -> &RecordId {
        &self.customer_id
    }

    pub fn date(&self) -> &TxDate {
        &self.date
    }

    /// The calendar day this transaction is counted on.
    pub fn day(&self) -> NaiveDate {
        self.date.day()
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// The timestamp of a transaction.
///
/// The text is kept exactly as it was received so it can be displayed unchanged. The calendar day
/// is the literal date portion in front of the time separator; any time-of-day and any offset are
/// ignored, so `2024-01-01T23:30:00-05:00` falls on `2024-01-01`.
///
/// ```
/// # use txdash::model::TxDate;
/// # use chrono::NaiveDate;
/// let date: TxDate = "2024-01-01T10:00".parse().unwrap();
/// assert_eq!(date.day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
/// assert_eq!(date.as_str(), "2024-01-01T10:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxDate {
    raw: String,
    day: NaiveDate,
}

impl TxDate {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }
}

/// An error that occurs when a transaction timestamp has no valid calendar date in front.
pub struct DateError {
    value: String,
    source: chrono::ParseError,
}

impl Debug for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateError")
            .field("value", &self.value)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' does not start with a YYYY-MM-DD date: {}",
            self.value, self.source
        )
    }
}

impl Error for DateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl FromStr for TxDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date_part = s.trim().split(['T', ' ']).next().unwrap_or_default();
        let day = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|source| DateError {
            value: s.to_string(),
            source,
        })?;
        Ok(Self {
            raw: s.to_string(),
            day,
        })
    }
}

impl Display for TxDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TxDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TxDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TxDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}
