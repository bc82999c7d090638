//! Options sent with begin-transaction and with reads.

use crate::constants::ReadConsistency;
use serde_json::{Map, Value as Json};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionOptions {
    ReadOnly,
    ReadWrite { previous_transaction: Option<String> },
}

impl TransactionOptions {
    pub fn read_write() -> Self {
        Self::ReadWrite {
            previous_transaction: None,
        }
    }

    /// Retry a read-write transaction that previously aborted.
    pub fn retry(previous_transaction: impl Into<String>) -> Self {
        Self::ReadWrite {
            previous_transaction: Some(previous_transaction.into()),
        }
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        match self {
            Self::ReadOnly => {
                data.insert("readOnly".into(), Json::Object(Map::new()));
            }
            Self::ReadWrite {
                previous_transaction,
            } => {
                let mut inner = Map::new();
                if let Some(previous) = previous_transaction {
                    inner.insert("previousTransaction".into(), Json::from(previous.as_str()));
                }
                data.insert("readWrite".into(), Json::Object(inner));
            }
        }
        Json::Object(data)
    }
}

/// Reads happen either inside a transaction or at a chosen consistency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadOptions {
    Consistency(ReadConsistency),
    Transaction(String),
}

impl ReadOptions {
    pub fn new(consistency: ReadConsistency, transaction: Option<&str>) -> Self {
        match transaction {
            Some(transaction) => Self::Transaction(transaction.to_string()),
            None => Self::Consistency(consistency),
        }
    }

    pub fn to_wire(&self) -> Json {
        let mut data = Map::new();
        match self {
            Self::Consistency(consistency) => {
                data.insert("readConsistency".into(), Json::from(consistency.as_str()))
            }
            Self::Transaction(transaction) => {
                data.insert("transaction".into(), Json::from(transaction.as_str()))
            }
        };
        Json::Object(data)
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self::Consistency(ReadConsistency::default())
    }
}
