//! Wire enumerations. The string forms are part of the protocol and must not change.

use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

fn unknown(what: &str, value: &str) -> ModelError {
    ModelError::decode(format!("unknown {what}: {value}"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompositeFilterOperator {
    And,
    Or,
}

impl CompositeFilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    pub fn from_wire(value: &str) -> ModelResult<Self> {
        match value {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(unknown("composite filter operator", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyFilterOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    HasAncestor,
    NotEqual,
    In,
    NotIn,
}

impl PropertyFilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::Equal => "EQUAL",
            Self::HasAncestor => "HAS_ANCESTOR",
            Self::NotEqual => "NOT_EQUAL",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
        }
    }

    pub fn from_wire(value: &str) -> ModelResult<Self> {
        match value {
            "LESS_THAN" => Ok(Self::LessThan),
            "LESS_THAN_OR_EQUAL" => Ok(Self::LessThanOrEqual),
            "GREATER_THAN" => Ok(Self::GreaterThan),
            "GREATER_THAN_OR_EQUAL" => Ok(Self::GreaterThanOrEqual),
            "EQUAL" => Ok(Self::Equal),
            "HAS_ANCESTOR" => Ok(Self::HasAncestor),
            "NOT_EQUAL" => Ok(Self::NotEqual),
            "IN" => Ok(Self::In),
            "NOT_IN" => Ok(Self::NotIn),
            other => Err(unknown("property filter operator", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }

    pub fn from_wire(value: &str) -> ModelResult<Self> {
        match value {
            "ASCENDING" => Ok(Self::Ascending),
            "DESCENDING" => Ok(Self::Descending),
            other => Err(unknown("sort direction", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitMode {
    #[default]
    Transactional,
    NonTransactional,
}

impl CommitMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transactional => "TRANSACTIONAL",
            Self::NonTransactional => "NON_TRANSACTIONAL",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadConsistency {
    #[default]
    Eventual,
    Strong,
}

impl ReadConsistency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eventual => "EVENTUAL",
            Self::Strong => "STRONG",
        }
    }
}

/// Mutation operation; the wire form doubles as the mutation's object key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Upsert,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
        }
    }

    pub fn from_wire(value: &str) -> ModelResult<Self> {
        match value {
            "insert" => Ok(Self::Insert),
            "update" => Ok(Self::Update),
            "upsert" => Ok(Self::Upsert),
            "delete" => Ok(Self::Delete),
            other => Err(unknown("mutation operation", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityResultType {
    Full,
    KeyOnly,
    Projection,
    #[default]
    Unspecified,
}

impl EntityResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::KeyOnly => "KEY_ONLY",
            Self::Projection => "PROJECTION",
            Self::Unspecified => "UNSPECIFIED",
        }
    }

    /// Accepts the service's long unspecified spelling as well.
    pub fn from_wire(value: &str) -> ModelResult<Self> {
        match value {
            "FULL" => Ok(Self::Full),
            "KEY_ONLY" => Ok(Self::KeyOnly),
            "PROJECTION" => Ok(Self::Projection),
            "UNSPECIFIED" | "RESULT_TYPE_UNSPECIFIED" => Ok(Self::Unspecified),
            other => Err(unknown("entity result type", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoreResultsType {
    NotFinished,
    MoreResultsAfterLimit,
    MoreResultsAfterCursor,
    NoMoreResults,
    #[default]
    Unspecified,
}

impl MoreResultsType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFinished => "NOT_FINISHED",
            Self::MoreResultsAfterLimit => "MORE_RESULTS_AFTER_LIMIT",
            Self::MoreResultsAfterCursor => "MORE_RESULTS_AFTER_CURSOR",
            Self::NoMoreResults => "NO_MORE_RESULTS",
            Self::Unspecified => "UNSPECIFIED",
        }
    }

    pub fn from_wire(value: &str) -> ModelResult<Self> {
        match value {
            "NOT_FINISHED" => Ok(Self::NotFinished),
            "MORE_RESULTS_AFTER_LIMIT" => Ok(Self::MoreResultsAfterLimit),
            "MORE_RESULTS_AFTER_CURSOR" => Ok(Self::MoreResultsAfterCursor),
            "NO_MORE_RESULTS" => Ok(Self::NoMoreResults),
            "UNSPECIFIED" | "MORE_RESULTS_TYPE_UNSPECIFIED" => Ok(Self::Unspecified),
            other => Err(unknown("more results type", other)),
        }
    }

    pub fn has_more(self) -> bool {
        matches!(
            self,
            Self::NotFinished | Self::MoreResultsAfterLimit | Self::MoreResultsAfterCursor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_wire_strings() {
        assert_eq!(
            serde_json::to_value(PropertyFilterOperator::GreaterThanOrEqual).unwrap(),
            serde_json::json!("GREATER_THAN_OR_EQUAL")
        );
        assert_eq!(
            serde_json::to_value(CommitMode::NonTransactional).unwrap(),
            serde_json::json!(CommitMode::NonTransactional.as_str())
        );
        assert_eq!(
            serde_json::to_value(Operation::Upsert).unwrap(),
            serde_json::json!("upsert")
        );
    }

    #[test]
    fn service_unspecified_spellings_are_accepted() {
        assert_eq!(
            EntityResultType::from_wire("RESULT_TYPE_UNSPECIFIED").unwrap(),
            EntityResultType::Unspecified
        );
        assert_eq!(
            MoreResultsType::from_wire("MORE_RESULTS_TYPE_UNSPECIFIED").unwrap(),
            MoreResultsType::Unspecified
        );
        assert!(MoreResultsType::from_wire("SOMETIMES").is_err());
    }

    #[test]
    fn operator_parse_round_trips_every_variant() {
        for op in [
            PropertyFilterOperator::LessThan,
            PropertyFilterOperator::LessThanOrEqual,
            PropertyFilterOperator::GreaterThan,
            PropertyFilterOperator::GreaterThanOrEqual,
            PropertyFilterOperator::Equal,
            PropertyFilterOperator::HasAncestor,
            PropertyFilterOperator::NotEqual,
            PropertyFilterOperator::In,
            PropertyFilterOperator::NotIn,
        ] {
            assert_eq!(PropertyFilterOperator::from_wire(op.as_str()).unwrap(), op);
        }
    }
}
