// WAL record model and line encoding
//
// Each record is stored as one JSON object on its own line:
// {"transactionId":"...","operation":"INSERT","kdTreeObject":{...}}
// {"transactionId":"...","operation":"UPDATE","id":...,"data":...}
// {"transactionId":"...","operation":"DELETE","id":...}
//
// Fields that do not belong to the operation are omitted on write. On read
// they are ignored, and a missing required field is reported as an
// incomplete record rather than a parse error so replay can decide what to
// do with it.

use crate::id::{IdGenerator, TransactionId};
use geoassist_core::{Error, IndexObject, Operation, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single index mutation, carrying exactly the fields it needs
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation<T, O> {
    Insert(IndexObject<T, O>),
    Update { id: T, data: O },
    Delete { id: T },
}

impl<T, O> Mutation<T, O> {
    pub fn operation(&self) -> Operation {
        match self {
            Mutation::Insert(_) => Operation::Insert,
            Mutation::Update { .. } => Operation::Update,
            Mutation::Delete { .. } => Operation::Delete,
        }
    }
}

/// An immutable, self-identifying log record
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord<T, O> {
    transaction_id: TransactionId,
    mutation: Mutation<T, O>,
}

impl<T, O> TransactionRecord<T, O> {
    /// Create a record with an already-issued identifier
    pub fn new(transaction_id: TransactionId, mutation: Mutation<T, O>) -> Self {
        Self {
            transaction_id,
            mutation,
        }
    }

    /// Create an INSERT record
    pub fn for_insert<G>(ids: &G, object: IndexObject<T, O>) -> Result<Self>
    where
        G: IdGenerator + ?Sized,
    {
        Ok(Self::new(ids.next_id()?, Mutation::Insert(object)))
    }

    /// Create an UPDATE record
    pub fn for_update<G>(ids: &G, id: T, data: O) -> Result<Self>
    where
        G: IdGenerator + ?Sized,
    {
        Ok(Self::new(ids.next_id()?, Mutation::Update { id, data }))
    }

    /// Create a DELETE record
    pub fn for_delete<G>(ids: &G, id: T) -> Result<Self>
    where
        G: IdGenerator + ?Sized,
    {
        Ok(Self::new(ids.next_id()?, Mutation::Delete { id }))
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn operation(&self) -> Operation {
        self.mutation.operation()
    }

    pub fn mutation(&self) -> &Mutation<T, O> {
        &self.mutation
    }

    /// The inserted object; `None` unless this is an INSERT
    pub fn index_object(&self) -> Option<&IndexObject<T, O>> {
        match &self.mutation {
            Mutation::Insert(object) => Some(object),
            _ => None,
        }
    }

    /// The target identifier; `None` for INSERT, whose id lives in the object
    pub fn id(&self) -> Option<&T> {
        match &self.mutation {
            Mutation::Update { id, .. } | Mutation::Delete { id } => Some(id),
            Mutation::Insert(_) => None,
        }
    }

    /// The new payload; `None` unless this is an UPDATE
    pub fn data(&self) -> Option<&O> {
        match &self.mutation {
            Mutation::Update { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn into_mutation(self) -> Mutation<T, O> {
        self.mutation
    }
}

impl<T: Serialize, O: Serialize> TransactionRecord<T, O> {
    /// Encode the record as a single JSON line (without the line terminator)
    ///
    /// Objects with a NaN or infinite coordinate are rejected: JSON has no
    /// representation for them and the line could not be decoded again.
    pub fn encode(&self) -> Result<String> {
        if let Some(object) = self.index_object() {
            let point = object.point();
            if !point.is_finite() {
                return Err(Error::Serialization(format!(
                    "Failed to serialize record {}: coordinates ({}, {}) are not finite",
                    self.transaction_id,
                    point.latitude(),
                    point.longitude()
                )));
            }
        }

        let line = RecordLineRef {
            transaction_id: &self.transaction_id,
            operation: self.operation(),
            kd_tree_object: self.index_object(),
            id: self.id(),
            data: self.data(),
        };

        serde_json::to_string(&line)
            .map_err(|e| Error::Serialization(format!("Failed to serialize record: {}", e)))
    }
}

impl<T: DeserializeOwned, O: DeserializeOwned> TransactionRecord<T, O> {
    /// Decode a record from one log line
    pub fn decode(line: &str) -> Result<Self> {
        let RecordLine {
            transaction_id,
            operation,
            kd_tree_object,
            id,
            data,
        } = serde_json::from_str::<RecordLine<T, O>>(line)
            .map_err(|e| Error::Serialization(format!("Failed to deserialize record: {}", e)))?;

        let operation: Operation = operation.parse()?;
        let incomplete = || Error::IncompleteRecord {
            operation,
            record: transaction_id.to_string(),
        };

        let mutation = match operation {
            Operation::Insert => Mutation::Insert(kd_tree_object.ok_or_else(incomplete)?),
            Operation::Update => match (id, data) {
                (Some(id), Some(data)) => Mutation::Update { id, data },
                _ => return Err(incomplete()),
            },
            Operation::Delete => Mutation::Delete {
                id: id.ok_or_else(incomplete)?,
            },
        };

        Ok(Self::new(transaction_id, mutation))
    }
}

impl<T, O> fmt::Display for TransactionRecord<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation(), self.transaction_id)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordLineRef<'a, T, O> {
    transaction_id: &'a TransactionId,
    operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    kd_tree_object: Option<&'a IndexObject<T, O>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a O>,
}

// The operation is kept as a plain string so that names outside the closed
// set surface as UnknownOperation instead of a generic parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordLine<T, O> {
    transaction_id: TransactionId,
    operation: String,
    kd_tree_object: Option<IndexObject<T, O>>,
    id: Option<T>,
    data: Option<O>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use geoassist_core::Point;

    type Record = TransactionRecord<String, String>;

    fn object(id: &str, data: &str) -> IndexObject<String, String> {
        IndexObject::new(id.to_string(), data.to_string(), Point::new(10.0, 20.0))
    }

    #[test]
    fn test_factory_field_patterns() {
        let ids = SequentialIdGenerator::new();

        let insert = Record::for_insert(&ids, object("a", "x")).unwrap();
        assert_eq!(insert.operation(), Operation::Insert);
        assert!(insert.index_object().is_some());
        assert!(insert.id().is_none());
        assert!(insert.data().is_none());

        let update = Record::for_update(&ids, "b".to_string(), "y".to_string()).unwrap();
        assert_eq!(update.operation(), Operation::Update);
        assert!(update.index_object().is_none());
        assert_eq!(update.id().map(String::as_str), Some("b"));
        assert_eq!(update.data().map(String::as_str), Some("y"));

        let delete = Record::for_delete(&ids, "c".to_string()).unwrap();
        assert_eq!(delete.operation(), Operation::Delete);
        assert!(delete.index_object().is_none());
        assert_eq!(delete.id().map(String::as_str), Some("c"));
        assert!(delete.data().is_none());
    }

    #[test]
    fn test_factories_issue_increasing_ids() {
        let ids = SequentialIdGenerator::new();
        let first = Record::for_delete(&ids, "a".to_string()).unwrap();
        let second = Record::for_delete(&ids, "a".to_string()).unwrap();

        assert!(second.transaction_id() > first.transaction_id());
    }

    #[test]
    fn test_round_trip_keeps_field_pattern() {
        let ids = SequentialIdGenerator::new();
        let records = vec![
            Record::for_insert(&ids, object("a", "x")).unwrap(),
            Record::for_update(&ids, "b".to_string(), "y".to_string()).unwrap(),
            Record::for_delete(&ids, "c".to_string()).unwrap(),
        ];

        for record in records {
            let line = record.encode().unwrap();
            assert!(!line.contains('\n'));

            let decoded = Record::decode(&line).unwrap();
            assert_eq!(decoded.operation(), record.operation());
            assert_eq!(decoded.index_object().is_some(), record.index_object().is_some());
            assert_eq!(decoded.id().is_some(), record.id().is_some());
            assert_eq!(decoded.data().is_some(), record.data().is_some());
            assert_eq!(decoded, record);
        }
    }

    #[test]
    fn test_encoded_field_names() {
        let ids = SequentialIdGenerator::new();

        let insert = Record::for_insert(&ids, object("a", "x")).unwrap().encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&insert).unwrap();
        assert_eq!(value["transactionId"], "00000001");
        assert_eq!(value["operation"], "INSERT");
        assert_eq!(value["kdTreeObject"]["id"], "a");
        assert!(value.get("id").is_none());
        assert!(value.get("data").is_none());

        let delete = Record::for_delete(&ids, "c".to_string()).unwrap().encode().unwrap();
        assert_eq!(
            delete,
            r#"{"transactionId":"00000002","operation":"DELETE","id":"c"}"#
        );
    }

    #[test]
    fn test_encode_rejects_non_finite_point() {
        let ids = SequentialIdGenerator::new();

        for point in [
            Point::new(f64::NAN, 1.0),
            Point::new(1.0, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NAN),
        ] {
            let object = IndexObject::new("a".to_string(), "x".to_string(), point);
            let record = Record::for_insert(&ids, object).unwrap();
            assert!(matches!(record.encode(), Err(Error::Serialization(_))));
        }
    }

    #[test]
    fn test_decode_update_missing_data() {
        let err = Record::decode(r#"{"transactionId":"01","operation":"UPDATE","id":"a"}"#)
            .unwrap_err();

        match err {
            Error::IncompleteRecord { operation, record } => {
                assert_eq!(operation, Operation::Update);
                assert_eq!(record, "01");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_decode_null_fields_are_absent() {
        let err = Record::decode(
            r#"{"transactionId":"01","operation":"DELETE","id":null,"data":null}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteRecord {
                operation: Operation::Delete,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_insert_without_object() {
        let err = Record::decode(r#"{"transactionId":"01","operation":"INSERT","id":"a"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::IncompleteRecord {
                operation: Operation::Insert,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_unknown_operation() {
        let err = Record::decode(r#"{"transactionId":"01","operation":"MERGE","id":"a"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(ref op) if op == "MERGE"));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            Record::decode("not json").unwrap_err(),
            Error::Serialization(_)
        ));
        assert!(matches!(
            Record::decode(r#"{"operation":"DELETE","id":"a"}"#).unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn test_decode_ignores_foreign_fields() {
        let record = Record::decode(
            r#"{"transactionId":"01","operation":"DELETE","id":"a","data":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(record.into_mutation(), Mutation::Delete { id: "a".to_string() });
    }

    #[test]
    fn test_display() {
        let record = Record::new(
            TransactionId::from("07".to_string()),
            Mutation::Delete { id: "a".to_string() },
        );
        assert_eq!(record.to_string(), "DELETE 07");
    }
}
