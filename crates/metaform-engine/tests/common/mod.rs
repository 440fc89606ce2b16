//! Shared doubles and schema builders for engine integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use metaform_client::{operation_name, DataBackend, Error, IdProvider};
use metaform_core::{FieldDef, FieldKind, RelationshipDef, SchemaDef};

/// One backend call as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// `"query"` or `"mutate"`.
    pub kind: &'static str,
    /// Parsed operation name, e.g. `DeleteLineItem`.
    pub operation: String,
    pub variables: Value,
}

/// Backend double that records every call and replays scripted responses
/// in order. Running past the script yields a malformed-response error so
/// an unexpected extra call fails the test instead of hanging it.
pub struct MockBackend {
    responses: Mutex<VecDeque<Result<Value, Error>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue the next response.
    pub fn push_ok(&self, data: Value) {
        self.responses.lock().unwrap().push_back(Ok(data));
    }

    /// Queue the next response as a failure.
    pub fn push_err(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made through `query`.
    pub fn query_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == "query")
            .collect()
    }

    /// Calls made through `mutate`.
    pub fn mutation_calls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == "mutate")
            .collect()
    }

    fn next_response(
        &self,
        kind: &'static str,
        operation: &str,
        variables: Value,
    ) -> Result<Value, Error> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind,
            operation: operation_name(operation).unwrap_or(operation).to_string(),
            variables,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(Error::MalformedResponse(format!(
                    "no scripted response left for {operation}"
                )))
            })
    }
}

#[async_trait]
impl DataBackend for MockBackend {
    async fn query(&self, operation: &str, variables: Value) -> Result<Value, Error> {
        self.next_response("query", operation, variables)
    }

    async fn mutate(&self, operation: &str, variables: Value) -> Result<Value, Error> {
        self.next_response("mutate", operation, variables)
    }
}

/// Id provider yielding `gen-1`, `gen-2`, ... in call order.
pub struct SeqIdProvider(AtomicU64);

impl SeqIdProvider {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }
}

#[async_trait]
impl IdProvider for SeqIdProvider {
    async fn next_id(&self) -> String {
        format!("gen-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

pub fn invoice_schema() -> SchemaDef {
    SchemaDef::page("Invoice")
        .with_field(FieldDef::primary_key("id"))
        .with_field(FieldDef::new("total", FieldKind::Decimal))
        .with_relationship(RelationshipDef::one_to_many(
            "line_items",
            "LineItem",
            "invoice_id",
        ))
}

pub fn line_item_schema() -> SchemaDef {
    SchemaDef::component("LineItem")
        .with_field(FieldDef::primary_key("id"))
        .with_field(FieldDef::new("invoice_id", FieldKind::Uuid))
        .with_field(FieldDef::new("amount", FieldKind::Decimal))
}

pub fn invoice_related() -> BTreeMap<String, SchemaDef> {
    BTreeMap::from([("LineItem".to_string(), line_item_schema())])
}
