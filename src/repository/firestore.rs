//! Firestore Document Store
//!
//! Talks to the Cloud Firestore REST API (v1). Documents are translated
//! between plain JSON and Firestore's typed `Value` encoding. The live feed
//! polls `runQuery` and only emits when the ordered snapshot changed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use crate::config::FirestoreConfig;
use crate::domain::{DomainError, DomainResult};
use super::subscription::{feed, Subscription};
use super::traits::{Document, DocumentSnapshot, DocumentStore, OrderBy};

/// Firestore REST client
#[derive(Clone)]
pub struct FirestoreStore {
    config: FirestoreConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    document: Option<RawDocument>,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> DomainResult<Self> {
        if config.project_id.trim().is_empty() {
            return Err(DomainError::Config("Firestore project id is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// `projects/{p}/databases/{d}/documents`
    fn documents_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id, self.config.database
        )
    }

    fn url(&self, suffix: &str) -> String {
        format!(
            "{}/{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.documents_path(),
            suffix
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.config.api_key {
            Some(key) => builder.query(&[("key", key.as_str())]),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> DomainResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::NotFound(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::remote_status(status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn add(&self, collection: &str, data: Document) -> DomainResult<String> {
        let url = self.url(&format!("/{}", collection));
        let body = json!({ "fields": encode_fields(&data) });
        let response = self.send(self.request(Method::POST, &url).json(&body)).await?;

        let created: RawDocument = response.json().await?;
        document_id(&created.name)
    }

    async fn update(&self, collection: &str, id: &str, data: Document) -> DomainResult<()> {
        let url = self.url(&format!("/{}/{}", collection, id));
        let mut params: Vec<(&str, &str)> = data
            .keys()
            .map(|field| ("updateMask.fieldPaths", field.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let body = json!({ "fields": encode_fields(&data) });
        self.send(self.request(Method::PATCH, &url).query(&params).json(&body))
            .await?;
        Ok(())
    }

    async fn array_union(&self, collection: &str, id: &str, field: &str, values: Vec<Value>) -> DomainResult<()> {
        let url = self.url(":commit");
        let values: Vec<Value> = values.iter().map(encode_value).collect();
        let body = json!({
            "writes": [{
                "transform": {
                    "document": format!("{}/{}/{}", self.documents_path(), collection, id),
                    "fieldTransforms": [{
                        "fieldPath": field,
                        "appendMissingElements": { "values": values }
                    }]
                },
                "currentDocument": { "exists": true }
            }]
        });
        self.send(self.request(Method::POST, &url).json(&body)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DomainResult<()> {
        let url = self.url(&format!("/{}/{}", collection, id));
        match self.send(self.request(Method::DELETE, &url)).await {
            Ok(_) | Err(DomainError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn query(&self, collection: &str, order: &OrderBy) -> DomainResult<Vec<DocumentSnapshot>> {
        let url = self.url(":runQuery");
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "orderBy": [{
                    "field": { "fieldPath": order.field },
                    "direction": if order.descending { "DESCENDING" } else { "ASCENDING" }
                }]
            }
        });
        let response = self.send(self.request(Method::POST, &url).json(&body)).await?;
        let rows: Vec<RunQueryRow> = response.json().await?;

        rows.into_iter()
            .filter_map(|row| row.document)
            .map(|doc| {
                Ok(DocumentSnapshot {
                    id: document_id(&doc.name)?,
                    data: decode_fields(&doc.fields)?,
                })
            })
            .collect()
    }

    fn watch(&self, collection: &str, order: OrderBy) -> Subscription {
        let (sender, subscription) = feed();
        let store = self.clone();
        let collection = collection.to_string();
        let period = Duration::from_millis(self.config.poll_interval_ms.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last: Option<Vec<DocumentSnapshot>> = None;
            let mut failing = false;

            loop {
                tokio::select! {
                    _ = sender.closed() => break,
                    _ = interval.tick() => {}
                }

                let event = match store.query(&collection, &order).await {
                    Ok(docs) => {
                        failing = false;
                        if last.as_ref() == Some(&docs) {
                            continue;
                        }
                        last = Some(docs.clone());
                        Ok(docs)
                    }
                    Err(e) => {
                        // the first good poll after a failure is always sent
                        last = None;
                        if failing {
                            continue;
                        }
                        failing = true;
                        log::error!("Error polling {}: {}", collection, e);
                        Err(e)
                    }
                };
                if !sender.send(event).await {
                    break;
                }
            }
            log::debug!("Feed on {} ({}) closed", collection, order);
        });

        subscription
    }
}

/// Last path segment of a document resource name
fn document_id(name: &str) -> DomainResult<String> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DomainError::remote(format!("unexpected document name: {}", name)))
}

pub fn encode_fields(data: &Document) -> Value {
    Value::Object(
        data.iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

/// Plain JSON -> Firestore typed value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or(0.0) })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> DomainResult<Document> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Firestore typed value -> plain JSON
pub fn decode_value(value: &Value) -> DomainResult<Value> {
    let (kind, inner) = value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .ok_or_else(|| DomainError::remote(format!("malformed value: {}", value)))?;

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", v) => Ok(Value::Bool(v.as_bool().unwrap_or(false))),
        ("integerValue", v) => {
            let parsed = match v {
                Value::String(s) => s.parse::<i64>().ok(),
                other => other.as_i64(),
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| DomainError::remote(format!("bad integer: {}", v)))
        }
        ("doubleValue", v) => Ok(v
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        ("stringValue", v) | ("timestampValue", v) | ("referenceValue", v) | ("bytesValue", v) => {
            Ok(Value::String(v.as_str().unwrap_or_default().to_string()))
        }
        ("geoPointValue", v) => Ok(v.clone()),
        ("arrayValue", v) => {
            let items = v
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<DomainResult<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(items))
        }
        ("mapValue", v) => {
            let fields = v
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Object(fields))
        }
        (kind, _) => Err(DomainError::remote(format!("unsupported value type: {}", kind))),
    }
}
