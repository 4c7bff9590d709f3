//! Firestore REST backend.
//!
//! Speaks the Firestore v1 REST API directly: typed value mapping, `commit`
//! writes with field transforms (server timestamps, counter allocation) and
//! `runQuery` structured queries. Document ids are minted client-side, the
//! same way the vendor SDKs do for auto-id references.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cf_core::document::{
    Collection, Direction, Document, DocumentQuery, DocumentWrite, StoredValue, WriteValue,
};
use cf_core::traits::DocumentStore;
use errors::StorageError;

const BACKEND: &str = "firestore";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for a Firestore project. `base_url` is overridable so
/// tests and the emulator can stand in for the hosted service.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub base_url: String,
    pub bearer_token: Option<String>,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: "(default)".to_string(),
            base_url: "https://firestore.googleapis.com/v1".to_string(),
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

pub struct FirestoreStore {
    http: reqwest::Client,
    config: FirestoreConfig,
}

impl FirestoreStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StorageError::Connection {
                backend: BACKEND.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/{}",
            self.config.project_id, self.config.database_id
        )
    }

    fn document_name(&self, collection: Collection, id: &str) -> String {
        format!(
            "{}/documents/{}/{}",
            self.database_path(),
            collection.as_str(),
            id
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn commit(&self, writes: Vec<ApiWrite>) -> Result<CommitResponse, StorageError> {
        let url = format!("{}/{}/documents:commit", self.config.base_url, self.database_path());
        tracing::debug!(writes = writes.len(), "firestore commit");
        let response = self
            .request(self.http.post(&url))
            .json(&CommitRequest { writes })
            .send()
            .await
            .map_err(|e| StorageError::Connection {
                backend: BACKEND.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::WriteRejected {
                backend: BACKEND.to_string(),
                reason: format!("commit returned {status}: {body}"),
            });
        }

        response
            .json::<CommitResponse>()
            .await
            .map_err(|e| StorageError::Serialization {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    type Error = StorageError;

    async fn create(
        &self,
        collection: Collection,
        write: DocumentWrite,
    ) -> Result<String, Self::Error> {
        let id = Uuid::new_v4().simple().to_string();
        let name = self.document_name(collection, &id);
        let (fields, transforms) = split_write(&write);

        self.commit(vec![ApiWrite {
            update: Some(ApiDocument {
                name: Some(name),
                fields,
            }),
            update_mask: None,
            update_transforms: transforms,
            current_document: Some(ApiPrecondition {
                exists: Some(false),
            }),
        }])
        .await?;

        Ok(id)
    }

    async fn read(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, Self::Error> {
        let url = format!(
            "{}/{}",
            self.config.base_url,
            self.document_name(collection, id)
        );
        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| StorageError::Connection {
                backend: BACKEND.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Request {
                backend: BACKEND.to_string(),
                reason: format!("get returned {status}: {body}"),
            });
        }

        let api_doc: ApiDocument =
            response
                .json()
                .await
                .map_err(|e| StorageError::Serialization {
                    reason: e.to_string(),
                })?;
        Ok(Some(decode_document(collection, &api_doc)?))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
    ) -> Result<(), Self::Error> {
        let name = self.document_name(collection, id);
        let (fields, transforms) = split_write(&write);
        let field_paths: Vec<String> = fields.keys().cloned().collect();

        self.commit(vec![ApiWrite {
            update: Some(ApiDocument {
                name: Some(name),
                fields,
            }),
            update_mask: Some(ApiFieldMask {
                field_paths,
            }),
            update_transforms: transforms,
            current_document: Some(ApiPrecondition { exists: Some(true) }),
        }])
        .await?;

        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        query: DocumentQuery,
    ) -> Result<Vec<Document>, Self::Error> {
        let url = format!(
            "{}/{}/documents:runQuery",
            self.config.base_url,
            self.database_path()
        );
        let structured_query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: collection.as_str().to_string(),
            }],
            filter: query.filter.as_ref().map(|filter| QueryFilter {
                field_filter: FieldFilter {
                    field: FieldReference {
                        field_path: filter.field.clone(),
                    },
                    op: "EQUAL".to_string(),
                    value: encode_stored(&filter.value),
                },
            }),
            order_by: query.order_by.as_ref().map(|order| {
                vec![QueryOrder {
                    field: FieldReference {
                        field_path: order.field.clone(),
                    },
                    direction: match order.direction {
                        Direction::Ascending => "ASCENDING".to_string(),
                        Direction::Descending => "DESCENDING".to_string(),
                    },
                }]
            }),
            limit: query.limit.map(|l| l as i64),
        };

        let response = self
            .request(self.http.post(&url))
            .json(&RunQueryRequest { structured_query })
            .send()
            .await
            .map_err(|e| StorageError::Connection {
                backend: BACKEND.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Request {
                backend: BACKEND.to_string(),
                reason: format!("runQuery returned {status}: {body}"),
            });
        }

        let items: Vec<RunQueryItem> =
            response
                .json()
                .await
                .map_err(|e| StorageError::Serialization {
                    reason: e.to_string(),
                })?;

        let mut docs = Vec::new();
        for item in items {
            if let Some(api_doc) = item.document {
                docs.push(decode_document(collection, &api_doc)?);
            }
        }
        Ok(docs)
    }

    async fn allocate(&self, counter: &str, floor: i64) -> Result<i64, Self::Error> {
        let name = self.document_name(Collection::Counters, counter);
        // One commit, two writes against the counter document: raise the
        // value to the floor, then increment. Firestore applies the writes of
        // a commit atomically and in order; the second transform result is
        // the allocated value.
        let writes = vec![
            ApiWrite {
                update: Some(ApiDocument {
                    name: Some(name.clone()),
                    fields: BTreeMap::new(),
                }),
                update_mask: Some(ApiFieldMask {
                    field_paths: Vec::new(),
                }),
                update_transforms: vec![ApiFieldTransform {
                    field_path: cf_core::document::fields::VALUE.to_string(),
                    set_to_server_value: None,
                    increment: None,
                    maximum: Some(ApiValue::integer(floor)),
                }],
                current_document: None,
            },
            ApiWrite {
                update: Some(ApiDocument {
                    name: Some(name),
                    fields: BTreeMap::new(),
                }),
                update_mask: Some(ApiFieldMask {
                    field_paths: Vec::new(),
                }),
                update_transforms: vec![ApiFieldTransform {
                    field_path: cf_core::document::fields::VALUE.to_string(),
                    set_to_server_value: None,
                    increment: Some(ApiValue::integer(1)),
                    maximum: None,
                }],
                current_document: None,
            },
        ];

        let response = self.commit(writes).await?;
        let allocated = response
            .write_results
            .get(1)
            .and_then(|result| result.transform_results.first())
            .and_then(|value| value.integer_value.as_deref())
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or_else(|| StorageError::Serialization {
                reason: "commit response carried no counter transform result".to_string(),
            })?;
        Ok(allocated)
    }
}

fn encode_stored(value: &StoredValue) -> ApiValue {
    match value {
        StoredValue::Str(s) => ApiValue::string(s.clone()),
        StoredValue::Int(i) => ApiValue::integer(*i),
        StoredValue::Time(t) => ApiValue::timestamp(*t),
    }
}

fn split_write(write: &DocumentWrite) -> (BTreeMap<String, ApiValue>, Vec<ApiFieldTransform>) {
    let mut fields = BTreeMap::new();
    let mut transforms = Vec::new();
    for (name, value) in write.fields() {
        match value {
            WriteValue::Str(s) => {
                fields.insert(name.to_string(), ApiValue::string(s.clone()));
            }
            WriteValue::Int(i) => {
                fields.insert(name.to_string(), ApiValue::integer(*i));
            }
            WriteValue::ServerTime => transforms.push(ApiFieldTransform {
                field_path: name.to_string(),
                set_to_server_value: Some("REQUEST_TIME".to_string()),
                increment: None,
                maximum: None,
            }),
        }
    }
    (fields, transforms)
}

fn decode_document(collection: Collection, api_doc: &ApiDocument) -> Result<Document, StorageError> {
    let name = api_doc.name.as_deref().unwrap_or_default();
    let id = name.rsplit('/').next().unwrap_or_default().to_string();
    if id.is_empty() {
        return Err(StorageError::Decode {
            collection: collection.as_str().to_string(),
            reason: format!("document name {name:?} has no id segment"),
        });
    }

    let mut fields = BTreeMap::new();
    for (field, value) in &api_doc.fields {
        fields.insert(field.clone(), decode_value(collection, field, value)?);
    }
    Ok(Document::new(collection, id, fields))
}

fn decode_value(
    collection: Collection,
    field: &str,
    value: &ApiValue,
) -> Result<StoredValue, StorageError> {
    if let Some(s) = &value.string_value {
        return Ok(StoredValue::Str(s.clone()));
    }
    if let Some(raw) = &value.integer_value {
        let parsed = raw.parse::<i64>().map_err(|e| StorageError::Decode {
            collection: collection.as_str().to_string(),
            reason: format!("field {field}: bad integer {raw:?}: {e}"),
        })?;
        return Ok(StoredValue::Int(parsed));
    }
    if let Some(raw) = &value.timestamp_value {
        let parsed = DateTime::parse_from_rfc3339(raw).map_err(|e| StorageError::Decode {
            collection: collection.as_str().to_string(),
            reason: format!("field {field}: bad timestamp {raw:?}: {e}"),
        })?;
        return Ok(StoredValue::Time(parsed.with_timezone(&Utc)));
    }
    Err(StorageError::Decode {
        collection: collection.as_str().to_string(),
        reason: format!("field {field}: unsupported value kind"),
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    integer_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_value: Option<String>,
}

impl ApiValue {
    fn string(value: String) -> Self {
        Self {
            string_value: Some(value),
            ..Self::default()
        }
    }

    // Firestore carries 64-bit integers as JSON strings.
    fn integer(value: i64) -> Self {
        Self {
            integer_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    fn timestamp(value: DateTime<Utc>) -> Self {
        Self {
            timestamp_value: Some(value.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, ApiValue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiWrite {
    #[serde(skip_serializing_if = "Option::is_none")]
    update: Option<ApiDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    update_mask: Option<ApiFieldMask>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    update_transforms: Vec<ApiFieldTransform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_document: Option<ApiPrecondition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiFieldMask {
    field_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiFieldTransform {
    field_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    set_to_server_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    increment: Option<ApiValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    maximum: Option<ApiValue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPrecondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitRequest {
    writes: Vec<ApiWrite>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<ApiWriteResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiWriteResult {
    #[serde(default)]
    transform_results: Vec<ApiValue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryRequest {
    structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StructuredQuery {
    from: Vec<CollectionSelector>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    filter: Option<QueryFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<Vec<QueryOrder>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionSelector {
    collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryFilter {
    field_filter: FieldFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldFilter {
    field: FieldReference,
    op: String,
    value: ApiValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldReference {
    field_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryOrder {
    field: FieldReference,
    direction: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunQueryItem {
    #[serde(default)]
    document: Option<ApiDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::document::fields;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> FirestoreStore {
        FirestoreStore::new(
            FirestoreConfig::new("demo-project").with_base_url(server.uri()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_commits_with_exists_precondition_and_server_time_transform() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/projects/demo-project/databases/(default)/documents:commit",
            ))
            .and(body_partial_json(json!({
                "writes": [{
                    "currentDocument": { "exists": false },
                    "updateTransforms": [{
                        "fieldPath": "createdAt",
                        "setToServerValue": "REQUEST_TIME"
                    }]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "writeResults": [{}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        let id = store
            .create(
                Collection::Timelines,
                DocumentWrite::new()
                    .with(fields::NUMBER, WriteValue::Int(1))
                    .with(fields::CREATED_AT, WriteValue::ServerTime),
            )
            .await
            .unwrap();
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn read_decodes_values_and_maps_missing_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/projects/demo-project/databases/(default)/documents/notes/n1",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo-project/databases/(default)/documents/notes/n1",
                "fields": {
                    "title": { "stringValue": "T" },
                    "number": { "integerValue": "7" },
                    "createdAt": { "timestampValue": "2026-03-01T10:00:00Z" }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(
                "/projects/demo-project/databases/(default)/documents/notes/gone",
            ))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let doc = store.read(Collection::Notes, "n1").await.unwrap().unwrap();
        assert_eq!(doc.id(), "n1");
        assert_eq!(doc.str("title"), Some("T"));
        assert_eq!(doc.int("number"), Some(7));
        assert!(doc.time("createdAt").is_some());

        assert!(store.read(Collection::Notes, "gone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_sends_structured_query_and_decodes_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/projects/demo-project/databases/(default)/documents:runQuery",
            ))
            .and(body_partial_json(json!({
                "structuredQuery": {
                    "from": [{ "collectionId": "timelines" }],
                    "orderBy": [{
                        "field": { "fieldPath": "number" },
                        "direction": "DESCENDING"
                    }],
                    "limit": 1
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "document": {
                        "name": "projects/demo-project/databases/(default)/documents/timelines/t2",
                        "fields": { "number": { "integerValue": "2" } }
                    }
                },
                { "readTime": "2026-03-01T10:00:00Z" }
            ])))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let docs = store
            .query(
                Collection::Timelines,
                DocumentQuery::new()
                    .order_by(fields::NUMBER, Direction::Descending)
                    .limit(1),
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), "t2");
        assert_eq!(docs[0].int(fields::NUMBER), Some(2));
    }

    #[tokio::test]
    async fn allocate_reads_the_second_transform_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/projects/demo-project/databases/(default)/documents:commit",
            ))
            .and(body_partial_json(json!({
                "writes": [
                    { "updateTransforms": [{ "fieldPath": "value", "maximum": { "integerValue": "2" } }] },
                    { "updateTransforms": [{ "fieldPath": "value", "increment": { "integerValue": "1" } }] }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "writeResults": [
                    { "transformResults": [{ "integerValue": "2" }] },
                    { "transformResults": [{ "integerValue": "3" }] }
                ]
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let allocated = store.allocate("timelineNumber", 2).await.unwrap();
        assert_eq!(allocated, 3);
    }

    #[tokio::test]
    async fn rejected_commit_surfaces_as_write_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/projects/demo-project/databases/(default)/documents:commit",
            ))
            .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store
            .create(Collection::Timelines, DocumentWrite::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::WriteRejected { .. }));
    }
}
