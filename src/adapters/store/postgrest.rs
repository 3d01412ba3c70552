//! PostgREST store implementation
//!
//! Talks to the REST interface Supabase (and any PostgREST server) exposes for
//! a table: `GET` with `column=eq.value` filters, `POST` for inserts and
//! `PATCH` for updates, each asking for the affected rows back with
//! `Prefer: return=representation`.

use super::traits::{RemoteStore, StoreResult};
use crate::config::{SecretString, StoreConfig};
use crate::domain::{
    DosebookError, DrugPatch, DrugRecord, NewDrugRecord, PatientKey, RecordId, Result, StoreError,
};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// PostgREST-backed [`RemoteStore`]
///
/// # Example
///
/// ```no_run
/// use dosebook::adapters::store::{PostgrestStore, RemoteStore};
/// use dosebook::config::StoreConfig;
/// use dosebook::domain::PatientKey;
///
/// # async fn example() -> dosebook::domain::Result<()> {
/// let config = StoreConfig {
///     base_url: "https://abc.supabase.co".to_string(),
///     ..Default::default()
/// };
/// let store = PostgrestStore::new(&config)?;
/// let rows = store.query(&PatientKey::new("P1").unwrap()).await?;
/// println!("{} rows", rows.len());
/// # Ok(())
/// # }
/// ```
pub struct PostgrestStore {
    client: Client,
    collection: String,
    collection_url: String,
    api_key: Option<SecretString>,
}

impl PostgrestStore {
    /// Create a store from configuration
    ///
    /// No timeout is applied unless `timeout_seconds` is set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new();

        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for the store");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            DosebookError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            collection: config.collection.clone(),
            collection_url: config.collection_url(),
            api_key: config.api_key.clone(),
        })
    }

    /// URL of the collection endpoint
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => {
                let key = key.expose_secret().as_ref();
                request
                    .header("apikey", key)
                    .header("Authorization", format!("Bearer {key}"))
            }
            None => request,
        }
    }

    /// Send a request whose response body is a JSON array of rows
    async fn send_rows(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> StoreResult<Vec<DrugRecord>> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Timeout(e.to_string())
                } else if e.is_builder() {
                    StoreError::InvalidRequest(e.to_string())
                } else {
                    StoreError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(
                operation,
                status = status.as_u16(),
                body = %body,
                "Store rejected request"
            );
            return Err(StoreError::Backend {
                status: status.as_u16(),
                message: body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&body).map_err(|e| {
            StoreError::InvalidResponse(format!("{operation}: cannot decode rows: {e}"))
        })
    }
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn query(&self, ptkey: &PatientKey) -> StoreResult<Vec<DrugRecord>> {
        tracing::debug!(collection = %self.collection, ptkey = %ptkey, "Querying rows");

        let request = self
            .client
            .get(&self.collection_url)
            .query(&[("select", "*".to_string()), ("ptkey", format!("eq.{ptkey}"))]);

        self.send_rows(request, "query").await
    }

    async fn insert(&self, rows: &[NewDrugRecord]) -> StoreResult<Vec<DrugRecord>> {
        tracing::debug!(collection = %self.collection, count = rows.len(), "Inserting rows");

        let request = self
            .client
            .post(&self.collection_url)
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(rows);

        self.send_rows(request, "insert").await
    }

    async fn update(&self, id: RecordId, patch: &DrugPatch) -> StoreResult<Vec<DrugRecord>> {
        tracing::debug!(collection = %self.collection, id = %id, "Updating row");

        let request = self
            .client
            .patch(&self.collection_url)
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .header("Prefer", "return=representation")
            .json(patch);

        self.send_rows(request, "update").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::DrugFields;
    use mockito::Matcher;

    fn store_for(server: &mockito::ServerGuard) -> PostgrestStore {
        let config = StoreConfig {
            base_url: server.url(),
            api_key: Some(secret_string("anon-key".to_string())),
            ..Default::default()
        };
        PostgrestStore::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_query_filters_by_patient_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/drugs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("ptkey".into(), "eq.P1".into()),
            ]))
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .with_status(200)
            .with_body(
                r#"[{"id":1,"ptkey":"P1","name":"Insulin","dose":5,"time":"2024-01-01","notes":""}]"#,
            )
            .create_async()
            .await;

        let store = store_for(&server);
        let rows = store.query(&PatientKey::new("P1").unwrap()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fields.name, "Insulin");
        assert_eq!(rows[0].fields.dose, Some(5.0));
    }

    #[tokio::test]
    async fn test_insert_posts_array_and_asks_for_representation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/drugs")
            .match_query(Matcher::UrlEncoded("select".into(), "*".into()))
            .match_header("prefer", "return=representation")
            .match_body(Matcher::Json(serde_json::json!([
                {"ptkey":"P1","name":"Insulin","dose":4.0,"time":"2024-01-05","notes":""}
            ])))
            .with_status(201)
            .with_body(
                r#"[{"id":11,"ptkey":"P1","name":"Insulin","dose":4,"time":"2024-01-05","notes":""}]"#,
            )
            .create_async()
            .await;

        let store = store_for(&server);
        let payload = NewDrugRecord::new(
            PatientKey::new("P1").unwrap(),
            DrugFields::named("Insulin")
                .with_dose(4.0)
                .with_time("2024-01-05"),
        );
        let rows = store.insert(&[payload]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(rows[0].id.get(), 11);
    }

    #[tokio::test]
    async fn test_update_targets_single_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/rest/v1/drugs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "eq.7".into()),
                Matcher::UrlEncoded("select".into(), "*".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let store = store_for(&server);
        let patch = DrugPatch::from(&DrugFields::named("Insulin"));
        let rows = store
            .update(RecordId::new(7).unwrap(), &patch)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_backend_error_keeps_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"code":"42501","message":"permission denied for table drugs"}"#;
        server
            .mock("GET", "/rest/v1/drugs")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(body)
            .create_async()
            .await;

        let store = store_for(&server);
        let err = store
            .query(&PatientKey::new("P1").unwrap())
            .await
            .unwrap_err();

        match err {
            StoreError::Backend { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, body);
            }
            other => panic!("Expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/drugs")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"not":"a list"}"#)
            .create_async()
            .await;

        let store = store_for(&server);
        let err = store
            .query(&PatientKey::new("P1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_failure() {
        let config = StoreConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let store = PostgrestStore::new(&config).unwrap();
        let err = store
            .query(&PatientKey::new("P1").unwrap())
            .await
            .unwrap_err();
        assert!(!err.is_backend());
    }
}
