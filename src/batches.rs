//! Batch (folder) lookup and creation.
//!
//! Batches group media files on the service side. Callers usually address
//! them by name, so the main entry point is the lookup-or-create resolution
//! of a name to an id.

use serde::Deserialize;

use crate::client::{Envelope, ThreePlay};
use crate::error::{Error, Result};

/// A named batch of media files.
#[derive(Debug, Clone, Deserialize)]
pub struct Batch {
    /// Server-assigned identifier
    pub id: i64,
    /// Batch name; not guaranteed unique server-side
    pub name: String,
}

impl ThreePlay {
    /// Resolves a batch name to its id, creating the batch if none exists.
    ///
    /// Lookup takes the first match, since batch names are not unique on the
    /// service. The check-then-create pair is not atomic: two callers
    /// resolving the same new name concurrently can both see "not found" and
    /// both create a batch. The service offers no upsert and this client
    /// adds no lock, so that duplicate is an accepted risk.
    pub async fn batch_id(&self, name: &str) -> Result<i64> {
        match self.find_batch(name).await {
            Ok(batch) => Ok(batch.id),
            Err(Error::NotFound { .. }) => self.create_batch(name).await,
            Err(e) => Err(e),
        }
    }

    /// Creates a new batch and returns its id.
    pub async fn create_batch(&self, name: &str) -> Result<i64> {
        tracing::debug!("Creating batch \"{name}\"");
        let params = [("name", name.to_string())];
        let envelope: Envelope<Batch> = self.post("/batches", &params, None).await?;
        Ok(envelope.data.id)
    }

    /// Looks up a batch by exact name; first match wins.
    async fn find_batch(&self, name: &str) -> Result<Batch> {
        let params = [("name", name.to_string())];
        let envelope: Envelope<Vec<Batch>> = self.get("/batches", &params).await?;

        envelope
            .data
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound {
                resource: "batch",
                lookup: format!("name={name}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ThreePlay {
        ThreePlay::new("test-key").with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_batch_id_returns_existing_match_without_creating() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/batches"))
            .and(query_param("name", "Lectures"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 5, "name": "Lectures"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 99, "name": "Lectures"}
            })))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert_eq!(client.batch_id("Lectures").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_batch_id_takes_the_first_of_duplicate_names() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 5, "name": "Lectures"}, {"id": 8, "name": "Lectures"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert_eq!(client.batch_id("Lectures").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_batch_id_creates_when_lookup_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/batches"))
            .and(query_param("name", "Webinars"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 9, "name": "Webinars"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        assert_eq!(client.batch_id("Webinars").await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_batch_id_is_idempotent_after_creating() {
        let server = MockServer::start().await;

        // First lookup misses; after creation the lookup finds the batch.
        Mock::given(method("GET"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": 9, "name": "Webinars"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 9, "name": "Webinars"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let first = client.batch_id("Webinars").await.unwrap();
        let second = client.batch_id("Webinars").await.unwrap();

        assert_eq!(first, 9);
        assert_eq!(second, 9);
    }

    #[tokio::test]
    async fn test_batch_lookup_transport_failure_is_not_masked() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/batches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": 9, "name": "Webinars"}
            })))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client.batch_id("Webinars").await;

        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
