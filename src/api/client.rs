//! Request builder and response parser for the records collection.
//!
//! `RecordClient` holds only the collection URL. Each operation has a
//! `build_*` method producing an [`HttpRequest`]; responses are interpreted by
//! [`RecordClient::parse_list`] and [`RecordClient::parse_ack`].

use crate::api::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::api::{Record, RecordId, RecordInput};
use crate::error::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://67404657d0b59228b7ef578e.mockapi.io";
pub const DEFAULT_COLLECTION: &str = "Books";

/// Stateless client for one REST collection of records.
#[derive(Clone, Debug)]
pub struct RecordClient {
    collection_url: String,
}

impl RecordClient {
    /// `base_url` may carry a trailing slash; `collection` is the resource name.
    pub fn new(base_url: &str, collection: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let collection = collection.trim_matches('/');
        Self {
            collection_url: format!("{base}/{collection}"),
        }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: &RecordId) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    pub fn build_list(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.collection_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create(&self, input: &RecordInput) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.collection_url.clone(),
            headers: json_headers(),
            body: Some(encode(input)?),
        })
    }

    pub fn build_update(&self, id: &RecordId, input: &RecordInput) -> Result<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.item_url(id),
            headers: json_headers(),
            body: Some(encode(input)?),
        })
    }

    pub fn build_delete(&self, id: &RecordId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Decode the full record set from a list response.
    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Record>> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Accept any 2xx answer to a create, update or delete. The body is not read.
    pub fn parse_ack(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("Content-Type".to_string(), "application/json".to_string())]
}

fn encode(input: &RecordInput) -> Result<String> {
    serde_json::to_string(input).map_err(|e| ApiError::Encode(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RecordClient {
        RecordClient::new("http://localhost:3000", "Books")
    }

    #[test]
    fn list_is_a_bare_get_on_the_collection() {
        let req = client().build_list();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/Books");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn create_posts_json_body() {
        let req = client()
            .build_create(&RecordInput::new("Carol", "http://x/c.png"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/Books");
        assert_eq!(
            req.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Carol");
        assert_eq!(body["avatar"], "http://x/c.png");
    }

    #[test]
    fn update_puts_to_item_url() {
        let req = client()
            .build_update(&RecordId::new("42"), &RecordInput::new("Dan", "http://x/d.png"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/Books/42");
        assert!(req.body.is_some());
    }

    #[test]
    fn delete_has_no_body() {
        let req = client().build_delete(&RecordId::new("9"));
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/Books/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn slashes_are_normalized() {
        let c = RecordClient::new("http://localhost:3000/", "/Books/");
        assert_eq!(c.collection_url(), "http://localhost:3000/Books");
    }

    #[test]
    fn parse_list_decodes_array() {
        let resp = HttpResponse::new(
            200,
            r#"[{"id":"1","name":"Alice","avatar":"http://x/a.png"}]"#,
        );
        let records = client().parse_list(resp).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alice");
    }

    #[test]
    fn parse_list_rejects_non_array() {
        let err = client()
            .parse_list(HttpResponse::new(200, r#""Not found""#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_list_reports_status() {
        let err = client()
            .parse_list(HttpResponse::new(404, "Not found"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[test]
    fn ack_accepts_any_success_status() {
        assert!(client().parse_ack(HttpResponse::new(201, "{}")).is_ok());
        assert!(client().parse_ack(HttpResponse::new(200, "garbage")).is_ok());
        assert!(client().parse_ack(HttpResponse::new(500, "")).is_err());
    }
}
