//! API client for communicating with the Live CMS REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests to the posts, media, users, and taxonomies endpoints.

use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{AuthManager, TokenStore};
use crate::config::Config;
use crate::models::{
    Media, MediaUpdate, MediaUpload, Meta, NewPost, Page, Post, PostUpdate, Taxonomy, User,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix for the versioned API
const API_PREFIX: &str = "/api/v1";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Response envelopes
// ============================================================================

#[derive(Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<Post>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Deserialize)]
struct PostEnvelope {
    post: Post,
}

#[derive(Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct TaxonomiesEnvelope {
    #[serde(default)]
    taxonomies: Vec<Taxonomy>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Deserialize)]
struct TaxonomyEnvelope {
    taxonomy: Taxonomy,
}

#[derive(Deserialize)]
struct MediaListEnvelope {
    #[serde(default)]
    media: Vec<Media>,
    #[serde(default)]
    meta: Meta,
}

#[derive(Deserialize)]
struct MediaEnvelope {
    media: Media,
}

/// Response from the unversioned /health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub version: String,
}

/// API client for the Live CMS server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the auth manager is shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    media_base_url: String,
    auth: AuthManager,
}

impl ApiClient {
    /// Create a new API client and its session authority.
    pub fn new(config: &Config, store: TokenStore) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let auth = AuthManager::new(http.clone(), config.api_base_url.clone(), store);

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            media_base_url: config.media_base().to_string(),
            auth,
        })
    }

    /// The session authority backing this client.
    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    /// Resolve a media path to a fetchable URL. Absolute URLs pass
    /// through untouched; relative paths are joined to the media base
    /// with exactly one slash.
    pub fn media_url(&self, media_path: &str) -> String {
        if media_path.starts_with("http") {
            return media_path.to_string();
        }
        let clean = media_path.trim_start_matches('/');
        format!("{}/{}", self.media_base_url.trim_end_matches('/'), clean)
    }

    // ===== Request core =====

    /// Send a request with the current bearer token, running the
    /// refresh-and-retry cycle at most once on a 401.
    async fn request<F>(&self, make: F) -> Result<reqwest::Response, ApiError>
    where
        F: Fn(&Client) -> reqwest::RequestBuilder,
    {
        let send = |token: Option<String>| {
            let mut builder = make(&self.http);
            if let Some(token) = token {
                builder = builder.bearer_auth(token);
            }
            builder.send()
        };

        let response = send(self.auth.access_token()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Unauthenticated response, attempting token refresh");
            if !self.auth.refresh_access_token().await {
                return Err(ApiError::AuthenticationRequired);
            }
            // Exactly one resend; its outcome is final either way
            let retry = send(self.auth.access_token()).await?;
            return Self::check(retry).await;
        }

        Self::check(response).await
    }

    /// Check if a response is successful, mapping failures to the error
    /// taxonomy with status and body.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|err| ApiError::InvalidResponse(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.request(|http| http.get(&url)).await?;
        Self::parse(response).await
    }

    async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.request(|http| http.get(&url).query(query)).await?;
        Self::parse(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.request(|http| http.post(&url).json(body)).await?;
        Self::parse(response).await
    }

    async fn put_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.request(|http| http.put(&url).json(body)).await?;
        Self::parse(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.request(|http| http.delete(&url)).await?;
        Ok(())
    }

    // ===== Posts =====

    pub async fn list_posts(&self) -> Result<Page<Post>, ApiError> {
        let envelope: PostsEnvelope = self.get_json("/posts").await?;
        Ok(Page {
            data: envelope.posts,
            meta: envelope.meta,
        })
    }

    pub async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        let envelope: PostEnvelope = self.get_json(&format!("/posts/{}", id)).await?;
        Ok(envelope.post)
    }

    pub async fn posts_by_user(&self, user_id: i64) -> Result<Page<Post>, ApiError> {
        let envelope: PostsEnvelope = self.get_json(&format!("/posts/user/{}", user_id)).await?;
        Ok(Page {
            data: envelope.posts,
            meta: envelope.meta,
        })
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        let envelope: PostEnvelope = self.post_json("/posts", post).await?;
        Ok(envelope.post)
    }

    pub async fn update_post(&self, id: i64, update: &PostUpdate) -> Result<Post, ApiError> {
        let envelope: PostEnvelope = self.put_json(&format!("/posts/{}", id), update).await?;
        Ok(envelope.post)
    }

    pub async fn delete_post(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/posts/{}", id)).await
    }

    pub async fn post_taxonomies(&self, id: i64) -> Result<Vec<Taxonomy>, ApiError> {
        let envelope: TaxonomiesEnvelope =
            self.get_json(&format!("/posts/{}/taxonomies", id)).await?;
        Ok(envelope.taxonomies)
    }

    // ===== Users =====

    pub async fn list_users(&self) -> Result<Page<User>, ApiError> {
        let envelope: UsersEnvelope = self.get_json("/users").await?;
        Ok(Page {
            data: envelope.users,
            meta: envelope.meta,
        })
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.get_json(&format!("/users/{}", id)).await?;
        Ok(envelope.user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self
            .get_json(&format!("/users/username/{}", username))
            .await?;
        Ok(envelope.user)
    }

    // ===== Taxonomies =====

    pub async fn list_taxonomies(&self) -> Result<Page<Taxonomy>, ApiError> {
        let envelope: TaxonomiesEnvelope = self.get_json("/taxonomies").await?;
        Ok(Page {
            data: envelope.taxonomies,
            meta: envelope.meta,
        })
    }

    pub async fn get_taxonomy(&self, id: i64) -> Result<Taxonomy, ApiError> {
        let envelope: TaxonomyEnvelope = self.get_json(&format!("/taxonomies/{}", id)).await?;
        Ok(envelope.taxonomy)
    }

    pub async fn popular_taxonomies(&self) -> Result<Page<Taxonomy>, ApiError> {
        let envelope: TaxonomiesEnvelope = self.get_json("/taxonomies/popular").await?;
        Ok(Page {
            data: envelope.taxonomies,
            meta: envelope.meta,
        })
    }

    pub async fn search_taxonomies(&self, query: &str) -> Result<Page<Taxonomy>, ApiError> {
        let envelope: TaxonomiesEnvelope = self
            .get_json_with_query("/taxonomies/search", &[("q", query)])
            .await?;
        Ok(Page {
            data: envelope.taxonomies,
            meta: envelope.meta,
        })
    }

    // ===== Media =====

    pub async fn list_media(&self) -> Result<Page<Media>, ApiError> {
        let envelope: MediaListEnvelope = self.get_json("/media").await?;
        Ok(Page {
            data: envelope.media,
            meta: envelope.meta,
        })
    }

    pub async fn get_media(&self, id: i64) -> Result<Media, ApiError> {
        let envelope: MediaEnvelope = self.get_json(&format!("/media/{}", id)).await?;
        Ok(envelope.media)
    }

    pub async fn popular_media(&self) -> Result<Page<Media>, ApiError> {
        let envelope: MediaListEnvelope = self.get_json("/media/popular").await?;
        Ok(Page {
            data: envelope.media,
            meta: envelope.meta,
        })
    }

    pub async fn search_media(&self, query: &str) -> Result<Page<Media>, ApiError> {
        let envelope: MediaListEnvelope = self
            .get_json_with_query("/media/search", &[("q", query)])
            .await?;
        Ok(Page {
            data: envelope.media,
            meta: envelope.meta,
        })
    }

    /// Upload a media file as multipart/form-data. The form is rebuilt
    /// if the refresh-retry cycle needs a resend.
    pub async fn upload_media(&self, upload: &MediaUpload) -> Result<Media, ApiError> {
        let url = self.url("/media");
        let response = self
            .request(|http| http.post(&url).multipart(Self::upload_form(upload)))
            .await?;
        let envelope: MediaEnvelope = Self::parse(response).await?;
        Ok(envelope.media)
    }

    fn upload_form(upload: &MediaUpload) -> reqwest::multipart::Form {
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.filename.clone());
        // An unparseable mime string falls back to an untyped part
        let part = match part.mime_str(&upload.mime_type) {
            Ok(part) => part,
            Err(_) => reqwest::multipart::Part::bytes(upload.bytes.clone())
                .file_name(upload.filename.clone()),
        };

        let mut form = reqwest::multipart::Form::new()
            .text("name", upload.name.clone())
            .text("description", upload.description.clone())
            .text("alt", upload.alt.clone())
            .part("file", part);
        if let Some(post_id) = upload.post_id {
            form = form.text("post_id", post_id.to_string());
        }
        form
    }

    pub async fn update_media(&self, id: i64, update: &MediaUpdate) -> Result<Media, ApiError> {
        let envelope: MediaEnvelope = self.put_json(&format!("/media/{}", id), update).await?;
        Ok(envelope.media)
    }

    pub async fn delete_media(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/media/{}", id)).await
    }

    // ===== Health =====

    /// Probe the unversioned health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let url = format!("{}/health", self.base_url);
        let response = self.request(|http| http.get(&url)).await?;
        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::Session;

    fn sample_post() -> serde_json::Value {
        json!({
            "id": 1,
            "title": "Hello World",
            "description": "First post",
            "content": "Welcome to the CMS",
            "user_id": 1,
            "username": "alice",
            "url": "hello-world",
            "created_at": "2025-07-27T21:28:00Z",
            "changed_at": "2025-07-27T21:28:00Z"
        })
    }

    fn client_with_session(server_uri: &str, dir: &Path, session: Session) -> ApiClient {
        TokenStore::new(dir.to_path_buf())
            .save(&session)
            .expect("seed session");
        let config = Config {
            api_base_url: server_uri.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, TokenStore::new(dir.to_path_buf())).expect("client should build")
    }

    fn session_with_tokens(access: &str, refresh: Option<&str>) -> Session {
        Session {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(str::to_string),
            user: None,
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_response_refreshes_and_resends_once() {
        let server = MockServer::start().await;
        // The stale token gets rejected
        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .and(header("authorization", "Bearer A1"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "token expired"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "A2"})))
            .expect(1)
            .mount(&server)
            .await;
        // The resend with the rotated token succeeds
        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .and(header("authorization", "Bearer A2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "posts": [sample_post()],
                "meta": {"count": 1, "limit": 10, "offset": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let client =
            client_with_session(&server.uri(), dir.path(), session_with_tokens("A1", Some("R1")));

        let page = client.list_posts().await.expect("resend should succeed");
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].title, "Hello World");
        assert_eq!(page.meta.count, 1);
        assert_eq!(client.auth().access_token().as_deref(), Some("A2"));
    }

    #[tokio::test]
    async fn test_unauthenticated_without_refresh_token_fails_without_resend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "token expired"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let client =
            client_with_session(&server.uri(), dir.path(), session_with_tokens("A1", None));

        let err = client.list_posts().await.expect_err("should fail");
        assert!(matches!(err, ApiError::AuthenticationRequired));
        // One original request, no refresh, no resend
        assert_eq!(
            server
                .received_requests()
                .await
                .expect("request recording enabled")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_second_unauthenticated_response_is_a_hard_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/posts"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"error": "token expired"})),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "A2"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let client =
            client_with_session(&server.uri(), dir.path(), session_with_tokens("A1", Some("R1")));

        let err = client.list_posts().await.expect_err("should fail");
        assert!(matches!(err, ApiError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_anonymous_requests_carry_no_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/taxonomies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "taxonomies": [{"id": 1, "name": "news", "description": ""}],
                "meta": {"count": 1, "limit": 10, "offset": 0, "total": 1}
            })))
            .mount(&server)
            .await;

        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, TokenStore::disabled()).expect("client");

        let page = client.list_taxonomies().await.expect("list should succeed");
        assert_eq!(page.data[0].name, "news");
        assert_eq!(page.meta.total, 1);

        let requests = server
            .received_requests()
            .await
            .expect("request recording enabled");
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_search_sends_query_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/media/search"))
            .and(query_param("q", "banner"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "media": [],
                "meta": {"count": 0, "limit": 10, "offset": 0, "total": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, TokenStore::disabled()).expect("client");

        let page = client.search_media("banner").await.expect("search");
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_maps_to_typed_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/posts/42"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "post not found"})),
            )
            .mount(&server)
            .await;

        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let client = ApiClient::new(&config, TokenStore::disabled()).expect("client");

        let err = client.get_post(42).await.expect_err("should be not found");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_media_url_joining() {
        let config = Config {
            api_base_url: "http://localhost:8080".to_string(),
            media_base_url: Some("http://cdn.example.com/".to_string()),
            ..Config::default()
        };
        let client = ApiClient::new(&config, TokenStore::disabled()).expect("client");

        assert_eq!(
            client.media_url("uploads/a.png"),
            "http://cdn.example.com/uploads/a.png"
        );
        assert_eq!(
            client.media_url("/uploads/a.png"),
            "http://cdn.example.com/uploads/a.png"
        );
        assert_eq!(
            client.media_url("https://elsewhere.example/b.png"),
            "https://elsewhere.example/b.png"
        );
    }
}
