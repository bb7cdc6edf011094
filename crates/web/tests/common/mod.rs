#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, RgbImage};
use tempfile::TempDir;
use tower::ServiceExt;

use filmhub_core::types::DbId;
use filmhub_db::models::category::{Category, CreateCategory};
use filmhub_db::models::film::{CreateFilm, Film};
use filmhub_db::models::user::{CreateUser, User};
use filmhub_db::store::{MemoryStore, Store};
use filmhub_web::auth::password::hash_password;
use filmhub_web::auth::session::{create_session_token, SessionConfig, SESSION_COOKIE};
use filmhub_web::config::ServerConfig;
use filmhub_web::media::MediaStorage;
use filmhub_web::render::build_environment;
use filmhub_web::router::build_app_router;
use filmhub_web::state::AppState;

pub const PASSWORD: &str = "tangerine-kite-42";

/// Build a test `ServerConfig` with safe defaults and the given media root.
pub fn test_config(media_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        session: SessionConfig {
            secret: "test-secret-test-secret-test-secret".to_string(),
            expiry_hours: 1,
            cookie_secure: false,
        },
        media_root: media_root.to_path_buf(),
        max_upload_bytes: 1024 * 1024,
        password_min_length: 8,
        admin: None,
    }
}

/// The full application over an in-memory store and a temporary media root.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Arc<ServerConfig>,
    pub media: TempDir,
}

/// Build the full application router with all middleware layers.
///
/// Goes through `build_app_router` so tests exercise the same middleware
/// stack production uses.
pub fn build_test_app() -> TestApp {
    let media = tempfile::tempdir().expect("temp media dir");
    let config = Arc::new(test_config(media.path()));
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        store: store.clone(),
        config: config.clone(),
        templates: Arc::new(build_environment().expect("templates compile")),
        media: MediaStorage::new(media.path()),
    };

    TestApp {
        router: build_app_router(state),
        store,
        config,
        media,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn create_user(&self, username: &str, is_superuser: bool) -> User {
        self.store
            .create_user(&CreateUser {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: format!("{username}@example.com"),
                password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
                is_superuser,
            })
            .await
            .expect("user creation should succeed")
    }

    /// A client already carrying a session cookie for `user`.
    pub fn client_for(&self, user: &User) -> TestClient {
        let token = create_session_token(user.id, &user.username, &self.config.session)
            .expect("token should sign");
        let mut client = TestClient::new(self.router.clone());
        client.cookies.insert(SESSION_COOKIE.to_string(), token);
        client
    }

    pub fn anonymous(&self) -> TestClient {
        TestClient::new(self.router.clone())
    }

    pub async fn create_category(&self, name: &str, slug: &str) -> Category {
        self.store
            .create_category(&CreateCategory {
                name: name.to_string(),
                slug: slug.to_string(),
            })
            .await
            .expect("category creation should succeed")
    }

    /// Insert a film directly, bypassing the upload form.
    pub async fn create_film(
        &self,
        title: &str,
        author: &User,
        category_id: DbId,
        is_published: bool,
    ) -> Film {
        self.store
            .create_film(&CreateFilm {
                title: title.to_string(),
                description: format!("About {title}."),
                image: "film-images/placeholder.png".to_string(),
                is_published,
                category_id,
                author_id: author.id,
            })
            .await
            .expect("film creation should succeed")
    }

    pub async fn film(&self, id: DbId) -> Option<Film> {
        self.store.find_film(id).await.unwrap()
    }
}

// ---------------------------------------------------------------------------
// Client with a cookie jar
// ---------------------------------------------------------------------------

/// Sends requests through the router, keeping cookies between them like a
/// browser would. Redirects are not followed.
pub struct TestClient {
    router: Router,
    pub cookies: BTreeMap<String, String>,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            cookies: BTreeMap::new(),
        }
    }

    pub async fn send(
        &mut self,
        builder: axum::http::request::Builder,
        body: Body,
    ) -> Response<Body> {
        let builder = if self.cookies.is_empty() {
            builder
        } else {
            let header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder.header(COOKIE, header)
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        self.store_cookies(&response);
        response
    }

    fn store_cookies(&mut self, response: &Response<Body>) {
        for value in response.headers().get_all(SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            if raw.contains("Max-Age=0") {
                self.cookies.remove(name.trim());
            } else {
                self.cookies.insert(name.trim().to_string(), value.to_string());
            }
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().method(Method::GET).uri(uri), Body::empty())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
            .collect::<Vec<_>>()
            .join("&");
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(body),
        )
        .await
    }

    pub async fn post_multipart(&mut self, uri: &str, form: Multipart) -> Response<Body> {
        let (content_type, body) = form.finish();
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(CONTENT_TYPE, content_type),
            Body::from(body),
        )
        .await
    }

    /// GET a page and return its body, asserting it rendered.
    pub async fn page(&mut self, uri: &str) -> String {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        body_string(response).await
    }
}

fn urlencode(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "filmhub-test-boundary";

/// Minimal `multipart/form-data` body builder.
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}

/// A small PNG; different sizes give different bytes.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encoding a PNG should succeed");
    buf
}

/// A complete, valid film submission.
pub fn film_form(title: &str, category_id: DbId) -> Multipart {
    Multipart::new()
        .text("title", title)
        .text("description", &format!("About {title}."))
        .text("category", &category_id.to_string())
        .text("is_published", "on")
        .file("image", "poster.png", &png(2, 3))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).expect("body should be JSON")
}

/// Assert a 303 redirect and return its target.
pub fn redirect_target(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(LOCATION)
        .expect("redirect should have a location")
        .to_str()
        .unwrap()
        .to_string()
}
