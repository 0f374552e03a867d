//! In-process test client.
//!
//! Requests go straight into [`App::handle`], no socket involved. Cookies set
//! by responses are remembered and sent with later requests, so login flows
//! can be driven end to end.
//!
//! ```rust,no_run
//! # async fn run(app: flagon::App) {
//! use flagon::testing::TestClient;
//!
//! let mut client = TestClient::new(app);
//! let response = client.get("/").await;
//! assert_eq!(response.status(), flagon::StatusCode::OK);
//! # }
//! ```

use bytes::Bytes;
use cookie::{Cookie, CookieJar};
use http::{HeaderMap, StatusCode, header};
use serde::de::DeserializeOwned;

use crate::app::App;

const BOUNDARY: &str = "flagon-test-boundary";

pub struct TestClient {
    app: App,
    jar: CookieJar,
}

impl TestClient {
    pub fn new(app: App) -> Self {
        Self { app, jar: CookieJar::new() }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(http::Method::GET, uri, None, Bytes::new()).await
    }

    pub async fn head(&mut self, uri: &str) -> TestResponse {
        self.send(http::Method::HEAD, uri, None, Bytes::new()).await
    }

    /// POSTs `fields` as `application/x-www-form-urlencoded`.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = form_urlencoded::Serializer::new(String::new()).extend_pairs(fields).finish();
        self.send(
            http::Method::POST,
            uri,
            Some("application/x-www-form-urlencoded"),
            Bytes::from(body),
        )
        .await
    }

    /// POSTs one file as `multipart/form-data`.
    pub async fn post_file(
        &mut self,
        uri: &str,
        field: &str,
        filename: &str,
        content: &[u8],
    ) -> TestResponse {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        self.send(http::Method::POST, uri, Some(&content_type), Bytes::from(body)).await
    }

    /// Sends a request with any method.
    pub async fn send(
        &mut self,
        method: http::Method,
        uri: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> TestResponse {
        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let cookies: Vec<String> =
            self.jar.iter().map(|c| format!("{}={}", c.name(), c.value())).collect();
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies.join("; "));
        }
        let request = builder.body(body).expect("test request should be well-formed");

        let response = self.app.handle(request).await;
        let (parts, body) = response.into_parts();

        for value in parts.headers.get_all(header::SET_COOKIE) {
            let Some(cookie) = value.to_str().ok().and_then(|v| Cookie::parse(v).ok()) else {
                continue;
            };
            let cookie = cookie.into_owned();
            if cookie.max_age().is_some_and(|age| age.is_zero()) {
                self.jar.remove(Cookie::from(cookie.name().to_owned()));
            } else {
                self.jar.add(cookie);
            }
        }

        TestResponse { status: parts.status, headers: parts.headers, body }
    }

    /// The value of a cookie the client currently holds.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.jar.get(name).map(Cookie::value)
    }
}

pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}
