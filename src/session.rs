//! Signed-cookie sessions.
//!
//! The whole session lives client-side in one cookie named `session`: a JSON
//! object, base64url encoded, signed with the application's secret key
//! through `cookie`'s signed jar. A cookie that fails verification is
//! treated as no session at all.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use cookie::{Cookie, CookieJar, Key};
use http::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::error::Error;
use crate::request::parse_cookies;
use crate::response::Response;

pub(crate) const SESSION_COOKIE: &str = "session";

/// Minimum secret length accepted for signing keys.
pub(crate) const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Default)]
struct State {
    data: Map<String, Value>,
    modified: bool,
    had_cookie: bool,
}

/// The per-client key/value mapping.
///
/// Cloning is cheap and every clone sees the same data: the dispatcher keeps
/// one to write the cookie back after the handler has run.
#[derive(Clone, Debug, Default)]
pub struct Session {
    state: Arc<Mutex<State>>,
}

impl Session {
    /// Reads and verifies the session cookie from request headers.
    pub(crate) fn load(headers: &HeaderMap, key: &Key) -> Self {
        let mut jar = CookieJar::new();
        for cookie in parse_cookies(headers) {
            jar.add_original(cookie);
        }

        let had_cookie = jar.get(SESSION_COOKIE).is_some();
        let data = jar
            .signed(key)
            .get(SESSION_COOKIE)
            .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
            .and_then(|bytes| serde_json::from_slice::<Map<String, Value>>(&bytes).ok());

        if had_cookie && data.is_none() {
            debug!("ignoring session cookie that failed verification");
        }

        Self {
            state: Arc::new(Mutex::new(State {
                data: data.unwrap_or_default(),
                modified: false,
                had_cookie,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.lock();
        let value = state.data.get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().data.contains_key(key)
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: T) -> Result<(), Error> {
        let value = serde_json::to_value(value)?;
        let mut state = self.lock();
        state.data.insert(key.to_owned(), value);
        state.modified = true;
        Ok(())
    }

    /// Removes `key`, returning its raw value if it was set.
    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.lock();
        let removed = state.data.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        if !state.data.is_empty() {
            state.data.clear();
            state.modified = true;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().data.is_empty()
    }

    /// Writes a modified session back to the client. An emptied session
    /// deletes the cookie.
    pub(crate) fn save(&self, key: &Key, response: &mut Response) {
        let state = self.lock();
        if !state.modified {
            return;
        }

        if state.data.is_empty() {
            if state.had_cookie {
                let mut removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
                removal.make_removal();
                response.set_cookie(removal);
            }
            return;
        }

        let payload = match serde_json::to_vec(&state.data) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "could not serialise session");
                return;
            }
        };

        let mut jar = CookieJar::new();
        jar.signed_mut(key).add(
            Cookie::build((SESSION_COOKIE, URL_SAFE_NO_PAD.encode(payload)))
                .path("/")
                .http_only(true),
        );
        for cookie in jar.delta() {
            response.set_cookie(cookie.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Key {
        Key::derive_from(&[7u8; MIN_SECRET_LEN])
    }

    fn headers_from(response: &Response) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let set_cookie = response.header("set-cookie").expect("session cookie");
        let pair = set_cookie.split(';').next().unwrap();
        headers.insert(http::header::COOKIE, pair.parse().unwrap());
        headers
    }

    #[test]
    fn round_trips_through_a_signed_cookie() {
        let key = key();
        let session = Session::load(&HeaderMap::new(), &key);
        assert!(session.is_empty());
        session.insert("username", "mido").unwrap();

        let mut response = Response::html("");
        session.save(&key, &mut response);

        let restored = Session::load(&headers_from(&response), &key);
        assert_eq!(restored.get::<String>("username").as_deref(), Some("mido"));
    }

    #[test]
    fn rejects_cookies_signed_with_another_key() {
        let key = key();
        let session = Session::load(&HeaderMap::new(), &key);
        session.insert("username", "mido").unwrap();
        let mut response = Response::html("");
        session.save(&key, &mut response);

        let other = Key::derive_from(&[9u8; MIN_SECRET_LEN]);
        let restored = Session::load(&headers_from(&response), &other);
        assert!(restored.is_empty());
    }

    #[test]
    fn untouched_session_writes_nothing() {
        let key = key();
        let session = Session::load(&HeaderMap::new(), &key);
        let mut response = Response::html("");
        session.save(&key, &mut response);
        assert!(response.header("set-cookie").is_none());
    }

    #[test]
    fn clear_drops_everything_and_the_cookie() {
        let key = key();
        let session = Session::load(&HeaderMap::new(), &key);
        session.insert("username", "mido").unwrap();
        session.insert("theme", "dark").unwrap();
        let mut response = Response::html("");
        session.save(&key, &mut response);

        let restored = Session::load(&headers_from(&response), &key);
        assert!(restored.contains_key("theme"));
        restored.clear();
        assert!(restored.is_empty());
        assert!(!restored.contains_key("username"));

        let mut response = Response::html("");
        restored.save(&key, &mut response);
        let removal = response.header("set-cookie").unwrap();
        assert!(removal.starts_with("session=;"));
        assert!(removal.contains("Max-Age=0"));
    }

    #[test]
    fn clearing_an_empty_session_writes_nothing() {
        let key = key();
        let session = Session::load(&HeaderMap::new(), &key);
        session.clear();
        let mut response = Response::html("");
        session.save(&key, &mut response);
        assert!(response.header("set-cookie").is_none());
    }

    #[test]
    fn emptied_session_removes_cookie() {
        let key = key();
        let session = Session::load(&HeaderMap::new(), &key);
        session.insert("username", "mido").unwrap();
        let mut response = Response::html("");
        session.save(&key, &mut response);

        let restored = Session::load(&headers_from(&response), &key);
        assert!(restored.remove("username").is_some());
        let mut response = Response::html("");
        restored.save(&key, &mut response);
        let removal = response.header("set-cookie").unwrap();
        assert!(removal.starts_with("session=;"));
        assert!(removal.contains("Max-Age=0"));
    }
}
