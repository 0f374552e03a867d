//! Layered configuration.
//!
//! Defaults, then an optional `flagon.toml` in the working directory, then
//! `FLAGON_*` environment variables (`FLAGON_SERVER__PORT=8080`).

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Error;
use crate::server::DEFAULT_MAX_BODY;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

/// Settings the application reads while serving requests.
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Overrides the application's built-in signing secret.
    pub secret_key: Option<String>,
    pub template_folder: PathBuf,
    /// `None` disables the `static` endpoint.
    pub static_folder: Option<PathBuf>,
    pub static_url_path: String,
    /// Where the upload demo stores the received file.
    pub upload_path: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.max_body_bytes", DEFAULT_MAX_BODY as u64)?
            .set_default("app.template_folder", "templates")?
            .set_default("app.static_folder", "static")?
            .set_default("app.static_url_path", "/static")?
            .set_default("app.upload_path", "/tmp/upload_file.txt")?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name("flagon").required(false))
            .add_source(config::Environment::with_prefix("FLAGON").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid address: {e}")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_owned(),
                port: 5000,
                max_body_bytes: DEFAULT_MAX_BODY,
            },
            app: AppConfig::default(),
            logging: LoggingConfig { level: "info".to_owned() },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            template_folder: PathBuf::from("templates"),
            static_folder: Some(PathBuf::from("static")),
            static_url_path: "/static".to_owned(),
            upload_path: PathBuf::from("/tmp/upload_file.txt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults() {
        let config = Config::load().unwrap();
        assert_eq!(config.app.static_url_path, "/static");
        assert_eq!(config.app.template_folder, PathBuf::from("templates"));
        assert_eq!(config.server.max_body_bytes, DEFAULT_MAX_BODY);
    }

    #[test]
    fn rejects_bad_address() {
        let mut config = Config::default();
        config.server.host = "not an address".to_owned();
        assert!(matches!(config.socket_addr(), Err(Error::Config(_))));
        config.server.host = "0.0.0.0".to_owned();
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
    }
}
