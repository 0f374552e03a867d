//! Serves the quickstart tour.
//!
//! Run with:
//!   cargo run
//!
//! Try:
//!   curl http://localhost:5000/
//!   curl http://localhost:5000/post/42
//!   curl -i http://localhost:5000/projects
//!   curl -X POST -d 'username=mido&password=secret' http://localhost:5000/login_1
//!   curl -F 'the_file=@Cargo.toml' http://localhost:5000/upload_file
//!   curl http://localhost:5000/me2
//!
//! Settings come from `flagon.toml` and `FLAGON_*` variables, e.g.
//! `FLAGON_SERVER__PORT=8080`. `RUST_LOG` overrides the log level.

use flagon::config::Config;
use flagon::{Error, Server, logging, quickstart};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    logging::init(&config.logging.level);

    let app = quickstart::app(&config.app)?;

    for url in quickstart::url_examples(&app)? {
        println!("{url}");
    }

    Server::bind(config.socket_addr()?)
        .max_body(config.server.max_body_bytes)
        .serve(app)
        .await
}
