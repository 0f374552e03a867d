use tracing::{debug, error, warn};

use crate::Request;

/// Emits one record at each of three levels.
pub async fn logger(_req: Request) -> &'static str {
    debug!("A value for debugging");
    warn!("A warning occurred ({} apples)", 42);
    error!("An error occurred");
    "hello"
}
