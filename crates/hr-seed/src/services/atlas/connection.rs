//! Connection management for the Atlas cluster

use mongodb::bson::doc;
use mongodb::error::{Error, ErrorKind};
use mongodb::Client;

use crate::services::document_store::StoreError;

/// Connect and ping the `admin` database. Any failure here is a connection failure.
pub async fn connect(uri: &str) -> Result<Client, StoreError> {
  let client = Client::with_uri_str(uri)
    .await
    .map_err(|e| StoreError::Connection(format!("invalid connection string or options: {e}")))?;

  client
    .database("admin")
    .run_command(doc! { "ping": 1 })
    .await
    .map_err(|e| StoreError::Connection(format!("ping failed: {e}")))?;

  Ok(client)
}

/// Map a driver error from a running operation. Losing the server is fatal for
/// the whole run; anything else only affects the operation that hit it.
pub fn classify(operation: &'static str, error: Error) -> StoreError {
  if is_connection_failure(&error) {
    StoreError::Connection(error.to_string())
  } else {
    StoreError::Operation { operation, reason: error.to_string() }
  }
}

fn is_connection_failure(error: &Error) -> bool {
  matches!(
    error.kind.as_ref(),
    ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. }
  )
}
