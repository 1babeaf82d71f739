//! Identifier generation for catalog records.

use chrono::Utc;
use rand::Rng;

/// Generates a record identifier: `prefix`, the current epoch milliseconds and
/// a 64-bit random draw, all as decimal digits (e.g. `prod_17292...`).
///
/// Uniqueness is enforced by the stores (regenerate on clash in the file store,
/// a unique index in Postgres); the random width keeps clashes out of reach
/// even for concurrent creates within the same millisecond.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let nonce: u64 = rand::thread_rng().gen();
    format!("{prefix}{millis}{nonce}")
}

/// Epoch milliseconds, used for identifier and upload key prefixes.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
