//! Content digests for verification and logging
//!
//! Every fetched file gets a SHA-256 digest that is logged alongside
//! the write and recomputable from the stored bytes.

use ring::digest::{Context, SHA256};

/// Compute the lowercase hex SHA-256 digest of `data`.
pub fn compute_digest(data: &[u8]) -> String {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    hex::encode(digest.as_ref())
}
