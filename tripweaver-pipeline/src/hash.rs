//! Content hashing for cache keys and persistence metadata.
//!
//! Hashes cover a canonical serialisation: collections are sorted by
//! identifier before hashing so input order never changes the key. The
//! cache key additionally folds in the trip id and the algorithm
//! version, so engine upgrades invalidate old entries on their own.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tripweaver_core::{ALGORITHM_VERSION, OptimisationRequest};

/// Content hashes of one optimisation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHash {
    /// Hash of the sorted place list.
    pub places_hash: String,
    /// Hash of the settings block.
    pub settings_hash: String,
    /// Cache key combining trip id, places, preferences, settings, and
    /// the algorithm version.
    pub cache_key: String,
}

/// Hash a request's optimisation-relevant content.
///
/// # Errors
/// Propagates `serde_json` serialisation failures.
pub fn content_hash(request: &OptimisationRequest) -> Result<ContentHash, serde_json::Error> {
    let mut places = request.places.clone();
    places.sort_by(|a, b| a.id.cmp(&b.id));
    let mut preferences = request.preferences.clone();
    preferences.sort_by(|a, b| {
        (a.member_id.as_str(), a.place_id.as_str()).cmp(&(b.member_id.as_str(), b.place_id.as_str()))
    });

    let places_hash = sha256_json(&places)?;
    let preferences_hash = sha256_json(&preferences)?;
    let settings_hash = sha256_json(&request.settings)?;

    let mut digest = Sha256::new();
    digest.update(request.trip_id.as_bytes());
    digest.update(places_hash.as_bytes());
    digest.update(preferences_hash.as_bytes());
    digest.update(settings_hash.as_bytes());
    digest.update(ALGORITHM_VERSION.as_bytes());
    let cache_key = hex::encode(digest.finalize());

    Ok(ContentHash {
        places_hash,
        settings_hash,
        cache_key,
    })
}

fn sha256_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(value)?;
    Ok(hex::encode(Sha256::digest(bytes)))
}
