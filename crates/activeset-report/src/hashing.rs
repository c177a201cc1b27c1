use activeset_types::Result;
use sha2::{Digest, Sha256};

/// Hash reference (hex-encoded SHA256)
pub type HashRef = String;

/// Compute SHA256 hash of data
pub fn compute_hash(data: &[u8]) -> HashRef {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Compute hash of JSON-serialized data
pub fn compute_json_hash<T: serde::Serialize>(data: &T) -> Result<HashRef> {
    let json = serde_json::to_vec(data)?;
    Ok(compute_hash(&json))
}
