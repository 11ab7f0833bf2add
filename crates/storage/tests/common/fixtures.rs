use bytes::Bytes;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data as hex string
#[allow(dead_code)]
pub fn sha256_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Deterministic pseudo-random bytes; the same seed always yields the same output.
#[allow(dead_code)]
pub fn seeded_bytes(seed: u64, len: usize) -> Bytes {
    let mut data = vec![0u8; len];
    let mut state = seed;

    for chunk in data.chunks_mut(8) {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let bytes = state.to_le_bytes();
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte = bytes[i % 8];
        }
    }

    Bytes::from(data)
}

/// Object key the icon resolver would use for this payload.
#[allow(dead_code)]
pub fn icon_key(data: &[u8]) -> String {
    format!("{}.png", sha256_hash(data))
}
