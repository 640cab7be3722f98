/*
 * Content hashing for embedded image assets. Images are stored in workspace
 * containers under `Pictures/<hash>`, where the hash is the SHA256 of the
 * image bytes, so identical images are stored once.
 */
use sha2::{Digest, Sha256};

/*
 * Calculates the SHA256 checksum of a byte buffer and returns it as a
 * hex-encoded string.
 */
pub fn calculate_sha256_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let hex_checksum = format!("{:x}", hasher.finalize());
    log::trace!(
        "ChecksumUtils: Calculated checksum {} for {} bytes",
        hex_checksum,
        bytes.len()
    );
    hex_checksum
}

/*
 * Derives the logical asset name for an image: its checksum followed by the
 * given extension (without the dot). An empty extension yields the bare hash.
 */
pub fn asset_name_for(bytes: &[u8], extension: &str) -> String {
    let hash = calculate_sha256_checksum(bytes);
    if extension.is_empty() {
        hash
    } else {
        format!("{hash}.{extension}")
    }
}
