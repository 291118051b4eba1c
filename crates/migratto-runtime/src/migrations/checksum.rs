use std::fs::File;
use std::path::Path;

use sha2::{Digest, Sha256};

use migratto_core::error::{MigrattoError, Result};

/// Compute the SHA-256 checksum of a file, as lowercase hex.
///
/// The file is streamed through the hasher in fixed-size chunks.
pub fn compute(path: &Path) -> Result<String> {
    let checksum_error = |source| MigrattoError::Checksum {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(checksum_error)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(checksum_error)?;

    Ok(hex::encode(hasher.finalize()))
}

/// Compute the SHA-256 checksum of in-memory content, as lowercase hex.
pub fn of_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
