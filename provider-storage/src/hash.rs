//! Content checksums

use bridge_traits::error::{BridgeError, Result};
use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::io::AsyncReadExt;

const READ_CHUNK: usize = 64 * 1024;

/// Lowercase hex SHA-1 of the file at `path`, read in chunks
pub async fn sha1_hex(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await.map_err(|e| {
        BridgeError::OperationFailed(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; READ_CHUNK];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
