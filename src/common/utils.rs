//! Utility functions for minigfs

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::time::Duration;

/// Percent-encoding set for chunk file names (includes /, %, \, and control chars)
const NAME_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'\\')
    .add(b'%')
    .add(b' ')
    .add(b'?')
    .add(b'#')
    .add(b'&');

/// Encode a chunk handle for filesystem usage
pub fn encode_key(key: &str) -> String {
    let encoded = utf8_percent_encode(key, NAME_ENCODE_SET).to_string();
    // "." and ".." would otherwise name directories
    match encoded.as_str() {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => encoded,
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Retry with a fixed delay between attempts.
///
/// Retryable errors are retried until `attempts` is exhausted and the last
/// one is returned. Any other error is returned immediately.
pub async fn retry_with_delay<F, Fut, T>(
    mut f: F,
    attempts: usize,
    delay: Duration,
) -> crate::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = crate::Result<T>>,
{
    let mut last_err = crate::Error::Internal("no attempts made".into());

    for attempt in 1..=attempts {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                tracing::warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                last_err = e;
                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_err)
}

/// Validate a file path (must be non-empty, reasonable length)
pub fn validate_path(path: &str) -> crate::Result<()> {
    if path.is_empty() {
        return Err(crate::Error::MissingParam("file"));
    }

    if path.len() > 1024 {
        return Err(crate::Error::BadRequest(
            "path too long (max 1024 bytes)".into(),
        ));
    }

    if path.chars().any(|c| c.is_control()) {
        return Err(crate::Error::BadRequest(
            "path contains invalid characters".into(),
        ));
    }

    Ok(())
}
