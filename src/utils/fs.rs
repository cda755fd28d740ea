//! File system utilities.

use crate::Result;
use chrono::Local;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Timestamp used in artifact file names.
pub fn artifact_timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Build `<dir>/<prefix><stamp>.<ext>`.
pub fn artifact_path(dir: &Path, prefix: &str, stamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}{}.{}", prefix, stamp, ext))
}

/// Check that a path exists and is a directory, creating it if missing.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    if !path.is_dir() {
        return Err(crate::Error::other(format!(
            "Not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Write a script file and mark it executable.
pub fn write_script(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(())
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a file against an expected SHA-256 (hex, any case).
pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(crate::Error::ChecksumMismatch {
            path: path.display().to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
