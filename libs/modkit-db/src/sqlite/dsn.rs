//! SQLite DSN normalization.

use std::path::{Path, PathBuf};

use crate::{DbError, Result};

/// Check if the DSN represents an in-memory SQLite database.
///
/// Returns `true` for:
/// - `sqlite::memory:`, `sqlite://memory:` or `sqlite://:memory:`
/// - DSNs containing `mode=memory` query parameter
pub fn is_memory_dsn(dsn: &str) -> bool {
    let s = dsn.trim();
    if s.eq_ignore_ascii_case("sqlite::memory:")
        || s.eq_ignore_ascii_case("sqlite://memory:")
        || s.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return true;
    }

    if let Ok(url) = url::Url::parse(s) {
        for (key, value) in url.query_pairs() {
            if key.eq_ignore_ascii_case("mode") && value.eq_ignore_ascii_case("memory") {
                return true;
            }
        }
    }

    false
}

/// Rewrite a SQLite DSN so its file path is absolute.
///
/// Relative paths are resolved against `base_dir` (the server home directory).
/// In-memory DSNs collapse to the canonical `sqlite::memory:` form. Query
/// parameters are preserved as-is.
pub fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    let dsn = dsn.trim();
    if is_memory_dsn(dsn) {
        return Ok("sqlite::memory:".to_string());
    }

    let db_path = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .ok_or_else(|| DbError::InvalidDsn(format!("expected a sqlite: DSN, got {dsn}")))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(DbError::InvalidDsn("empty SQLite path".to_string()));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Ensure the parent directory of a file-backed SQLite DSN exists.
pub(crate) fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<()> {
    if !create_dirs || is_memory_dsn(dsn) {
        return Ok(());
    }
    if let Some(path) = file_path(dsn) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn file_path(dsn: &str) -> Option<PathBuf> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
