/*
 * Responsibility
 * - リクエストパスを Unprotected / Unlicensed / Protected に分類する
 * - Unprotected は token も licence も見ない、Unlicensed は token だけ見る
 * - 2 つの集合が重なっている設定は構築時にエラーにする
 */
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Unprotected,
    Unlicensed,
    Protected,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathPolicyError {
    #[error("path `{0}` is configured as both unprotected and unlicensed")]
    Overlap(String),
}

#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    unprotected: Vec<String>,
    unlicensed: Vec<String>,
}

impl PathPolicy {
    pub fn new(unprotected: Vec<String>, unlicensed: Vec<String>) -> Result<Self, PathPolicyError> {
        if let Some(dup) = unprotected.iter().find(|p| unlicensed.contains(p)) {
            return Err(PathPolicyError::Overlap(dup.clone()));
        }

        Ok(Self {
            unprotected,
            unlicensed,
        })
    }

    pub fn classify(&self, path: &str) -> PathClass {
        if self.unprotected.iter().any(|p| path_matches(p, path)) {
            PathClass::Unprotected
        } else if self.unlicensed.iter().any(|p| path_matches(p, path)) {
            PathClass::Unlicensed
        } else {
            PathClass::Protected
        }
    }
}

/// Exact match, or segment prefix (`/docs` covers `/docs/x`, not `/docsx`).
fn path_matches(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if pattern.ends_with('/') {
        return path.starts_with(pattern);
    }

    match path.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
