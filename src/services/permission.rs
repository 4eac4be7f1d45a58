/*
 * Responsibility
 * - (付与されたロール, 必要なロール) → 許可 / 拒否
 * - 1 つでも重なれば許可。必要ロールが空なら常に拒否
 */
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("insufficient permissions. need: {}. got: {}", .required.join(", "), .granted.join(", "))]
pub struct PermissionError {
    pub required: Vec<String>,
    pub granted: Vec<String>,
}

pub fn check_roles<G, R>(granted: &[G], required: &[R]) -> Result<(), PermissionError>
where
    G: AsRef<str>,
    R: AsRef<str>,
{
    let allowed = required
        .iter()
        .any(|r| granted.iter().any(|g| g.as_ref() == r.as_ref()));

    if allowed {
        return Ok(());
    }

    Err(PermissionError {
        required: required.iter().map(|r| r.as_ref().to_string()).collect(),
        granted: granted.iter().map(|g| g.as_ref().to_string()).collect(),
    })
}
