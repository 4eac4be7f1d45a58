/*
 * Responsibility
 * - 有効期間 [iat, exp) の判定を一箇所に集約する
 * - token の Active 判定 / filter_licences / licence view の全てがこれを使う
 */

/// Half-open validity window `[iat, exp)` in epoch seconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub iat: i64,
    pub exp: i64,
}

impl ValidityWindow {
    pub fn new(iat: i64, exp: i64) -> Self {
        Self { iat, exp }
    }

    /// Window from optional claims; `None` when either bound is missing.
    pub fn from_claims(iat: Option<i64>, exp: Option<i64>) -> Option<Self> {
        Some(Self::new(iat?, exp?))
    }

    pub fn contains(&self, now: i64) -> bool {
        self.iat <= now && now < self.exp
    }

    pub fn has_ended(&self, now: i64) -> bool {
        self.exp <= now
    }

    pub fn has_started(&self, now: i64) -> bool {
        self.iat <= now
    }
}
