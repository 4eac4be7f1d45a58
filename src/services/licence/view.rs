/*
 * Responsibility
 * - entity 単位の licence 一覧の「見え方」(view) を定義する
 * - unassigned / assigned は割り当てユーザーの有無で、expired / pending は期間の前後で互いに素
 * - repo の SQL と matches() は同じ条件を表す
 */
use crate::services::licence::model::LicenceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenceView {
    /// Currently valid, no user assigned.
    Unassigned,
    /// Currently valid, assigned to a user.
    Assigned,
    /// Window has ended (`exp <= now`).
    Expired,
    /// Window has not started (`now < iat`).
    Pending,
}

impl LicenceView {
    pub const ALL: [LicenceView; 4] = [
        LicenceView::Unassigned,
        LicenceView::Assigned,
        LicenceView::Expired,
        LicenceView::Pending,
    ];

    pub fn matches(&self, licence: &LicenceRecord, now: i64) -> bool {
        let window = licence.window();
        match self {
            Self::Unassigned => !licence.is_assigned() && window.contains(now),
            Self::Assigned => licence.is_assigned() && window.contains(now),
            Self::Expired => window.has_ended(now),
            Self::Pending => !window.has_started(now),
        }
    }

    /// SQL predicate over `licences`; `$2` is `now`.
    pub fn predicate(&self) -> &'static str {
        match self {
            Self::Unassigned => "user_uuid IS NULL AND iat <= $2 AND $2 < exp",
            Self::Assigned => "user_uuid IS NOT NULL AND iat <= $2 AND $2 < exp",
            Self::Expired => "exp <= $2",
            Self::Pending => "iat > $2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn licence(uuid: &str, iat: i64, exp: i64, user: Option<&str>) -> LicenceRecord {
        LicenceRecord {
            uuid: uuid.into(),
            type_uuid: "type-1".into(),
            name: uuid.into(),
            iat,
            exp,
            entity_uuid: "entity-1".into(),
            user_uuid: user.map(Into::into),
            manager_uuid: None,
            created_by: "admin".into(),
            auto_renew: true,
            credential_uuid: None,
            api_roles: vec![],
            app_roles: vec![],
            apps: vec![],
        }
    }

    // one licence per region of the timeline (iat/exp well-formed: iat < exp)
    fn fixtures() -> Vec<LicenceRecord> {
        vec![
            licence("free", NOW - 10, NOW + 10, None),
            licence("taken", NOW - 10, NOW + 10, Some("user-1")),
            licence("old", NOW - 20, NOW - 10, Some("user-1")),
            licence("ends-now", NOW - 20, NOW, None),
            licence("soon", NOW + 10, NOW + 20, None),
        ]
    }

    fn names(view: LicenceView) -> Vec<String> {
        fixtures()
            .into_iter()
            .filter(|l| view.matches(l, NOW))
            .map(|l| l.uuid)
            .collect()
    }

    #[test]
    fn each_view_selects_its_own_licences() {
        assert_eq!(names(LicenceView::Unassigned), vec!["free"]);
        assert_eq!(names(LicenceView::Assigned), vec!["taken"]);
        assert_eq!(names(LicenceView::Expired), vec!["old", "ends-now"]);
        assert_eq!(names(LicenceView::Pending), vec!["soon"]);
    }

    #[test]
    fn views_are_pairwise_disjoint_and_cover_everything() {
        for licence in fixtures() {
            let hits = LicenceView::ALL
                .iter()
                .filter(|v| v.matches(&licence, NOW))
                .count();
            assert_eq!(hits, 1, "{} matched {hits} views", licence.uuid);
        }
    }

    #[test]
    fn predicates_differ_per_view() {
        let mut predicates: Vec<_> = LicenceView::ALL.iter().map(|v| v.predicate()).collect();
        predicates.sort();
        predicates.dedup();
        assert_eq!(predicates.len(), 4);
    }
}
