/*
 * Responsibility
 * - licences テーブル向け SQLx 操作 (読み取り専用。書き込みは別サービスの責務)
 * - ユーザー単位 / entity 単位の一覧と、uuid 指定の取得
 * - view の条件は LicenceView::predicate() と共有する
 */
use sqlx::PgPool;

use crate::repos::error::RepoError;
use crate::services::licence::{LicenceRecord, LicenceView};

const COLUMNS: &str = r#"
    uuid, type_uuid, name, iat, exp, entity_uuid,
    user_uuid, manager_uuid, created_by, auto_renew, credential_uuid,
    api_roles, app_roles, apps
"#;

/// Every licence assigned to the user, regardless of its window.
pub async fn list_for_user(db: &PgPool, user_uuid: &str) -> Result<Vec<LicenceRecord>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM licences WHERE user_uuid = $1 ORDER BY iat DESC");

    let rows = sqlx::query_as::<_, LicenceRecord>(&sql)
        .bind(user_uuid)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn list_current_for_user(
    db: &PgPool,
    user_uuid: &str,
    now: i64,
) -> Result<Vec<LicenceRecord>, RepoError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM licences \
         WHERE user_uuid = $1 AND iat <= $2 AND $2 < exp \
         ORDER BY iat DESC"
    );

    let rows = sqlx::query_as::<_, LicenceRecord>(&sql)
        .bind(user_uuid)
        .bind(now)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn list_view(
    db: &PgPool,
    entity_uuid: &str,
    view: LicenceView,
    now: i64,
) -> Result<Vec<LicenceRecord>, RepoError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM licences \
         WHERE entity_uuid = $1 AND {} \
         ORDER BY iat DESC",
        view.predicate()
    );

    let rows = sqlx::query_as::<_, LicenceRecord>(&sql)
        .bind(entity_uuid)
        .bind(now)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

/// Entity catalogue, optionally narrowed to one licence name.
pub async fn list_by_name(
    db: &PgPool,
    entity_uuid: &str,
    name: Option<&str>,
) -> Result<Vec<LicenceRecord>, RepoError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM licences \
         WHERE entity_uuid = $1 AND ($2::text IS NULL OR name = $2) \
         ORDER BY name, iat DESC"
    );

    let rows = sqlx::query_as::<_, LicenceRecord>(&sql)
        .bind(entity_uuid)
        .bind(name)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, uuid: &str) -> Result<Option<LicenceRecord>, RepoError> {
    let sql = format!("SELECT {COLUMNS} FROM licences WHERE uuid = $1");

    let row = sqlx::query_as::<_, LicenceRecord>(&sql)
        .bind(uuid)
        .fetch_optional(db)
        .await?;

    Ok(row)
}
