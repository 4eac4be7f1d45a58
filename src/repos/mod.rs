/*
 * Responsibility
 * - DB アクセス層 (licences テーブルは読み取り専用)
 */
pub mod error;
pub mod licence_repo;
