/*
 * Responsibility
 * - crate のモジュール構成 (binary と tests/ から同じ構成を参照する)
 */
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
