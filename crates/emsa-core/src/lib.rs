//! Core library for the EMSA employee management client.
//!
//! - `api`: REST client for the EMSA backend with bearer-token injection
//! - `auth`: the Session Store, login payload normalization, persistence backends
//! - `routing`: routes, the route guard and per-role navigation menus
//! - `models`: request/response types for every backend resource
//! - `config`: user configuration and directory locations

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routing;
pub mod utils;
