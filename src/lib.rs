//! Marketing-site CMS: public content API, admin panel backend, and the
//! client-side session/role reconciler the admin panel signs in through.

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
