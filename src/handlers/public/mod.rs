// handlers/public/mod.rs - Storefront endpoints (no authentication)
//
// Route prefix: /, /health and /api/* outside /api/admin.

pub mod auth;
pub mod catalog;
pub mod delivery;
pub mod galleries;
pub mod info;
pub mod newsletter;
pub mod orders;
pub mod push;
pub mod settings;
