// handlers/protected/mod.rs - Admin dashboard endpoints (admin JWT required)
//
// Route prefix: /api/admin/*
// Middleware: require_admin injects the authenticated AuthAdmin.

pub mod auth;
pub mod campaigns;
pub mod dashboard;
pub mod delivery_zones;
pub mod galleries;
pub mod newsletter;
pub mod orders;
pub mod products;
pub mod push;
pub mod settings;
