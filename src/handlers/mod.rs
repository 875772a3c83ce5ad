// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (admin JWT) → Elevated (super admin JWT).
// Routes are assembled in app.rs; each tier only declares handlers.

pub mod elevated;
pub mod protected;
pub mod public;
