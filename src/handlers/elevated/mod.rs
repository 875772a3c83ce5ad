// handlers/elevated/mod.rs - Super admin endpoints
//
// Route prefix: /api/admin/users
// Middleware: require_super_admin

pub mod users;
