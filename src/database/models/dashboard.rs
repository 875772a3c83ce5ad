use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::Order;

/// Aggregates shown on the admin dashboard landing page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub orders_total: i64,
    pub orders_by_status: BTreeMap<String, i64>,
    /// Sum of order totals, cancelled orders excluded.
    pub revenue: i64,
    pub products_total: i64,
    pub products_active: i64,
    pub low_stock: Vec<LowStockProduct>,
    pub subscribers: i64,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
}
