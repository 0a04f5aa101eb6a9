use serde::{Deserialize, Serialize};

/// One line of the sales report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    pub product_name: String,
    pub amount: f64,
    pub quantity: u32,
}

/// Stock level for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: u32,
    pub product_name: String,
    pub stock: u32,
    pub status: StockStatus,
}

/// Stock band shown on the inventory page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}
