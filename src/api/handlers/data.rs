//! Mock sales and inventory data handlers

use crate::api::models::{InventoryItem, SalesRecord, StockStatus};
use crate::auth::middleware::AuthUser;
use axum::{response::Html, Json};
use chrono::{Duration, Local, NaiveDate};

/// Handler for GET /api/sales/json - Recent sales
pub async fn get_sales_json(user: AuthUser) -> Json<Vec<SalesRecord>> {
    tracing::debug!(user_id = user.user_id, "Serving sales data");
    Json(sales_records(Local::now().date_naive()))
}

/// Handler for GET /api/inventory/json - Current stock levels
pub async fn get_inventory_json(user: AuthUser) -> Json<Vec<InventoryItem>> {
    tracing::debug!(user_id = user.user_id, "Serving inventory data");
    Json(inventory_items())
}

/// Handler for GET /api/data - Status fragment swapped into the home page
pub async fn get_data() -> Html<String> {
    let server_time = Local::now().format("%Y-%m-%d %H:%M:%S");

    Html(format!(
        r#"<div class="text-center">
    <h3 class="text-lg font-semibold text-gray-800 mb-2">Data Loaded Successfully!</h3>
    <p class="text-gray-600 mb-4">Server time: {server_time}</p>
    <div class="bg-gradient-to-r from-blue-50 to-purple-50 rounded-lg p-4 text-left">
        <p class="text-sm text-gray-700"><strong>Status:</strong> API is working correctly</p>
        <p class="text-sm text-gray-700"><strong>Response:</strong> 200 OK</p>
    </div>
</div>"#
    ))
}

fn sales_records(today: NaiveDate) -> Vec<SalesRecord> {
    let day = |offset: i64| (today - Duration::days(offset)).format("%Y-%m-%d").to_string();
    let record = |offset, product_name: &str, amount, quantity| SalesRecord {
        date: day(offset),
        product_name: product_name.to_string(),
        amount,
        quantity,
    };

    vec![
        record(2, "Laptop", 1299.99, 2),
        record(1, "Mouse", 29.99, 5),
        record(0, "Keyboard", 79.99, 3),
        record(0, "Monitor", 349.99, 1),
    ]
}

fn inventory_items() -> Vec<InventoryItem> {
    [
        ("Laptop", 15, StockStatus::InStock),
        ("Mouse", 45, StockStatus::InStock),
        ("Keyboard", 8, StockStatus::LowStock),
        ("Monitor", 0, StockStatus::OutOfStock),
        ("Webcam", 22, StockStatus::InStock),
        ("Headphones", 5, StockStatus::LowStock),
    ]
    .into_iter()
    .zip(1..)
    .map(|((product_name, stock, status), id)| InventoryItem {
        id,
        product_name: product_name.to_string(),
        stock,
        status,
    })
    .collect()
}
