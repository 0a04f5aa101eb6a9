//! Server-rendered HTML pages

use crate::auth::middleware::AuthUser;
use axum::response::{Html, IntoResponse, Redirect, Response};

/// Navigation entries: (page key, path, label)
const NAV_LINKS: [(&str, &str, &str); 3] = [
    ("home", "/", "Home"),
    ("sales", "/sales", "Sales"),
    ("inventory", "/inventory", "Inventory"),
];

/// Handler for GET / - Dashboard home
pub async fn index_page(user: AuthUser) -> Html<String> {
    Html(render_layout(
        "Dashboard Home",
        "home",
        &user,
        r#"<section class="card">
    <h2>Welcome back</h2>
    <p>Use the navigation to browse sales and inventory.</p>
    <button id="loadData" type="button">Load data</button>
    <div id="message"></div>
</section>"#,
    ))
}

/// Handler for GET /sales - Sales dashboard
pub async fn sales_page(user: AuthUser) -> Html<String> {
    Html(render_layout(
        "Sales Dashboard",
        "sales",
        &user,
        r#"<section class="card">
    <h2>Recent sales</h2>
    <table id="salesTable" data-source="/api/sales/json">
        <thead><tr><th>Date</th><th>Product</th><th>Amount</th><th>Quantity</th></tr></thead>
        <tbody></tbody>
    </table>
</section>"#,
    ))
}

/// Handler for GET /inventory - Inventory dashboard
pub async fn inventory_page(user: AuthUser) -> Html<String> {
    Html(render_layout(
        "Inventory Dashboard",
        "inventory",
        &user,
        r#"<section class="card">
    <h2>Stock levels</h2>
    <table id="inventoryTable" data-source="/api/inventory/json">
        <thead><tr><th>ID</th><th>Product</th><th>Stock</th><th>Status</th></tr></thead>
        <tbody></tbody>
    </table>
</section>"#,
    ))
}

/// Handler for GET /login - Sign-in form, or straight home when already signed in
pub async fn login_page(user: Option<AuthUser>) -> Response {
    if let Some(user) = user {
        tracing::debug!(user_id = user.user_id, "Already signed in, skipping login page");
        return Redirect::to("/").into_response();
    }

    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Login</title>
    <script src="/static/app.js" defer></script>
</head>
<body>
    <main class="login">
        <h1>Sign in</h1>
        <form id="loginForm">
            <label>Username or email <input name="username" autocomplete="username" required></label>
            <label>Password <input name="password" type="password" autocomplete="current-password" required></label>
            <button type="submit">Sign in</button>
        </form>
        <p id="loginError" role="alert"></p>
    </main>
</body>
</html>"#,
    )
    .into_response()
}

fn render_layout(title: &str, page: &str, user: &AuthUser, content: &str) -> String {
    let nav: String = NAV_LINKS
        .iter()
        .map(|(key, href, label)| {
            let class = if *key == page { " class=\"active\"" } else { "" };
            format!(r#"<a href="{href}"{class}>{label}</a>"#)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="/static/app.js" defer></script>
</head>
<body data-page="{page}">
    <header>
        <nav>{nav}</nav>
        <div class="user">
            <span class="username">{username}</span>
            <span class="email">{email}</span>
            <button id="logout" type="button">Logout</button>
        </div>
    </header>
    <main>
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#,
        username = escape_html(&user.username),
        email = escape_html(&user.email),
    )
}

/// Escape text for interpolation into HTML
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
