//! API routes

use crate::api::handlers::{
    get_data, get_inventory_json, get_sales_json, health_check, index_page, inventory_page,
    login_page, sales_page, AppState,
};
use crate::auth::handlers::{get_me, login, logout, method_not_allowed};
use crate::auth::middleware::{optional_auth, require_auth};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

/// Build the application routes
pub fn build_app_routes(state: AppState) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login).fallback(method_not_allowed))
        .route("/api/auth/logout", post(logout).fallback(method_not_allowed));

    // Login page redirects home when a valid session is already present
    let login_routes = Router::new()
        .route("/login", get(login_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    // Protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/data", get(get_data))
        .route("/api/sales/json", get(get_sales_json))
        .route("/api/inventory/json", get(get_inventory_json))
        // Pages
        .route("/", get(index_page))
        .route("/sales", get(sales_page))
        .route("/inventory", get(inventory_page))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(login_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_state;
    use crate::api::models::{InventoryItem, SalesRecord};
    use crate::auth::middleware::{AUTH_COOKIE_NAME, LOGIN_PATH};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use tower::util::ServiceExt; // For oneshot method

    fn admin_token(state: &AppState) -> String {
        let admin = state.store.get_user_by_identifier("admin").unwrap();
        state.tokens.issue_token(&admin).unwrap()
    }

    fn bearer_get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn browser_get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .header(header::ACCEPT, "text/html,application/xhtml+xml");
        if let Some(token) = cookie {
            builder = builder.header(header::COOKIE, format!("{}={}", AUTH_COOKIE_NAME, token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = build_app_routes(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["users"], 1);
    }

    #[tokio::test]
    async fn test_data_endpoints_require_auth() {
        for uri in ["/api/data", "/api/sales/json", "/api/inventory/json"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = build_app_routes(test_state()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);
        }
    }

    #[tokio::test]
    async fn test_sales_json_with_token() {
        let state = test_state();
        let token = admin_token(&state);

        let response = build_app_routes(state)
            .oneshot(bearer_get("/api/sales/json", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sales: Vec<SalesRecord> = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(sales.len(), 4);
        assert_eq!(sales[2].date, sales[3].date);
    }

    #[tokio::test]
    async fn test_inventory_json_with_token() {
        let state = test_state();
        let token = admin_token(&state);

        let response = build_app_routes(state)
            .oneshot(bearer_get("/api/inventory/json", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let items: Vec<InventoryItem> = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(items.len(), 6);
    }

    #[tokio::test]
    async fn test_json_endpoints_ignore_session_cookie() {
        let state = test_state();
        let token = admin_token(&state);

        for uri in ["/api/sales/json", "/api/inventory/json", "/api/auth/me"] {
            let request = Request::builder()
                .uri(uri)
                .header(header::ACCEPT, "application/json")
                .header(header::COOKIE, format!("{}={}", AUTH_COOKIE_NAME, token))
                .body(Body::empty())
                .unwrap();

            let response = build_app_routes(state.clone()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);
        }
    }

    #[tokio::test]
    async fn test_logout_then_login_page_renders() {
        let state = test_state();
        let token = admin_token(&state);

        let logout = Request::builder()
            .method("POST")
            .uri("/api/auth/logout")
            .header(header::COOKIE, format!("{}={}", AUTH_COOKIE_NAME, token))
            .body(Body::empty())
            .unwrap();
        let response = build_app_routes(state.clone()).oneshot(logout).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The browser now holds the cleared (empty) cookie value
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        let cleared_value = cleared
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value)
            .unwrap();
        assert!(cleared_value.is_empty());

        let response = build_app_routes(state)
            .oneshot(browser_get("/login", Some(cleared_value)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pages_redirect_anonymous_browsers() {
        for uri in ["/", "/sales", "/inventory"] {
            let response = build_app_routes(test_state())
                .oneshot(browser_get(uri, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "uri: {}", uri);
            assert_eq!(response.headers()[header::LOCATION], LOGIN_PATH);
        }
    }

    #[tokio::test]
    async fn test_page_with_session_cookie() {
        let state = test_state();
        let token = admin_token(&state);

        let response = build_app_routes(state)
            .oneshot(browser_get("/inventory", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(page.contains("Inventory Dashboard"));
        assert!(page.contains("admin@dashboard.com"));
    }

    #[tokio::test]
    async fn test_login_page_for_anonymous_browser() {
        let response = build_app_routes(test_state())
            .oneshot(browser_get("/login", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(page.contains("loginForm"));
    }

    #[tokio::test]
    async fn test_login_page_redirects_signed_in_browser() {
        let state = test_state();
        let token = admin_token(&state);

        let response = build_app_routes(state)
            .oneshot(browser_get("/login", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_login_page_ignores_stale_cookie() {
        let response = build_app_routes(test_state())
            .oneshot(browser_get("/login", Some("stale")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
