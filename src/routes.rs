// routes.rs
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        properties::properties_handler, property_types::property_types_handler,
        property_views::property_views_handler,
    },
    AppState,
};

async fn health_check(Extension(app_state): Extension<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
        "store": app_state.store.backend_name()
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/properties", properties_handler())
        .nest("/property-views", property_views_handler())
        .nest("/property-types", property_types_handler());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::memory::MemoryStore,
        models::{
            propertymodel::{Location, ReferenceKind, ReferenceType},
            usermodel::{User, UserRole},
        },
        service::property_filter::tests::{property, structured},
        utils::token::tests::create_token,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "router-test-secret";

    struct TestApp {
        router: Router,
        store: Arc<MemoryStore>,
    }

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "JWT_SECRET_KEY" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn test_app() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let app_state = Arc::new(AppState::new(config(), store.clone(), None));
        TestApp {
            router: create_router(app_state),
            store,
        }
    }

    async fn add_user(store: &MemoryStore, role: UserRole) -> (User, String) {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Meera".to_string(),
            email: format!("{}@example.com", Uuid::new_v4()),
            role,
            created_at: now,
            updated_at: now,
        };
        store.insert_user(user.clone()).await;
        let token = create_token(&user.id.to_string(), SECRET.as_bytes(), 3600).unwrap();
        (user, token)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, body)
    }

    fn request(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    #[tokio::test]
    async fn health_reports_backend() {
        let app = test_app();
        let (status, _, body) = send(&app.router, request("GET", "/health").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn property_listing_uses_frontend_field_names() {
        let app = test_app();
        let (seller, _) = add_user(&app.store, UserRole::Seller).await;
        for i in 0..3 {
            let mut p = property(&format!("Villa {}", i), 1_000_000, structured("Pune", "MH", "Lane 4"));
            p.seller_id = seller.id;
            app.store.insert_property(p).await;
        }

        let (status, _, body) = send(
            &app.router,
            request("GET", "/api/properties?limit=2&page=2&minPrice=abc&location=Pune")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalProperties"], 3);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["currentPage"], 2);
        let properties = body["properties"].as_array().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0]["seller"]["name"], "Meera");
        assert_eq!(properties[0]["location"]["kind"], "structured");
    }

    #[tokio::test]
    async fn seller_me_uses_the_token_owner() {
        let app = test_app();
        let (seller, token) = add_user(&app.store, UserRole::Seller).await;
        let mut mine = property("Mine", 10, Location::Text { value: String::new() });
        mine.seller_id = seller.id;
        app.store.insert_property(mine).await;
        app.store.insert_property(property("Theirs", 10, Location::Text { value: String::new() })).await;

        let (_, _, authed) = send(
            &app.router,
            request("GET", "/api/properties?seller_id=me")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(authed["totalProperties"], 1);

        let (status, _, stale) = send(
            &app.router,
            request("GET", "/api/properties?seller_id=me")
                .header("Authorization", "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stale["totalProperties"], 2);
    }

    #[tokio::test]
    async fn filters_endpoint_returns_facets() {
        let app = test_app();
        app.store
            .insert_reference_type(
                ReferenceKind::ApprovalType,
                ReferenceType {
                    id: Uuid::new_v4(),
                    name: "RERA".to_string(),
                    status: "active".to_string(),
                    visible_to_seller: true,
                },
            )
            .await;
        app.store.insert_property(property("A", 1_500_000, structured("Goa", "GA", "x"))).await;

        let (status, _, body) =
            send(&app.router, request("GET", "/api/properties/filters").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["approvals"], serde_json::json!(["RERA"]));
        assert_eq!(body["locations"], serde_json::json!(["Goa"]));
        assert_eq!(body["maxPrice"], 1_500_000);
        assert_eq!(body["priceRanges"][0]["label"], "0 - 2.0L");
    }

    #[tokio::test]
    async fn record_view_dedups_per_viewer() {
        let app = test_app();
        let p = property("A", 10, Location::Text { value: String::new() });
        let id = p.id;
        app.store.insert_property(p).await;

        let view = || {
            request("POST", &format!("/api/property-views/{}", id))
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap()
        };

        let (status, _, first) = send(&app.router, view()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["alreadyViewed"], false);
        assert_eq!(first["viewCount"], 1);

        let (_, _, second) = send(&app.router, view()).await;
        assert_eq!(second["success"], true);
        assert_eq!(second["alreadyViewed"], true);
        assert!(second.get("viewCount").is_none());
    }

    #[tokio::test]
    async fn record_view_without_identity_or_property_fails() {
        let app = test_app();
        let p = property("A", 10, Location::Text { value: String::new() });
        let id = p.id;
        app.store.insert_property(p).await;

        let (status, _, body) = send(
            &app.router,
            request("POST", &format!("/api/property-views/{}", id)).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "fail");

        let (status, _, _) = send(
            &app.router,
            request("POST", &format!("/api/property-views/{}", Uuid::new_v4()))
                .header("x-forwarded-for", "203.0.113.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bogus_forwarded_header_falls_back_to_real_ip() {
        let app = test_app();
        let p = property("A", 10, Location::Text { value: String::new() });
        let id = p.id;
        app.store.insert_property(p).await;

        let view = |forwarded: String| {
            request("POST", &format!("/api/property-views/{}", id))
                .header("x-forwarded-for", forwarded)
                .header("x-real-ip", "198.51.100.4")
                .body(Body::empty())
                .unwrap()
        };

        let (status, _, first) = send(&app.router, view("x".repeat(500))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["alreadyViewed"], false);

        let (status, _, second) = send(&app.router, view("unknown".to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["alreadyViewed"], true);
    }

    #[tokio::test]
    async fn legacy_increment_is_marked_deprecated() {
        let app = test_app();
        let p = property("A", 10, Location::Text { value: String::new() });
        let id = p.id;
        app.store.insert_property(p).await;

        let legacy = || {
            request("PUT", &format!("/api/properties/increment-view-count/{}", id))
                .header("x-real-ip", "198.51.100.4")
                .body(Body::empty())
                .unwrap()
        };

        let (status, headers, body) = send(&app.router, legacy()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view_count"], 1);
        assert_eq!(headers["deprecation"], "true");
        assert!(headers["link"].to_str().unwrap().contains(&format!("/api/property-views/{}", id)));

        let (_, _, again) = send(&app.router, legacy()).await;
        assert_eq!(again["view_count"], 1);
    }

    #[tokio::test]
    async fn analytics_requires_admin_or_owning_seller() {
        let app = test_app();
        let (seller, seller_token) = add_user(&app.store, UserRole::Seller).await;
        let (_, buyer_token) = add_user(&app.store, UserRole::User).await;
        let (_, other_seller_token) = add_user(&app.store, UserRole::Seller).await;
        let mut p = property("A", 10, Location::Text { value: String::new() });
        p.seller_id = seller.id;
        let id = p.id;
        app.store.insert_property(p).await;

        let analytics = |token: Option<&str>| {
            let builder = request("GET", &format!("/api/property-views/{}/analytics", id));
            let builder = match token {
                Some(t) => builder.header("Cookie", format!("token={}", t)),
                None => builder,
            };
            builder.body(Body::empty()).unwrap()
        };

        let (status, _, _) = send(&app.router, analytics(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = send(&app.router, analytics(Some(&buyer_token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&app.router, analytics(Some(&other_seller_token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, body) = send(&app.router, analytics(Some(&seller_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalViews"], 0);
        assert_eq!(body["uniqueUsers"], 0);
        assert_eq!(body["last7DaysViews"], 0);
    }

    #[tokio::test]
    async fn reconcile_is_admin_only() {
        let app = test_app();
        let (_, admin_token) = add_user(&app.store, UserRole::Admin).await;
        let (_, seller_token) = add_user(&app.store, UserRole::Seller).await;
        let p = property("A", 10, Location::Text { value: String::new() });
        let id = p.id;
        app.store.insert_property(p).await;

        let reconcile = |token: &str| {
            request("POST", &format!("/api/property-views/{}/reconcile", id))
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap()
        };

        let (status, _, _) = send(&app.router, reconcile(&seller_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, body) = send(&app.router, reconcile(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["view_count"], 0);
    }

    #[tokio::test]
    async fn seller_property_types_hide_internal_entries() {
        let app = test_app();
        for (name, visible) in [("Villa", true), ("Commercial", false)] {
            app.store
                .insert_reference_type(
                    ReferenceKind::PropertyType,
                    ReferenceType {
                        id: Uuid::new_v4(),
                        name: name.to_string(),
                        status: "active".to_string(),
                        visible_to_seller: visible,
                    },
                )
                .await;
        }

        let (status, _, body) =
            send(&app.router, request("GET", "/api/property-types/seller").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["types"], serde_json::json!(["Villa"]));
    }
}
