//! End-to-end tests over the assembled router, backed by in-memory stores

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use auth::application::{SeedAdminInput, SeedAdminUseCase};
    use auth::{AuthAppState, MemoryAuthRepository, TokenManager};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use platform::kv::MemoryStore;
    use platform::mail::Mailer;
    use referral::{MemoryReferralRepository, PaystackClient, ReferralAppState, StatsCache};

    use crate::app::{Services, build_router};
    use crate::config::AppConfig;

    pub const ADMIN_EMAIL: &str = "admin@cirvee.com";
    pub const ADMIN_PASSWORD: &str = "adminpass123";

    pub struct TestApp {
        pub router: Router,
        pub users: Arc<MemoryAuthRepository>,
        pub mailer: Mailer,
    }

    pub fn config(extra: &[(&str, &str)]) -> AppConfig {
        let mut pairs = vec![
            ("DATABASE_URL", "postgres://localhost/cirvee_test"),
            ("JWT_SECRET", "test-access-secret"),
            ("JWT_REFRESH_SECRET", "test-refresh-secret"),
        ];
        pairs.extend_from_slice(extra);
        AppConfig::from_lookup(move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    impl TestApp {
        pub fn new() -> Self {
            Self::with_config(config(&[]))
        }

        pub fn with_config(config: AppConfig) -> Self {
            let users = MemoryAuthRepository::new();
            let referrals = Arc::new(MemoryReferralRepository::new(users.clone()));
            let users = Arc::new(users);
            let kv = MemoryStore::new();
            let mailer = Mailer::in_memory();
            let tokens = Arc::new(TokenManager::new(&config.auth.tokens));

            let services = Services {
                auth: AuthAppState::new(
                    users.clone(),
                    tokens.clone(),
                    mailer.clone(),
                    Arc::new(config.auth.clone()),
                ),
                referral: ReferralAppState::new(
                    referrals,
                    users.clone(),
                    StatsCache::new(kv.clone(), config.referral.dashboard_cache_ttl),
                    Arc::new(PaystackClient::new(config.referral.paystack.clone()).unwrap()),
                    mailer.clone(),
                    Arc::new(config.referral.clone()),
                ),
                tokens,
                kv,
                pool: None,
            };

            Self {
                router: build_router(services, &config),
                users,
                mailer,
            }
        }

        pub async fn seed_admin(&self) {
            SeedAdminUseCase::new(self.users.clone())
                .execute(SeedAdminInput {
                    email: ADMIN_EMAIL.to_string(),
                    password: ADMIN_PASSWORD.to_string(),
                    name: "Super Admin".to_string(),
                })
                .await
                .unwrap();
        }
    }

    /// Request from a distinct client address so rate limits stay per test step
    pub fn request(
        method: &str,
        uri: &str,
        client: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", client);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub fn registration(email: &str, name: &str) -> serde_json::Value {
        serde_json::json!({
            "email": email,
            "password": "password123",
            "name": name,
            "phone": "08012345678"
        })
    }

    pub async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod middleware_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::support::*;

    #[tokio::test]
    async fn test_health_and_common_headers() {
        let app = TestApp::new();

        let response = app
            .router
            .oneshot(request("GET", "/health", "10.0.0.1", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert!(headers.contains_key("x-request-id"));
        assert_eq!(headers["x-ratelimit-limit"], "100");

        let body = json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "disabled");
        assert_eq!(body["cache"], "up");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = TestApp::new();
        let response = app
            .router
            .oneshot(request("GET", "/api/v1/nope", "10.0.0.1", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "route not found");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let app = TestApp::new();
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/v1/auth/login")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_auth_rate_limit() {
        let app = TestApp::with_config(config(&[("AUTH_RATE_LIMIT_REQUESTS", "3")]));
        let body = serde_json::json!({ "email": "ghost@example.com", "password": "password123" });

        for _ in 0..3 {
            let response = app
                .router
                .clone()
                .oneshot(request("POST", "/api/v1/auth/login", "10.0.0.9", None, Some(body.clone())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = app
            .router
            .clone()
            .oneshot(request("POST", "/api/v1/auth/login", "10.0.0.9", None, Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");

        // Other routes and other clients keep their own counters
        let response = app
            .router
            .clone()
            .oneshot(request("POST", "/api/v1/auth/refresh", "10.0.0.9", None, Some(serde_json::json!({}))))
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = app
            .router
            .oneshot(request("POST", "/api/v1/auth/login", "10.0.0.10", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let app = TestApp::new();
        let padding = "x".repeat(crate::app::MAX_BODY_BYTES + 1);

        let body = serde_json::json!({ "name": padding }).to_string();
        let mut req = request("POST", "/api/v1/students/register", "10.0.0.1", None, None);
        req.headers_mut()
            .insert(header::CONTENT_LENGTH, body.len().to_string().parse().unwrap());
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        *req.body_mut() = Body::from(body);

        let response = app.router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

#[cfg(test)]
mod flow_tests {
    use std::collections::HashSet;

    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::support::*;

    #[tokio::test]
    async fn test_concurrent_duplicate_email() {
        let app = TestApp::new();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let router = app.router.clone();
                tokio::spawn(async move {
                    router
                        .oneshot(request(
                            "POST",
                            "/api/v1/auth/register",
                            &format!("10.1.0.{}", i),
                            None,
                            Some(registration("same@example.com", "Same Person")),
                        ))
                        .await
                        .unwrap()
                        .status()
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::CREATED => created += 1,
                status => assert_eq!(status, StatusCode::CONFLICT),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(app.users.all_users().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_distinct_registrations() {
        let app = TestApp::new();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let router = app.router.clone();
                tokio::spawn(async move {
                    let response = router
                        .oneshot(request(
                            "POST",
                            "/api/v1/auth/register",
                            &format!("10.2.0.{}", i),
                            None,
                            Some(registration(&format!("user{}@example.com", i), "John Doe")),
                        ))
                        .await
                        .unwrap();
                    assert_eq!(response.status(), StatusCode::CREATED);
                    json(response).await["user"]["referral_code"]
                        .as_str()
                        .unwrap()
                        .to_string()
                })
            })
            .collect();

        let mut codes = HashSet::new();
        for handle in handles {
            let code = handle.await.unwrap();
            assert!(!code.is_empty());
            codes.insert(code);
        }
        assert_eq!(codes.len(), 10);
    }

    #[tokio::test]
    async fn test_referral_to_payment_flow() {
        let app = TestApp::new();
        app.seed_admin().await;

        // Referrer signs up
        let response = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/auth/register",
                "10.3.0.1",
                None,
                Some(registration("john@example.com", "John Doe")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json(response).await;
        let referrer_token = body["access_token"].as_str().unwrap().to_string();
        let referrer_id = body["user"]["id"].as_str().unwrap().to_string();
        let code = body["user"]["referral_code"].as_str().unwrap().to_string();
        assert!(code.starts_with("JOH-"));

        // Student registers with the code
        let response = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/students/register",
                "10.3.0.2",
                None,
                Some(serde_json::json!({
                    "name": "Tunde Bakare",
                    "email": "tunde@example.com",
                    "phone": "08098765432",
                    "course": "Web Development",
                    "referral_code": code
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json(response).await["referrer"], "John Doe");

        let response = app
            .router
            .clone()
            .oneshot(request("GET", "/api/v1/user/dashboard", "10.3.0.1", Some(&referrer_token), None))
            .await
            .unwrap();
        let dashboard = json(response).await;
        assert_eq!(dashboard["total_referrals"], 1);
        assert_eq!(dashboard["pending_balance"], 15_000);

        // Admin logs in and pays the referrer out
        let response = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                "/api/v1/auth/login",
                "10.3.0.3",
                None,
                Some(serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let admin_token = json(response).await["access_token"].as_str().unwrap().to_string();

        let response = app
            .router
            .clone()
            .oneshot(request("GET", "/api/v1/admin/dashboard", "10.3.0.3", Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stats = json(response).await;
        assert_eq!(stats["total_referrals"], 1);
        assert_eq!(stats["pending_balance"], 15_000);

        let response = app
            .router
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/v1/admin/referrers/{}/paid", referrer_id),
                "10.3.0.3",
                Some(&admin_token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["updated"], 1);

        let response = app
            .router
            .clone()
            .oneshot(request("GET", "/api/v1/user/referrals", "10.3.0.1", Some(&referrer_token), None))
            .await
            .unwrap();
        let referrals = json(response).await;
        assert_eq!(referrals["total"], 1);
        assert_eq!(referrals["data"][0]["status"], "paid");

        // The cached dashboard was dropped by the payment
        let response = app
            .router
            .clone()
            .oneshot(request("GET", "/api/v1/admin/dashboard", "10.3.0.3", Some(&admin_token), None))
            .await
            .unwrap();
        let stats = json(response).await;
        assert_eq!(stats["pending_balance"], 0);
        assert_eq!(stats["total_paid_earnings"], 15_000);

        // Roles are exact: the admin cannot use referrer routes
        let response = app
            .router
            .oneshot(request("GET", "/api/v1/user/profile", "10.3.0.3", Some(&admin_token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        // welcome, student confirmation, referrer notification, admin alert
        assert_eq!(app.mailer.sent().len(), 4);
    }
}
