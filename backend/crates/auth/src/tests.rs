//! Use case and router tests for the auth crate, run against the in-memory repository

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use platform::mail::Mailer;

    use crate::application::{AuthConfig, RegisterInput, RegisterUseCase, TokenManager};
    use crate::application::AuthOutput;
    use crate::infra::MemoryAuthRepository;
    use crate::presentation::handlers::AuthAppState;

    pub struct Harness {
        pub repo: Arc<MemoryAuthRepository>,
        pub tokens: Arc<TokenManager>,
        pub mailer: Mailer,
        pub config: Arc<AuthConfig>,
    }

    impl Harness {
        pub fn new() -> Self {
            let config = AuthConfig::development();
            Self {
                repo: Arc::new(MemoryAuthRepository::new()),
                tokens: Arc::new(TokenManager::new(&config.tokens)),
                mailer: Mailer::in_memory(),
                config: Arc::new(config),
            }
        }

        pub fn state(&self) -> AuthAppState<MemoryAuthRepository> {
            AuthAppState::new(
                self.repo.clone(),
                self.tokens.clone(),
                self.mailer.clone(),
                self.config.clone(),
            )
        }

        pub async fn register(&self, email: &str, name: &str) -> AuthOutput {
            RegisterUseCase::new(self.repo.clone(), self.tokens.clone(), self.mailer.clone())
                .execute(input(email, name))
                .await
                .unwrap()
        }
    }

    pub fn input(email: &str, name: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: "password123".to_string(),
            name: name.to_string(),
            phone: "08012345678".to_string(),
            bank_name: None,
            account_number: None,
            account_name: None,
        }
    }

    /// Raw token embedded in a reset mail's link
    pub fn token_from_mail(html: &str) -> String {
        let start = html.find("token=").unwrap() + "token=".len();
        html[start..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect()
    }
}

#[cfg(test)]
mod register_tests {
    use super::support::*;
    use crate::application::RegisterUseCase;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_role::UserRole};
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_register_creates_user_and_mails_welcome() {
        let h = Harness::new();
        let output = h.register("John@Example.com", "John Doe").await;

        assert_eq!(output.user.email.as_str(), "john@example.com");
        assert_eq!(output.user.role, UserRole::User);
        assert!(output.user.referral_code.as_str().starts_with("JOH-"));

        let claims = h.tokens.validate_access_token(&output.tokens.access_token).unwrap();
        assert_eq!(claims.user_id, output.user.user_id);

        let stored = h
            .repo
            .find_by_email(&Email::new("john@example.com").unwrap())
            .await
            .unwrap();
        assert!(stored.is_some());

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "john@example.com");
        assert!(sent[0].html_body.contains(output.user.referral_code.as_str()));
    }

    #[tokio::test]
    async fn test_register_duplicate_email_case_insensitive() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;

        let err = RegisterUseCase::new(h.repo.clone(), h.tokens.clone(), h.mailer.clone())
            .execute(input("ADA@example.com", "Ada Again"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let h = Harness::new();
        let use_case = RegisterUseCase::new(h.repo.clone(), h.tokens.clone(), h.mailer.clone());

        let err = use_case.execute(input("not-an-email", "Ada")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "invalid email format"));

        let mut short = input("ada@example.com", "Ada");
        short.password = "short".to_string();
        assert!(matches!(use_case.execute(short).await, Err(AuthError::Validation(_))));

        let mut no_phone = input("ada@example.com", "Ada");
        no_phone.phone = " ".to_string();
        let err = use_case.execute(no_phone).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "phone is required"));

        assert!(h.repo.all_users().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_keeps_bank_details() {
        let h = Harness::new();
        let mut with_bank = input("bola@example.com", "Bola");
        with_bank.bank_name = Some("GTBank".to_string());
        with_bank.account_number = Some("0123456789".to_string());
        with_bank.account_name = Some("Bola Ade".to_string());

        let output = RegisterUseCase::new(h.repo.clone(), h.tokens.clone(), h.mailer.clone())
            .execute(with_bank)
            .await
            .unwrap();
        assert!(output.user.bank.is_complete());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_get_distinct_codes() {
        let h = Harness::new();

        let mut handles = Vec::new();
        for i in 0..8 {
            let use_case = RegisterUseCase::new(h.repo.clone(), h.tokens.clone(), h.mailer.clone());
            handles.push(tokio::spawn(async move {
                use_case
                    .execute(input(&format!("user{}@example.com", i), "Same Name"))
                    .await
            }));
        }
        for handle in handles {
            tokio_test::assert_ok!(handle.await.unwrap());
        }

        let users = h.repo.all_users().await;
        let mut codes: Vec<_> = users.iter().map(|u| u.referral_code.to_string()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 8);
    }
}

#[cfg(test)]
mod login_tests {
    use super::support::*;
    use crate::application::{LoginInput, LoginUseCase, RefreshUseCase};
    use crate::domain::repository::UserRepository;
    use crate::error::AuthError;

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let h = Harness::new();
        let registered = h.register("ada@example.com", "Ada").await;

        let output = LoginUseCase::new(h.repo.clone(), h.tokens.clone())
            .execute(login("ADA@example.com", "password123"))
            .await
            .unwrap();
        assert_eq!(output.user.user_id, registered.user.user_id);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_alike() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;
        let use_case = LoginUseCase::new(h.repo.clone(), h.tokens.clone());

        let wrong = use_case.execute(login("ada@example.com", "wrongpass1")).await;
        let unknown = use_case.execute(login("nobody@example.com", "password123")).await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_blocked_only_after_password_check() {
        let h = Harness::new();
        let registered = h.register("ada@example.com", "Ada").await;
        h.repo.set_blocked(&registered.user.user_id, true).await.unwrap();
        let use_case = LoginUseCase::new(h.repo.clone(), h.tokens.clone());

        let err = use_case.execute(login("ada@example.com", "password123")).await;
        assert!(matches!(err, Err(AuthError::UserBlocked)));

        let err = use_case.execute(login("ada@example.com", "wrongpass1")).await;
        assert!(matches!(err, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_refresh() {
        let h = Harness::new();
        let registered = h.register("ada@example.com", "Ada").await;
        let use_case = RefreshUseCase::new(h.repo.clone(), h.tokens.clone());

        let output = use_case.execute(&registered.tokens.refresh_token).await.unwrap();
        assert!(h.tokens.validate_access_token(&output.tokens.access_token).is_ok());

        let err = use_case.execute(&registered.tokens.access_token).await;
        assert!(matches!(err, Err(AuthError::InvalidRefreshToken)));

        h.repo.set_blocked(&registered.user.user_id, true).await.unwrap();
        let err = use_case.execute(&registered.tokens.refresh_token).await;
        assert!(matches!(err, Err(AuthError::UserBlocked)));
    }
}

#[cfg(test)]
mod password_reset_tests {
    use chrono::Utc;

    use super::support::*;
    use crate::application::{
        ForgotPasswordUseCase, LoginInput, LoginUseCase, ResetPasswordInput, ResetPasswordUseCase,
    };
    use crate::domain::repository::ResetTokenRepository;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_forgot_unknown_email_is_silent() {
        let h = Harness::new();
        ForgotPasswordUseCase::new(h.repo.clone(), h.mailer.clone(), h.config.clone())
            .execute("ghost@example.com".to_string())
            .await
            .unwrap();

        assert!(h.mailer.sent().is_empty());
        assert_eq!(h.repo.reset_token_count().await, 0);
    }

    #[tokio::test]
    async fn test_forgot_then_reset() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;

        ForgotPasswordUseCase::new(h.repo.clone(), h.mailer.clone(), h.config.clone())
            .execute("ada@example.com".to_string())
            .await
            .unwrap();

        let mail = h.mailer.sent().pop().unwrap();
        assert!(mail.html_body.contains("/reset-password?token="));
        let raw = token_from_mail(&mail.html_body);
        assert_eq!(raw.len(), 64);

        let reset = ResetPasswordUseCase::new(h.repo.clone());
        reset
            .execute(ResetPasswordInput {
                token: raw.clone(),
                new_password: "brandnew123".to_string(),
            })
            .await
            .unwrap();

        let login = LoginUseCase::new(h.repo.clone(), h.tokens.clone());
        assert!(login
            .execute(LoginInput {
                email: "ada@example.com".to_string(),
                password: "brandnew123".to_string(),
            })
            .await
            .is_ok());

        // Single use
        let again = reset
            .execute(ResetPasswordInput {
                token: raw,
                new_password: "another123".to_string(),
            })
            .await;
        assert!(matches!(again, Err(AuthError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_new_request_replaces_old_token() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;
        let forgot = ForgotPasswordUseCase::new(h.repo.clone(), h.mailer.clone(), h.config.clone());

        forgot.execute("ada@example.com".to_string()).await.unwrap();
        forgot.execute("ada@example.com".to_string()).await.unwrap();

        let sent = h.mailer.sent();
        let first = token_from_mail(&sent[1].html_body);
        assert_eq!(h.repo.reset_token_count().await, 1);

        let err = ResetPasswordUseCase::new(h.repo.clone())
            .execute(ResetPasswordInput {
                token: first,
                new_password: "brandnew123".to_string(),
            })
            .await;
        assert!(matches!(err, Err(AuthError::InvalidResetToken)));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;
        ForgotPasswordUseCase::new(h.repo.clone(), h.mailer.clone(), h.config.clone())
            .execute("ada@example.com".to_string())
            .await
            .unwrap();

        let removed = h.repo.cleanup_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 0);

        let removed = h
            .repo
            .cleanup_expired(Utc::now() + chrono::Duration::hours(2))
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }
}

#[cfg(test)]
mod admin_and_profile_tests {
    use super::support::*;
    use crate::application::{ProfileUseCase, SeedAdminInput, SeedAdminUseCase, UpdateProfileInput};
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;

    fn seed() -> SeedAdminInput {
        SeedAdminInput {
            email: "admin@cirvee.com".to_string(),
            password: "adminpass123".to_string(),
            name: "Super Admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let h = Harness::new();
        let use_case = SeedAdminUseCase::new(h.repo.clone());

        assert!(use_case.execute(seed()).await.unwrap());
        assert!(!use_case.execute(seed()).await.unwrap());

        let users = h.repo.all_users().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_profile_update() {
        let h = Harness::new();
        let registered = h.register("ada@example.com", "Ada").await;
        let use_case = ProfileUseCase::new(h.repo.clone());

        let updated = use_case
            .update(
                &registered.user.user_id,
                UpdateProfileInput {
                    name: Some("Ada Lovelace".to_string()),
                    bank_name: Some("Access Bank".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name.as_str(), "Ada Lovelace");
        assert_eq!(updated.phone.as_str(), "08012345678");

        let reloaded = use_case.get(&registered.user.user_id).await.unwrap();
        assert_eq!(reloaded.bank.bank_name.as_deref(), Some("Access Bank"));

        let err = use_case
            .update(
                &registered.user.user_id,
                UpdateProfileInput {
                    name: Some("A".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(err, Err(AuthError::Validation(_))));
    }
}

#[cfg(test)]
mod router_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::support::*;
    use crate::domain::value_object::user_role::UserRole;
    use crate::presentation::router::{auth_router, guard, profile_router};

    fn app(h: &Harness) -> Router {
        Router::new()
            .nest("/auth", auth_router(h.state()))
            .nest(
                "/user",
                guard(profile_router(h.state()), h.tokens.clone(), UserRole::User),
            )
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_profile() {
        let h = Harness::new();
        let app = app(&h);

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/register",
                serde_json::json!({
                    "email": "ada@example.com",
                    "password": "password123",
                    "name": "Ada",
                    "phone": "0800"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json(response).await;
        assert!(body["user"].get("password_hash").is_none());
        let access = body["access_token"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/user/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {}", access))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_register_conflict_and_bad_body() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;
        let app = app(&h);

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/register",
                serde_json::json!({
                    "email": "ada@example.com",
                    "password": "password123",
                    "name": "Ada",
                    "phone": "0800"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json(response).await["error"], "email already exists");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bearer_errors() {
        let h = Harness::new();
        let app = app(&h);

        let get = |auth: Option<&str>| {
            let mut builder = Request::builder().uri("/user/profile");
            if let Some(value) = auth {
                builder = builder.header(header::AUTHORIZATION, value);
            }
            builder.body(Body::empty()).unwrap()
        };

        let response = app.clone().oneshot(get(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "missing authorization header");

        let response = app.clone().oneshot(get(Some("Token abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "invalid authorization format");

        let response = app.clone().oneshot(get(Some("Bearer abc"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "invalid token");
    }

    #[tokio::test]
    async fn test_expired_access_token() {
        let h = Harness::new();
        let registered = h.register("ada@example.com", "Ada").await;
        let an_hour_ago = chrono::Utc::now().timestamp() - 3600;
        let expired = h
            .tokens
            .sign_at(crate::application::TokenClass::Access, &registered.user, an_hour_ago)
            .unwrap();

        let response = app(&h)
            .oneshot(
                Request::builder()
                    .uri("/user/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {}", expired))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json(response).await["error"], "token expired");
    }

    #[tokio::test]
    async fn test_admin_token_forbidden_on_user_route() {
        let h = Harness::new();
        let registered = h.register("boss@example.com", "Boss").await;
        let admin = crate::domain::entity::user::User {
            role: UserRole::Admin,
            ..registered.user
        };
        let token = h.tokens.generate_access_token(&admin).unwrap();

        let response = app(&h)
            .oneshot(
                Request::builder()
                    .uri("/user/profile")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json(response).await["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_forgot_password_same_answer() {
        let h = Harness::new();
        h.register("ada@example.com", "Ada").await;
        let app = app(&h);

        for email in ["ada@example.com", "ghost@example.com"] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/auth/forgot-password",
                    serde_json::json!({ "email": email }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                json(response).await["message"],
                "If the email exists, a password reset link will be sent"
            );
        }
    }
}
