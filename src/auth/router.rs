use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use minijinja::context;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Deserialize;
use uuid::Uuid;

use super::password::{MIN_PASSWORD_LEN, hash_password};
use super::user::{AuthSession, Credentials};
use crate::entities::user;
use crate::router::AppState;

// This allows us to extract the "next" field from the query string. We use
// this to redirect after log in.
#[derive(Debug, Deserialize)]
pub struct AuthPageParams {
    next: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    full_name: String,
    email: String,
    password: String,
    next: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(self::get::login))
        .route("/login", post(self::post::login))
        .route("/register", get(self::get::register))
        .route("/register", post(self::post::register))
        .route("/logout", get(self::get::logout))
}

/// Only local paths are honored; absolute URLs and protocol-relative
/// `//host` values would let a crafted login link bounce the user to
/// another site, so anything else falls back to the dashboard.
fn next_or_dashboard(next: Option<String>) -> Redirect {
    match next.as_deref() {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => Redirect::to(next),
        _ => Redirect::to("/dashboard"),
    }
}

mod post {
    use super::*;

    pub async fn login(
        mut auth_session: AuthSession,
        Form(creds): Form<Credentials>,
    ) -> impl IntoResponse {
        let user = match auth_session.authenticate(creds.clone()).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return Redirect::to("/login?error=Invalid+email+or+password").into_response();
            }
            Err(e) => {
                tracing::error!("authentication failed: {e}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        if auth_session.login(&user).await.is_err() {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        next_or_dashboard(creds.next).into_response()
    }

    pub async fn register(
        State(state): State<AppState>,
        mut auth_session: AuthSession,
        Form(form): Form<RegisterForm>,
    ) -> impl IntoResponse {
        let email = form.email.trim().to_lowercase();
        if form.full_name.trim().is_empty() || email.is_empty() {
            return Redirect::to("/register?error=Name+and+email+are+required").into_response();
        }
        if form.password.len() < MIN_PASSWORD_LEN {
            return Redirect::to("/register?error=Password+must+have+at+least+8+characters")
                .into_response();
        }

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .one(&*state.db)
            .await;
        match existing {
            Ok(Some(_)) => {
                return Redirect::to("/register?error=Email+is+already+registered").into_response();
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("failed to look up email: {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        }

        // The first account bootstraps administration; everyone after that
        // starts as a plain user until promoted in the database.
        let is_admin = match user::Entity::find().count(&*state.db).await {
            Ok(count) => count == 0,
            Err(e) => {
                tracing::error!("failed to count users: {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        };

        let password_hash = match hash_password(&form.password) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::error!("failed to hash password: {e}");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            full_name: Set(form.full_name.trim().to_string()),
            is_admin: Set(is_admin),
            ..Default::default()
        };
        let user = match model.insert(&*state.db).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("failed to create user: {e}");
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        };

        if auth_session.login(&user).await.is_err() {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        next_or_dashboard(form.next).into_response()
    }
}

mod get {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        Query(params): Query<AuthPageParams>,
    ) -> impl IntoResponse {
        let tmpl = state.templates.get_template("login.html").unwrap();
        let html = tmpl
            .render(context! {
                next => params.next,
                error => params.error,
            })
            .unwrap();
        Html(html).into_response()
    }

    pub async fn register(
        State(state): State<AppState>,
        Query(params): Query<AuthPageParams>,
    ) -> impl IntoResponse {
        let tmpl = state.templates.get_template("register.html").unwrap();
        let html = tmpl
            .render(context! {
                next => params.next,
                error => params.error,
            })
            .unwrap();
        Html(html).into_response()
    }

    pub async fn logout(mut auth_session: AuthSession) -> impl IntoResponse {
        match auth_session.logout().await {
            Ok(_) => Redirect::to("/login").into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    fn location(redirect: Redirect) -> String {
        let response = redirect.into_response();
        response.headers()[LOCATION].to_str().unwrap().to_string()
    }

    #[test]
    fn local_next_path_is_honored() {
        assert_eq!(
            location(next_or_dashboard(Some("/schedules".to_string()))),
            "/schedules"
        );
    }

    #[test]
    fn missing_or_empty_next_goes_to_dashboard() {
        assert_eq!(location(next_or_dashboard(None)), "/dashboard");
        assert_eq!(location(next_or_dashboard(Some(String::new()))), "/dashboard");
    }

    #[test]
    fn external_next_targets_are_rejected() {
        assert_eq!(
            location(next_or_dashboard(Some("https://evil.example".to_string()))),
            "/dashboard"
        );
        assert_eq!(
            location(next_or_dashboard(Some("//evil.example/pay".to_string()))),
            "/dashboard"
        );
    }
}
