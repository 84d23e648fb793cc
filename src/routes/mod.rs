use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::auth::user::AuthSession;
use crate::entities::user;

pub mod dashboard;
pub mod people;
pub mod public_schedules;
pub mod reports;
pub mod schedules;

/// Roster and schedule mutations are reserved for administrators; everyone
/// else is bounced to the login page or told off with a 403.
pub(crate) fn require_admin(auth_session: &AuthSession) -> Result<user::Model, Response> {
    match &auth_session.user {
        None => Err(Redirect::to("/login").into_response()),
        Some(user) if !user.is_admin => {
            Err((StatusCode::FORBIDDEN, "Administrator access required").into_response())
        }
        Some(user) => Ok(user.clone()),
    }
}
