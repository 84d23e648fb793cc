use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect},
};
use minijinja::context;

use crate::{auth::user::AuthSession, router::AppState};

pub async fn dashboard(
    State(state): State<AppState>,
    auth_session: AuthSession,
) -> impl IntoResponse {
    let Some(user) = auth_session.user else {
        return Redirect::to("/login").into_response();
    };

    let tmpl = state.templates.get_template("dashboard.html").unwrap();
    let html = tmpl
        .render(context! {
            full_name => user.full_name,
            is_admin => user.is_admin,
            active => "dashboard",
        })
        .unwrap();
    Html(html).into_response()
}
