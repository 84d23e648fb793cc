use crate::{
    auth::{router as auth_router, user::Backend},
    auth::user::AuthSession,
    config::Config,
    routes::{
        dashboard::dashboard, people, public_schedules::public_schedules, reports::reports,
        schedules,
    },
};
use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Redirect},
    routing::{get, get_service},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{
        Expiry, SessionManagerLayer,
        cookie::{SameSite, time},
    },
};
use minijinja::Environment;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::{signal, task::AbortHandle};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::PostgresStore;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub templates: Arc<Environment<'static>>,
    pub public_base_url: String,
}

pub async fn create_router(
    db: DatabaseConnection,
    session_store: PostgresStore,
    config: &Config,
) -> anyhow::Result<Router> {
    let templates = setup_templates();

    let db = Arc::new(db);
    let state = AppState {
        db: db.clone(),
        templates: Arc::new(templates),
        public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
    };

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(1)));

    // Auth service.
    //
    // This combines the session layer with our backend to establish the auth
    // service which will provide the auth session as a request extension.
    let backend = Backend::new(db);
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let app = Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard))
        .route("/public-schedules", get(public_schedules))
        .route("/reports", get(reports))
        .nest("/people", people::routes())
        .nest("/schedules", schedules::routes())
        .merge(auth_router::router())
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(auth_layer)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

fn setup_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader("templates"));
    env
}

async fn index(State(state): State<AppState>, auth_session: AuthSession) -> impl IntoResponse {
    if auth_session.user.is_some() {
        Redirect::to("/dashboard").into_response()
    } else {
        let tmpl = state.templates.get_template("index.html").unwrap();
        let html = tmpl.render(minijinja::context! {}).unwrap();
        Html(html).into_response()
    }
}

pub async fn shutdown_signal(deletion_task_abort_handle: AbortHandle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { deletion_task_abort_handle.abort() },
        _ = terminate => { deletion_task_abort_handle.abort() },
    }
}
