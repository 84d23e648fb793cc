use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use chrono::Utc;
use minijinja::context;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::user::AuthSession,
    entities::{community, person, person::Role},
    router::AppState,
    routes::require_admin,
    util::phone::format_phone,
};

#[derive(Deserialize)]
pub struct PeopleParams {
    error: Option<String>,
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct PersonForm {
    full_name: String,
    role: Role,
    community_id: String,
    phone: String,
    active: Option<String>,
}

#[derive(Serialize)]
struct PersonRow {
    id: Uuid,
    full_name: String,
    role: &'static str,
    role_label: &'static str,
    community_id: Option<Uuid>,
    community: Option<String>,
    phone: Option<String>,
    active: bool,
}

#[derive(Serialize)]
struct RoleOption {
    value: &'static str,
    label: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_people).post(create_person))
        .route("/{id}/edit", post(update_person))
        .route("/{id}/delete", post(delete_person))
}

fn role_options() -> Vec<RoleOption> {
    Role::ALL
        .iter()
        .map(|role| RoleOption {
            value: role.value(),
            label: role.label(),
        })
        .collect()
}

fn parse_community(raw: &str) -> Option<Uuid> {
    if raw.is_empty() {
        None
    } else {
        Uuid::parse_str(raw).ok()
    }
}

fn normalized_phone(raw: &str) -> Option<String> {
    let formatted = format_phone(raw);
    (!formatted.is_empty()).then_some(formatted)
}

pub async fn list_people(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(params): Query<PeopleParams>,
) -> impl IntoResponse {
    if auth_session.user.is_none() {
        return Redirect::to("/login").into_response();
    }

    let people = match person::Entity::find()
        .order_by_asc(person::Column::FullName)
        .find_also_related(community::Entity)
        .all(&*state.db)
        .await
    {
        Ok(people) => people,
        Err(e) => {
            tracing::error!("failed to load people: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let communities = match community::Entity::find()
        .order_by_asc(community::Column::Name)
        .all(&*state.db)
        .await
    {
        Ok(communities) => communities,
        Err(e) => {
            tracing::error!("failed to load communities: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let rows: Vec<PersonRow> = people
        .into_iter()
        .map(|(person, community)| PersonRow {
            id: person.id,
            full_name: person.full_name,
            role: person.role.value(),
            role_label: person.role.label(),
            community_id: person.community_id,
            community: community.map(|c| c.name),
            phone: person.phone,
            active: person.active,
        })
        .collect();

    let tmpl = state.templates.get_template("people.html").unwrap();
    let html = tmpl
        .render(context! {
            people => rows,
            communities => communities,
            roles => role_options(),
            active => "people",
            error => params.error,
            notice => params.notice,
        })
        .unwrap();
    Html(html).into_response()
}

pub async fn create_person(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Form(form): Form<PersonForm>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    let full_name = form.full_name.trim().to_string();
    if full_name.is_empty() {
        return Redirect::to("/people?error=Full+name+is+required").into_response();
    }

    let model = person::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(full_name),
        role: Set(form.role),
        community_id: Set(parse_community(&form.community_id)),
        phone: Set(normalized_phone(&form.phone)),
        active: Set(true),
        ..Default::default()
    };

    match model.insert(&*state.db).await {
        Ok(_) => Redirect::to("/people?notice=Person+registered").into_response(),
        Err(e) => {
            tracing::error!("failed to create person: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn update_person(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
    Form(form): Form<PersonForm>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    let full_name = form.full_name.trim().to_string();
    if full_name.is_empty() {
        return Redirect::to("/people?error=Full+name+is+required").into_response();
    }

    let existing = match person::Entity::find_by_id(id).one(&*state.db).await {
        Ok(Some(existing)) => existing,
        Ok(None) => return (StatusCode::NOT_FOUND, "Person not found").into_response(),
        Err(e) => {
            tracing::error!("failed to load person: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let mut model: person::ActiveModel = existing.into();
    model.full_name = Set(full_name);
    model.role = Set(form.role);
    model.community_id = Set(parse_community(&form.community_id));
    model.phone = Set(normalized_phone(&form.phone));
    model.active = Set(form.active.is_some());
    model.updated_at = Set(Utc::now().naive_utc());

    match model.update(&*state.db).await {
        Ok(_) => Redirect::to("/people?notice=Person+updated").into_response(),
        Err(e) => {
            tracing::error!("failed to update person: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn delete_person(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    match person::Entity::delete_by_id(id).exec(&*state.db).await {
        Ok(_) => Redirect::to("/people?notice=Person+deleted").into_response(),
        Err(e) => {
            tracing::error!("failed to delete person: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
