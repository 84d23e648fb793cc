use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::Form;
use chrono::{NaiveDate, Utc};
use minijinja::context;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::user::AuthSession,
    entities::{community, person, schedule, schedule::ServiceTime, schedule_participant},
    router::AppState,
    routes::require_admin,
    util::dates::{is_editable, month_range, month_value, parse_month, start_of_month},
};

#[derive(Deserialize)]
pub struct ScheduleListParams {
    community: Option<String>,
    month: Option<String>,
    error: Option<String>,
    notice: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleFormParams {
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct ScheduleForm {
    community_id: String,
    date: String,
    time: ServiceTime,
    notes: String,
    #[serde(default)]
    participants: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct EditScheduleForm {
    notes: String,
    #[serde(default)]
    participants: Vec<Uuid>,
}

#[derive(Serialize)]
struct ParticipantChip {
    full_name: String,
    role_label: &'static str,
}

#[derive(Serialize)]
struct ScheduleCard {
    id: Uuid,
    date_label: String,
    time: String,
    community: String,
    participants: Vec<ParticipantChip>,
    notes: Option<String>,
    editable: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/new", get(new_schedule))
        .route("/{id}/edit", get(edit_schedule).post(save_schedule))
        .route("/{id}/delete", post(delete_schedule))
}

/// One link row per selected person. The rows are derived from the selection
/// alone; whatever was stored before plays no part in the outcome, which is
/// what makes the save a full replace rather than a diff.
fn participant_links(
    schedule_id: Uuid,
    selection: &[Uuid],
) -> Vec<schedule_participant::ActiveModel> {
    selection
        .iter()
        .map(|person_id| schedule_participant::ActiveModel {
            id: Set(Uuid::new_v4()),
            schedule_id: Set(schedule_id),
            person_id: Set(*person_id),
            ..Default::default()
        })
        .collect()
}

async fn active_people(state: &AppState) -> Result<Vec<person::Model>, sea_orm::DbErr> {
    person::Entity::find()
        .filter(person::Column::Active.eq(true))
        .order_by_asc(person::Column::FullName)
        .all(&*state.db)
        .await
}

async fn all_communities(state: &AppState) -> Result<Vec<community::Model>, sea_orm::DbErr> {
    community::Entity::find()
        .order_by_asc(community::Column::Name)
        .all(&*state.db)
        .await
}

pub async fn list_schedules(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(params): Query<ScheduleListParams>,
) -> impl IntoResponse {
    if auth_session.user.is_none() {
        return Redirect::to("/login").into_response();
    }

    let today = Utc::now().date_naive();
    let month = params
        .month
        .as_deref()
        .and_then(parse_month)
        .unwrap_or_else(|| start_of_month(today));
    let (month_start, month_end) = month_range(month);

    let community_filter = params
        .community
        .as_deref()
        .filter(|c| *c != "all")
        .and_then(|c| Uuid::parse_str(c).ok());

    let mut query = schedule::Entity::find()
        .filter(schedule::Column::Date.gte(month_start))
        .filter(schedule::Column::Date.lt(month_end))
        .order_by_asc(schedule::Column::Date)
        .order_by_asc(schedule::Column::Time);
    if let Some(community_id) = community_filter {
        query = query.filter(schedule::Column::CommunityId.eq(community_id));
    }

    let schedules = match query.find_also_related(community::Entity).all(&*state.db).await {
        Ok(schedules) => schedules,
        Err(e) => {
            tracing::error!("failed to load schedules: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let schedule_ids: Vec<Uuid> = schedules.iter().map(|(s, _)| s.id).collect();
    let links = match schedule_participant::Entity::find()
        .filter(schedule_participant::Column::ScheduleId.is_in(schedule_ids))
        .find_also_related(person::Entity)
        .all(&*state.db)
        .await
    {
        Ok(links) => links,
        Err(e) => {
            tracing::error!("failed to load participants: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let mut by_schedule: HashMap<Uuid, Vec<ParticipantChip>> = HashMap::new();
    for (link, person) in links {
        if let Some(person) = person {
            by_schedule
                .entry(link.schedule_id)
                .or_default()
                .push(ParticipantChip {
                    full_name: person.full_name,
                    role_label: person.role.label(),
                });
        }
    }

    let cards: Vec<ScheduleCard> = schedules
        .into_iter()
        .map(|(schedule, community)| ScheduleCard {
            id: schedule.id,
            date_label: schedule.date.format("%A, %d %B %Y").to_string(),
            time: schedule.time.as_str().to_string(),
            community: community.map(|c| c.name).unwrap_or_default(),
            participants: by_schedule.remove(&schedule.id).unwrap_or_default(),
            notes: schedule.notes,
            editable: is_editable(schedule.date, today),
        })
        .collect();

    let communities = match all_communities(&state).await {
        Ok(communities) => communities,
        Err(e) => {
            tracing::error!("failed to load communities: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let share_url = format!("{}/public-schedules", state.public_base_url);

    let tmpl = state.templates.get_template("schedules.html").unwrap();
    let html = tmpl
        .render(context! {
            schedules => cards,
            communities => communities,
            selected_community => params.community.unwrap_or_else(|| "all".to_string()),
            month => month_value(month),
            share_url => share_url,
            active => "schedules",
            error => params.error,
            notice => params.notice,
        })
        .unwrap();
    Html(html).into_response()
}

pub async fn new_schedule(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(params): Query<ScheduleFormParams>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    let (communities, people) = match (all_communities(&state).await, active_people(&state).await) {
        (Ok(communities), Ok(people)) => (communities, people),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("failed to load schedule form data: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let people: Vec<_> = people
        .into_iter()
        .map(|p| {
            context! {
                id => p.id,
                full_name => p.full_name,
                role_label => p.role.label(),
            }
        })
        .collect();

    let times: Vec<&str> = ServiceTime::ALL.iter().map(|t| t.as_str()).collect();

    let tmpl = state.templates.get_template("schedule_new.html").unwrap();
    let html = tmpl
        .render(context! {
            communities => communities,
            people => people,
            times => times,
            active => "new-schedule",
            error => params.error,
        })
        .unwrap();
    Html(html).into_response()
}

pub async fn create_schedule(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Form(form): Form<ScheduleForm>,
) -> impl IntoResponse {
    let user = match require_admin(&auth_session) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let community_id = match Uuid::parse_str(&form.community_id) {
        Ok(id) => id,
        Err(_) => {
            return Redirect::to("/schedules/new?error=Select+a+community").into_response();
        }
    };
    let date = match NaiveDate::parse_from_str(&form.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return Redirect::to("/schedules/new?error=Select+a+date").into_response(),
    };
    if form.participants.is_empty() {
        return Redirect::to("/schedules/new?error=Select+at+least+one+participant")
            .into_response();
    }

    let notes = form.notes.trim();
    let notes = (!notes.is_empty()).then(|| notes.to_string());

    let model = schedule::ActiveModel {
        id: Set(Uuid::new_v4()),
        date: Set(date),
        time: Set(form.time),
        community_id: Set(community_id),
        notes: Set(notes),
        created_by: Set(Some(user.id)),
        ..Default::default()
    };

    match create_schedule_in_txn(&state.db, model, &form.participants).await {
        Ok(_) => Redirect::to("/schedules?notice=Schedule+created").into_response(),
        Err(e) => {
            tracing::error!("failed to create schedule: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Schedule row and participant links land together or not at all; an error
/// on either insert rolls the whole transaction back.
async fn create_schedule_in_txn(
    db: &sea_orm::DatabaseConnection,
    model: schedule::ActiveModel,
    participants: &[Uuid],
) -> Result<schedule::Model, sea_orm::DbErr> {
    let txn = db.begin().await?;

    let created = match model.insert(&txn).await {
        Ok(created) => created,
        Err(e) => {
            let _ = txn.rollback().await;
            return Err(e);
        }
    };

    let links = participant_links(created.id, participants);
    if let Err(e) = schedule_participant::Entity::insert_many(links).exec(&txn).await {
        let _ = txn.rollback().await;
        return Err(e);
    }

    txn.commit().await?;
    Ok(created)
}

async fn load_editable_schedule(
    state: &AppState,
    id: Uuid,
) -> Result<schedule::Model, axum::response::Response> {
    let schedule = match schedule::Entity::find_by_id(id).one(&*state.db).await {
        Ok(Some(schedule)) => schedule,
        Ok(None) => return Err((StatusCode::NOT_FOUND, "Schedule not found").into_response()),
        Err(e) => {
            tracing::error!("failed to load schedule: {e}");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response());
        }
    };

    let today = Utc::now().date_naive();
    if !is_editable(schedule.date, today) {
        return Err(
            Redirect::to("/schedules?error=Schedules+from+past+months+are+read-only")
                .into_response(),
        );
    }

    Ok(schedule)
}

pub async fn edit_schedule(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    let schedule = match load_editable_schedule(&state, id).await {
        Ok(schedule) => schedule,
        Err(resp) => return resp,
    };

    let current: Vec<Uuid> = match schedule_participant::Entity::find()
        .filter(schedule_participant::Column::ScheduleId.eq(schedule.id))
        .all(&*state.db)
        .await
    {
        Ok(links) => links.into_iter().map(|l| l.person_id).collect(),
        Err(e) => {
            tracing::error!("failed to load participants: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let people = match active_people(&state).await {
        Ok(people) => people,
        Err(e) => {
            tracing::error!("failed to load people: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let people: Vec<_> = people
        .into_iter()
        .map(|p| {
            context! {
                id => p.id,
                full_name => p.full_name,
                role_label => p.role.label(),
                selected => current.contains(&p.id),
            }
        })
        .collect();

    let tmpl = state.templates.get_template("schedule_edit.html").unwrap();
    let html = tmpl
        .render(context! {
            schedule_id => schedule.id,
            date_label => schedule.date.format("%d/%m/%Y").to_string(),
            time => schedule.time.as_str(),
            notes => schedule.notes.unwrap_or_default(),
            people => people,
            active => "schedules",
        })
        .unwrap();
    Html(html).into_response()
}

pub async fn save_schedule(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
    Form(form): Form<EditScheduleForm>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    let schedule = match load_editable_schedule(&state, id).await {
        Ok(schedule) => schedule,
        Err(resp) => return resp,
    };

    let notes = form.notes.trim();
    let notes = (!notes.is_empty()).then(|| notes.to_string());

    // Note update and the participant full-replace share one transaction, so
    // a failure cannot strand the schedule with a half-written set.
    let txn = match state.db.begin().await {
        Ok(txn) => txn,
        Err(e) => {
            tracing::error!("failed to begin transaction: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to begin transaction")
                .into_response();
        }
    };

    let schedule_id = schedule.id;
    let mut model: schedule::ActiveModel = schedule.into();
    model.notes = Set(notes);
    model.updated_at = Set(Utc::now().naive_utc());
    if let Err(e) = model.update(&txn).await {
        let _ = txn.rollback().await;
        tracing::error!("failed to update schedule: {e}");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    if let Err(e) = schedule_participant::Entity::delete_many()
        .filter(schedule_participant::Column::ScheduleId.eq(schedule_id))
        .exec(&txn)
        .await
    {
        let _ = txn.rollback().await;
        tracing::error!("failed to clear participants: {e}");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    let links = participant_links(schedule_id, &form.participants);
    if !links.is_empty() {
        if let Err(e) = schedule_participant::Entity::insert_many(links).exec(&txn).await {
            let _ = txn.rollback().await;
            tracing::error!("failed to insert participants: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    }

    match txn.commit().await {
        Ok(_) => Redirect::to("/schedules?notice=Schedule+updated").into_response(),
        Err(e) => {
            tracing::error!("failed to commit schedule edit: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(resp) = require_admin(&auth_session) {
        return resp;
    }

    let schedule = match load_editable_schedule(&state, id).await {
        Ok(schedule) => schedule,
        Err(resp) => return resp,
    };

    let txn = match state.db.begin().await {
        Ok(txn) => txn,
        Err(e) => {
            tracing::error!("failed to begin transaction: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to begin transaction")
                .into_response();
        }
    };

    if let Err(e) = schedule_participant::Entity::delete_many()
        .filter(schedule_participant::Column::ScheduleId.eq(schedule.id))
        .exec(&txn)
        .await
    {
        let _ = txn.rollback().await;
        tracing::error!("failed to delete participants: {e}");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    if let Err(e) = schedule::Entity::delete_by_id(schedule.id).exec(&txn).await {
        let _ = txn.rollback().await;
        tracing::error!("failed to delete schedule: {e}");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    match txn.commit().await {
        Ok(_) => Redirect::to("/schedules?notice=Schedule+deleted").into_response(),
        Err(e) => {
            tracing::error!("failed to commit schedule delete: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn set_value(value: &ActiveValue<Uuid>) -> Uuid {
        match value {
            ActiveValue::Set(v) => *v,
            _ => panic!("expected a set value"),
        }
    }

    #[test]
    fn links_mirror_the_selection_exactly() {
        let schedule_id = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        // The existing participant set never feeds into link construction,
        // so replacing {A, B} with a selection of {B, C} stores exactly
        // {B, C}.
        let links = participant_links(schedule_id, &[b, c]);

        let people: Vec<Uuid> = links.iter().map(|l| set_value(&l.person_id)).collect();
        assert_eq!(people, vec![b, c]);
        assert!(links.iter().all(|l| set_value(&l.schedule_id) == schedule_id));
    }

    #[test]
    fn empty_selection_produces_no_links() {
        assert!(participant_links(Uuid::new_v4(), &[]).is_empty());
    }

    #[tokio::test]
    async fn failing_link_insert_rolls_back_the_schedule_row() {
        use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

        let now = Utc::now().naive_utc();
        let stored = schedule::Model {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 9, 6).unwrap(),
            time: ServiceTime::EightAm,
            community_id: Uuid::new_v4(),
            notes: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        };

        // The schedule insert succeeds; the link insert fails whichever way
        // the backend issues it.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .append_exec_errors([DbErr::Custom("link insert failed".to_string())])
            .append_query_errors([DbErr::Custom("link insert failed".to_string())])
            .into_connection();

        let model = schedule::ActiveModel {
            id: Set(stored.id),
            date: Set(stored.date),
            time: Set(stored.time),
            community_id: Set(stored.community_id),
            notes: Set(None),
            created_by: Set(None),
            ..Default::default()
        };

        let result = create_schedule_in_txn(&db, model, &[Uuid::new_v4()]).await;
        assert!(result.is_err());

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ROLLBACK"), "expected a rollback, got: {log}");
        assert!(!log.contains("COMMIT"), "nothing must commit, got: {log}");
    }
}
