use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use chrono::Utc;
use minijinja::context;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::user::AuthSession,
    entities::{person::Role, prelude::*, schedule, schedule_participant},
    router::AppState,
    util::dates::{month_label, month_options, month_range, month_value, parse_month, start_of_month},
};

#[derive(Deserialize)]
pub struct ReportParams {
    month: Option<String>,
}

/// One schedule assignment for one person; a person appearing on three
/// schedules in the month contributes three entries.
pub struct ReportEntry {
    pub person_id: Uuid,
    pub full_name: String,
    pub role: Role,
    pub community: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub full_name: String,
    pub role_label: &'static str,
    pub community: String,
    pub total: u32,
}

/// Collapse assignment entries into one row per person, counting
/// appearances, ordered by count descending. Ties keep first-seen order;
/// no further tie-break is defined.
pub fn tally_participation(entries: Vec<ReportEntry>) -> Vec<ReportRow> {
    let mut tallied: Vec<(Uuid, ReportRow)> = Vec::new();
    for entry in entries {
        match tallied.iter_mut().find(|(id, _)| *id == entry.person_id) {
            Some((_, row)) => row.total += 1,
            None => tallied.push((
                entry.person_id,
                ReportRow {
                    full_name: entry.full_name,
                    role_label: entry.role.label(),
                    community: entry.community.unwrap_or_else(|| "-".to_string()),
                    total: 1,
                },
            )),
        }
    }

    let mut rows: Vec<ReportRow> = tallied.into_iter().map(|(_, row)| row).collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

pub async fn reports(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(params): Query<ReportParams>,
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

    let schedule_ids: Vec<Uuid> = match Schedule::find()
        .select_only()
        .column(schedule::Column::Id)
        .filter(schedule::Column::Date.gte(month_start))
        .filter(schedule::Column::Date.lt(month_end))
        .into_tuple()
        .all(&*state.db)
        .await
    {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!("failed to load schedules for report: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let links = match ScheduleParticipant::find()
        .filter(schedule_participant::Column::ScheduleId.is_in(schedule_ids))
        .find_also_related(Person)
        .all(&*state.db)
        .await
    {
        Ok(links) => links,
        Err(e) => {
            tracing::error!("failed to load participants for report: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let community_names: HashMap<Uuid, String> = match Community::find().all(&*state.db).await
    {
        Ok(communities) => communities.into_iter().map(|c| (c.id, c.name)).collect(),
        Err(e) => {
            tracing::error!("failed to load communities for report: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let entries: Vec<ReportEntry> = links
        .into_iter()
        .filter_map(|(_, person)| person)
        .map(|person| ReportEntry {
            person_id: person.id,
            full_name: person.full_name,
            role: person.role,
            community: person
                .community_id
                .and_then(|id| community_names.get(&id).cloned()),
        })
        .collect();

    let rows = tally_participation(entries);

    let tmpl = state.templates.get_template("reports.html").unwrap();
    let html = tmpl
        .render(context! {
            rows => rows,
            months => month_options(today),
            month => month_value(month),
            month_label => month_label(month),
            active => "reports",
        })
        .unwrap();
    Html(html).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(person_id: Uuid, name: &str) -> ReportEntry {
        ReportEntry {
            person_id,
            full_name: name.to_string(),
            role: Role::AltarServer,
            community: Some("Matriz".to_string()),
        }
    }

    #[test]
    fn counts_appearances_and_sorts_descending() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        // Schedule 1 has {A, B}, schedule 2 has {A}.
        let entries = vec![entry(a, "Ana"), entry(b, "Bruno"), entry(a, "Ana")];
        let rows = tally_participation(entries);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].full_name, "Ana");
        assert_eq!(rows[0].total, 2);
        assert_eq!(rows[1].full_name, "Bruno");
        assert_eq!(rows[1].total, 1);
    }

    #[test]
    fn missing_community_renders_as_dash() {
        let mut e = entry(Uuid::new_v4(), "Clara");
        e.community = None;
        let rows = tally_participation(vec![e]);
        assert_eq!(rows[0].community, "-");
    }

    #[test]
    fn empty_month_yields_no_rows() {
        assert!(tally_participation(Vec::new()).is_empty());
    }
}
