use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use chrono::Utc;
use minijinja::context;
use sea_orm::{ActiveEnum, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::user::AuthSession,
    entities::{person::Role, prelude::PublicSchedule, public_schedule},
    router::AppState,
    util::dates::{month_range, month_value, parse_month, start_of_month},
};

#[derive(Deserialize)]
pub struct PublicParams {
    month: Option<String>,
    community: Option<String>,
}

#[derive(Deserialize)]
struct RawParticipant {
    full_name: String,
    role: String,
}

#[derive(Serialize)]
struct PublicParticipant {
    full_name: String,
    role_label: String,
}

#[derive(Serialize)]
struct PublicCard {
    id: Uuid,
    date_label: String,
    time: String,
    community: String,
    participants: Vec<PublicParticipant>,
    notes: Option<String>,
}

/// Community options offered by the public filter. Only names present in
/// the month that was actually fetched appear; switching months can change
/// the list.
fn community_filter_options(rows: &[public_schedule::Model]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        if !names.contains(&row.community_name) {
            names.push(row.community_name.clone());
        }
    }
    names
}

fn parse_participants(raw: &serde_json::Value) -> Vec<PublicParticipant> {
    let parsed: Vec<RawParticipant> =
        serde_json::from_value(raw.clone()).unwrap_or_default();
    parsed
        .into_iter()
        .map(|p| PublicParticipant {
            role_label: Role::try_from_value(&p.role)
                .map(|r| r.label().to_string())
                .unwrap_or(p.role),
            full_name: p.full_name,
        })
        .collect()
}

pub async fn public_schedules(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(params): Query<PublicParams>,
) -> impl IntoResponse {
    let today = Utc::now().date_naive();
    let month = params
        .month
        .as_deref()
        .and_then(parse_month)
        .unwrap_or_else(|| start_of_month(today));
    let (month_start, month_end) = month_range(month);

    let rows = match PublicSchedule::find()
        .filter(public_schedule::Column::Date.gte(month_start))
        .filter(public_schedule::Column::Date.lt(month_end))
        .order_by_asc(public_schedule::Column::Date)
        .order_by_asc(public_schedule::Column::Time)
        .all(&*state.db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("failed to load public schedules: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let communities = community_filter_options(&rows);
    let selected = params.community.unwrap_or_else(|| "all".to_string());

    let cards: Vec<PublicCard> = rows
        .into_iter()
        .filter(|row| selected == "all" || row.community_name == selected)
        .map(|row| PublicCard {
            id: row.id,
            date_label: row.date.format("%A, %d %B").to_string(),
            time: row.time,
            community: row.community_name,
            participants: parse_participants(&row.participants),
            notes: row.notes,
        })
        .collect();

    let tmpl = state.templates.get_template("public_schedules.html").unwrap();
    let html = tmpl
        .render(context! {
            schedules => cards,
            communities => communities,
            selected_community => selected,
            month => month_value(month),
            logged_in => auth_session.user.is_some(),
        })
        .unwrap();
    Html(html).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(community: &str, day: u32) -> public_schedule::Model {
        public_schedule::Model {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
            time: "08:00".to_string(),
            notes: None,
            community_name: community.to_string(),
            participants: serde_json::json!([]),
        }
    }

    #[test]
    fn filter_options_are_scoped_to_fetched_rows() {
        let august = vec![row("Matriz", 2), row("São José", 9), row("Matriz", 16)];
        assert_eq!(community_filter_options(&august), vec!["Matriz", "São José"]);

        // A different month's fetch with different communities yields
        // different options, never the global community list.
        let september = vec![row("Santa Rita", 6)];
        assert_eq!(community_filter_options(&september), vec!["Santa Rita"]);
    }

    #[test]
    fn filter_options_empty_month() {
        assert!(community_filter_options(&[]).is_empty());
    }

    #[test]
    fn participants_json_parses_with_role_labels() {
        let raw = serde_json::json!([
            {"full_name": "Ana Souza", "role": "altar-server"},
            {"full_name": "João Lima", "role": "acolyte"}
        ]);
        let parsed = parse_participants(&raw);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].full_name, "Ana Souza");
        assert_eq!(parsed[0].role_label, "Altar server");
        assert_eq!(parsed[1].role_label, "Acolyte");
    }
}
