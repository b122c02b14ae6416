//! Episode API handlers.
//!
//! Every handler body runs inside `observability::instrument`, so validation
//! failures are measured and logged the same way as backend failures.

use crate::errors::TrackerError;
use crate::models::{
    non_blank, AllEntriesResponse, EpisodeResponse, ShowEpisodeParams, ShowUserParams,
    UpdateEpisodeRequest, UpdateEpisodeResponse, UserShow, UserShowsResponse,
};
use crate::observability::{instrument, ApiCall};
use crate::routes::AppState;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use std::sync::Arc;

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Unreadable query strings (a repeated key, say) become a plain 400 inside
/// the instrumented call instead of axum's text rejection.
fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, TrackerError> {
    query.map(|Query(params)| params).map_err(|rejection| {
        tracing::debug!(target: "tracker.api", error = %rejection, "Invalid query string");
        TrackerError::Validation("Invalid query string".to_string())
    })
}

fn api_call(endpoint: &'static str, method: &'static str, headers: &HeaderMap) -> ApiCall {
    ApiCall::new(endpoint, method).with_user_agent(user_agent(headers))
}

/// Handler for GET /api/show_episode
///
/// Query parameters `username` and `tv_show` are both required.
///
/// # Response
///
/// - 200 OK: the stored record
/// - 400 Bad Request: missing or blank parameter, unreadable query string
/// - 404 Not Found: no record for the pair
/// - 500 Internal Server Error: backend failure
#[tracing::instrument(skip_all, name = "tracker.episodes.show_episode")]
pub async fn show_episode(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<ShowEpisodeParams>, QueryRejection>,
) -> Result<Json<EpisodeResponse>, TrackerError> {
    let call = api_call("show_episode", "GET", &headers);

    instrument(state.telemetry.as_ref(), call, async {
        let params = query_params(query)?;
        let (Some(username), Some(show_title)) = (
            non_blank(params.username.as_deref()),
            non_blank(params.tv_show.as_deref()),
        ) else {
            return Err(TrackerError::Validation(
                "Username and tv_show are required".to_string(),
            ));
        };

        let record = state.store.get_episode(username, show_title).await?;
        Ok(Json(EpisodeResponse::from(record)))
    })
    .await
}

/// Handler for GET /api/show_user
///
/// Lists every show tracked for `username`. A user with no records gets an
/// empty list, not a 404.
#[tracing::instrument(skip_all, name = "tracker.episodes.show_user")]
pub async fn show_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    query: Result<Query<ShowUserParams>, QueryRejection>,
) -> Result<Json<UserShowsResponse>, TrackerError> {
    let call = api_call("show_user", "GET", &headers);

    instrument(state.telemetry.as_ref(), call, async {
        let params = query_params(query)?;
        let username = non_blank(params.username.as_deref())
            .ok_or_else(|| TrackerError::Validation("Username is required".to_string()))?;

        let shows: Vec<UserShow> = state
            .store
            .list_shows_for_user(username)
            .await?
            .into_iter()
            .map(UserShow::from)
            .collect();

        Ok(Json(UserShowsResponse {
            username: username.to_string(),
            total_shows: shows.len(),
            shows,
        }))
    })
    .await
}

/// Handler for POST /api/update_episode
///
/// # Request Body
///
/// ```json
/// {"username": "alice", "tv_show": "Lost", "season": 2, "episode": "5"}
/// ```
///
/// `season` and `episode` may be integers or numeric strings.
///
/// # Response
///
/// - 200 OK: the record as written, with a success message
/// - 400 Bad Request: malformed JSON, missing field, non-integer or
///   non-positive season/episode
/// - 500 Internal Server Error: backend failure
#[tracing::instrument(skip_all, name = "tracker.episodes.update_episode")]
pub async fn update_episode(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UpdateEpisodeResponse>, TrackerError> {
    let call = api_call("update_episode", "POST", &headers);

    instrument(state.telemetry.as_ref(), call, async {
        // Parsed by hand so malformed JSON is a 400 rather than axum's 422.
        let request: UpdateEpisodeRequest = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(target: "tracker.api", error = %e, "Invalid request body");
            TrackerError::Validation("Invalid request body".to_string())
        })?;

        let update = request
            .validate()
            .map_err(|reason| TrackerError::Validation(reason.to_string()))?;

        let record = state
            .store
            .upsert_episode(
                &update.username,
                &update.show_title,
                update.season,
                update.episode,
            )
            .await?;

        tracing::info!(
            target: "tracker.api",
            username = %record.username,
            tv_show = %record.show_title,
            season = record.season,
            episode = record.episode,
            "Episode progress updated"
        );

        Ok(Json(UpdateEpisodeResponse::from(record)))
    })
    .await
}

/// Handler for GET /api/show_all
///
/// Returns every record from a single scan. Large tables may be truncated.
#[tracing::instrument(skip_all, name = "tracker.episodes.show_all")]
pub async fn show_all(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AllEntriesResponse>, TrackerError> {
    let call = api_call("show_all", "GET", &headers);

    instrument(state.telemetry.as_ref(), call, async {
        let entries: Vec<EpisodeResponse> = state
            .store
            .list_all()
            .await?
            .into_iter()
            .map(EpisodeResponse::from)
            .collect();

        Ok(Json(AllEntriesResponse {
            total_entries: entries.len(),
            entries,
        }))
    })
    .await
}
