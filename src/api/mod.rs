use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::extract::live_matches;
use crate::models::{MatchRecord, Snapshot};
use crate::refresh::Refresher;

mod health;

/// How many links `/api/match/:slug` suggests on a miss.
const SAMPLE_LINKS: usize = 5;
/// Characters of raw text shown per record in `/api/debug`.
const RAW_PREVIEW_CHARS: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub refresher: Arc<Refresher>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(refresher: Arc<Refresher>) -> Self {
        AppState {
            refresher,
            started_at: Instant::now(),
        }
    }

    async fn snapshot(&self) -> Arc<Snapshot> {
        self.refresher.store().current().await
    }

    fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}

/// Build the Axum router for the API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health::health_handler))
        .route("/api/matches", get(matches_handler))
        .route("/api/matches/live", get(live_handler))
        .route("/api/matches/today", get(today_handler))
        .route("/api/matches/date/*date", get(date_handler))
        .route("/api/matches/by-league/:league", get(league_handler))
        .route("/api/search/:team", get(search_handler))
        .route("/api/match/:slug", get(match_by_slug_handler))
        .route("/api/match-by-url", get(match_by_url_handler))
        .route("/api/status", get(status_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/debug", get(debug_handler))
        .fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(panic_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn count(matches: &[MatchRecord], field: impl Fn(&MatchRecord) -> &Option<String>) -> usize {
    matches
        .iter()
        .filter(|m| field(m).as_deref().is_some_and(|v| !v.is_empty()))
        .count()
}

fn contains_ci(haystack: &Option<String>, needle_lower: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains(needle_lower))
}

/// GET /
async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Match listing scraper API",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Detailed match parsing (home/away teams, time, league, status, commentator)",
            "Scheduled refresh with stale data kept on failure",
            "Filtering by live status, date, league and team"
        ],
        "endpoints": {
            "/api/matches": "All matches with summary counts",
            "/api/matches/live": "Live matches only",
            "/api/matches/today": "Today's matches",
            "/api/matches/by-league/{league}": "Matches by league name",
            "/api/matches/date/{date}": "Matches by date (DD/MM or DD/MM/YYYY)",
            "/api/search/{team}": "Matches by team name",
            "/api/match/{slug}": "One match by slug (partial match)",
            "/api/match-by-url?url={fullUrl}": "One match by full URL",
            "/api/status": "Refresh status and uptime",
            "/api/refresh": "Force a refresh (POST)",
            "/api/debug": "Parsing diagnostics",
            "/health": "Liveness probe"
        },
        "examples": {
            "All matches": "/api/matches",
            "Live matches": "/api/matches/live",
            "Premier League": "/api/matches/by-league/premier",
            "Date 02/10": "/api/matches/date/02/10",
            "Search Barcelona": "/api/search/barcelona",
            "Match by slug": "/api/match/saint-gilloise-vs-newcastle-united"
        }
    }))
}

/// GET /api/matches
async fn matches_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snap = state.snapshot().await;
    let m = snap.matches.as_slice();
    Json(json!({
        "success": true,
        "data": m,
        "lastUpdated": snap.last_updated,
        "totalMatches": snap.total_matches,
        "status": snap.status,
        "summary": {
            "withTime": count(m, |r| &r.time),
            "withDate": count(m, |r| &r.date),
            "withTimeOnly": count(m, |r| &r.time_only),
            "withLeague": count(m, |r| &r.league),
            "withStatus": count(m, |r| &r.status),
            "withCommentator": count(m, |r| &r.blv),
            "liveMatches": m.iter().filter(|r| r.is_live()).count(),
        }
    }))
}

/// GET /api/matches/live
async fn live_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snap = state.snapshot().await;
    let live = live_matches(snap.matches.iter());
    Json(json!({
        "success": true,
        "data": live,
        "totalMatches": live.len(),
        "lastUpdated": snap.last_updated,
    }))
}

/// True when a date token refers to `today_dm` ("DD/MM") or says "today".
fn is_today(date: &Option<String>, today_dm: &str) -> bool {
    date.as_deref().is_some_and(|d| {
        let lower = d.to_lowercase();
        d.contains(today_dm) || lower.contains("today") || lower.contains("hôm nay")
    })
}

/// GET /api/matches/today
async fn today_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snap = state.snapshot().await;
    let today_dm = Local::now().format("%d/%m").to_string();
    let today: Vec<&MatchRecord> = snap
        .matches
        .iter()
        .filter(|m| is_today(&m.date, &today_dm))
        .collect();
    Json(json!({
        "success": true,
        "date": "Today",
        "data": today,
        "totalMatches": today.len(),
        "lastUpdated": snap.last_updated,
    }))
}

/// GET /api/matches/date/*date
async fn date_handler(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Json<Value> {
    let snap = state.snapshot().await;
    let found: Vec<&MatchRecord> = snap
        .matches
        .iter()
        .filter(|m| m.date.as_deref().is_some_and(|d| d.contains(date.as_str())))
        .collect();
    Json(json!({
        "success": true,
        "date": date,
        "data": found,
        "totalMatches": found.len(),
        "lastUpdated": snap.last_updated,
    }))
}

/// GET /api/matches/by-league/:league
async fn league_handler(
    State(state): State<Arc<AppState>>,
    Path(league): Path<String>,
) -> Json<Value> {
    let snap = state.snapshot().await;
    let needle = league.to_lowercase();
    let found: Vec<&MatchRecord> = snap
        .matches
        .iter()
        .filter(|m| contains_ci(&m.league, &needle))
        .collect();
    Json(json!({
        "success": true,
        "league": league,
        "data": found,
        "totalMatches": found.len(),
        "lastUpdated": snap.last_updated,
    }))
}

/// GET /api/search/:team
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Path(team): Path<String>,
) -> Json<Value> {
    let snap = state.snapshot().await;
    let needle = team.to_lowercase();
    let found: Vec<&MatchRecord> = snap
        .matches
        .iter()
        .filter(|m| {
            m.home_team.to_lowercase().contains(&needle) || m.away_team.to_lowercase().contains(&needle)
        })
        .collect();
    Json(json!({
        "success": true,
        "searchTerm": team,
        "data": found,
        "totalMatches": found.len(),
        "lastUpdated": snap.last_updated,
    }))
}

/// GET /api/match/:slug
async fn match_by_slug_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let snap = state.snapshot().await;
    match snap
        .matches
        .iter()
        .find(|m| !m.link.is_empty() && m.link.contains(slug.as_str()))
    {
        Some(found) => Json(json!({
            "success": true,
            "data": found,
            "lastUpdated": snap.last_updated,
        }))
        .into_response(),
        None => {
            let available: Vec<&str> = snap
                .matches
                .iter()
                .map(|m| m.link.as_str())
                .filter(|l| !l.is_empty())
                .take(SAMPLE_LINKS)
                .collect();
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "error": "Match not found",
                    "slug": slug,
                    "availableLinks": available,
                })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct UrlQuery {
    url: Option<String>,
}

/// GET /api/match-by-url?url=
async fn match_by_url_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UrlQuery>,
) -> Response {
    let url = match query.url.filter(|u| !u.trim().is_empty()) {
        Some(u) => u,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "URL parameter is required",
                    "example": "/api/match-by-url?url=https://www.xaycon.live/truc-tiep/saint-gilloise-vs-newcastle-united-23-45-01-10-2025",
                })),
            )
                .into_response();
        }
    };

    let snap = state.snapshot().await;
    match snap.matches.iter().find(|m| m.link == url) {
        Some(found) => Json(json!({
            "success": true,
            "data": found,
            "lastUpdated": snap.last_updated,
        }))
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": "Match not found",
                "url": url,
            })),
        )
            .into_response(),
    }
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snap = state.snapshot().await;
    Json(json!({
        "status": snap.status,
        "lastUpdated": snap.last_updated,
        "totalMatches": snap.total_matches,
        "uptime": state.uptime_secs(),
        "error": snap.error,
    }))
}

/// POST /api/refresh
async fn refresh_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snap = state.refresher.refresh().await;
    Json(json!({
        "success": true,
        "message": "Data refresh completed",
        "status": snap.status,
        "lastUpdated": snap.last_updated,
        "totalMatches": snap.total_matches,
        "error": snap.error,
    }))
}

/// GET /api/debug
async fn debug_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let snap = state.snapshot().await;

    let rows: Vec<Value> = snap
        .matches
        .iter()
        .map(|m| {
            let raw_len = m.raw_text.chars().count();
            let preview = if m.raw_text.is_empty() {
                "No raw text".to_string()
            } else {
                format!("{}...", m.raw_text.chars().take(RAW_PREVIEW_CHARS).collect::<String>())
            };
            json!({
                "id": m.id,
                "teams": format!("{} vs {}", m.home_team, m.away_team),
                "time": m.time,
                "date": m.date,
                "timeOnly": m.time_only,
                "league": m.league,
                "status": m.status,
                "blv": m.blv,
                "link": m.link,
                "source": m.source,
                "rawTextLength": raw_len,
                "rawTextPreview": preview,
            })
        })
        .collect();

    let mut source_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for m in snap.matches.iter() {
        *source_counts.entry(m.source.as_str()).or_default() += 1;
    }

    Json(json!({
        "success": true,
        "totalMatches": snap.matches.len(),
        "sourceCounts": source_counts,
        "lastUpdated": snap.last_updated,
        "sampleMatches": rows.iter().take(10).collect::<Vec<_>>(),
        "allMatches": rows,
    }))
}

async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Endpoint not found" })),
    )
}

fn panic_handler(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": "Internal server error" })),
    )
        .into_response()
}
