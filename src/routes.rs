use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, header},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Movie, MoviePage},
    query::{self, MovieQuery},
    store::MovieReader,
};

const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::REFERRER_POLICY, "no-referrer"),
];

pub fn router(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> =
            state.config.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_headers(Any)
    };

    let mut router = Router::new()
        .route("/api/health", get(health))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/{tconst}", get(get_movie))
        .with_state(state);

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value)));
    }

    router.layer(cors).layer(CompressionLayer::new()).layer(TraceLayer::new_for_http())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MovieQuery>,
) -> AppResult<Json<MoviePage>> {
    let built = query::build(&params, &state.config.query());
    debug!(
        unfiltered = built.filter.is_empty(),
        clauses = built.filter.clauses().len(),
        page = built.page,
        "listing movies"
    );

    let (total_items, items) = tokio::try_join!(
        state.store.count(&built.filter),
        state.store.fetch(&built.filter, &built.sort, built.offset, built.limit),
    )?;

    Ok(Json(MoviePage {
        page: built.page,
        page_size: built.limit,
        total_pages: query::total_pages(total_items, built.limit),
        total_items,
        items,
    }))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(tconst): Path<String>,
) -> AppResult<Json<Movie>> {
    state.store.find_by_id(tconst.trim()).await?.map(Json).ok_or(AppError::NotFound)
}
