//! HTTP API.
//!
//! Every handler resolves its service from the shared [`Context`] and
//! answers with an [`Envelope`]; failures go through
//! [`AppError`](crate::error::AppError)'s response conversion.

mod admin;
mod envelope;
mod graph;
mod messages;
mod params;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::context::Context;

pub use envelope::Envelope;
pub use params::QueryParams;

/// All routes, with CORS and request tracing.
pub fn router(ctx: Context) -> Router {
    Router::new()
        .route("/", get(admin::root))
        .route("/health", get(admin::health))
        // Loading
        .route("/clear-db", get(admin::clear_db))
        .route("/read-db-example", get(admin::read_example))
        .route("/write-db-example", get(admin::write_example))
        .route("/load-graph-json", get(admin::load_graph_json))
        .route("/load-csv", get(admin::load_csv))
        .route("/start_loading", get(admin::start_loading))
        .route("/loading-status", get(admin::loading_status))
        .route("/loading-jobs", get(admin::loading_jobs))
        // Transformation
        .route("/flatten-communications", get(admin::flatten_communications))
        .route("/combine-links", get(admin::combine_links))
        .route("/remove-redundant-edges", get(admin::remove_redundant_edges))
        .route("/collapse-relationships", get(admin::collapse_relationships))
        .route("/aggregate-interactions", get(admin::aggregate_interactions))
        .route("/transform", get(admin::transform))
        // Graph views
        .route("/read-db-graph", get(graph::read_db_graph))
        .route("/graph-summary", get(graph::graph_summary))
        .route("/graph-schema", get(graph::graph_schema))
        .route("/group-by", get(graph::group_by))
        // Messages
        .route("/massive-sequence-view", get(messages::massive_sequence_view))
        .route("/events-by-date", get(messages::events_by_date))
        .route("/search-content", get(messages::search_content))
        .route("/evidence-for-event", get(messages::evidence_for_event))
        .route("/sankey-communication-flows", get(messages::sankey_flows))
        .route("/similarity-search", get(messages::similarity_search))
        // Flight network
        .route("/graph-data", get(graph::airport_graph))
        .route("/airports/neighborhood", get(graph::airport_neighborhood))
        .route("/airports/route", get(graph::airport_route))
        .with_state(ctx)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
