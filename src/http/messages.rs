//! Message listings, evidence, flows and similarity search.

use axum::extract::State;

use super::{Envelope, QueryParams};
use crate::context::Context;
use crate::error::AppError;
use crate::repositories::MessageFilter;
use crate::search::SearchOptions;
use crate::services::{CommunicationService, SearchService};

pub async fn massive_sequence_view(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let filter = MessageFilter {
        event_ids: params.list("event_ids"),
        start_date: params.get("start_date").map(str::to_string),
        end_date: params.get("end_date").map(str::to_string),
        entity_ids: params.list("entity_ids"),
        keyword: params.get("keyword").map(str::to_string),
        limit: params.number("limit")?,
    };
    let messages = ctx
        .resolve::<CommunicationService>()
        .massive_sequence_view(filter)
        .await?;
    Envelope::new().with("data", messages)
}

pub async fn events_by_date(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let events = ctx
        .resolve::<CommunicationService>()
        .events_by_date(params.required("date")?)
        .await?;
    Envelope::new().with("data", events)
}

pub async fn search_content(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let messages = ctx
        .resolve::<CommunicationService>()
        .search_content(params.required("keyword")?, params.number("limit")?)
        .await?;
    Envelope::new().with("data", messages)
}

pub async fn evidence_for_event(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let evidence = ctx
        .resolve::<CommunicationService>()
        .evidence_for_event(params.required("event_id")?)
        .await?;
    Envelope::new().merge(evidence)
}

pub async fn sankey_flows(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let links = ctx
        .resolve::<CommunicationService>()
        .sankey_flows(params.required("entity_id")?, params.get("date"))
        .await?;
    Envelope::new().with("links", links)
}

pub async fn similarity_search(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let defaults = SearchOptions::default();
    let options = SearchOptions {
        top_k: params.number("top_k")?.unwrap_or(defaults.top_k),
        order_by_time: params.flag("order_by_time")?.unwrap_or(defaults.order_by_time),
        min_score: params.number("min_score")?,
    };
    let results = ctx
        .resolve::<SearchService>()
        .similarity_search(params.get("query").unwrap_or(""), options)
        .await?;
    Envelope::new().with("data", results)
}
