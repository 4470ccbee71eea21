//! Graph views, grouping and the flight network.

use axum::extract::State;

use super::{Envelope, QueryParams};
use crate::context::Context;
use crate::error::AppError;
use crate::services::{AirportService, GraphService, GroupService, LoaderService};

pub async fn read_db_graph(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let aggregated = params.flag("aggregated")?.unwrap_or(false);
    let graph = ctx.resolve::<GraphService>().read_graph(aggregated).await?;
    Envelope::new().merge(graph)
}

pub async fn graph_summary(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let summary = ctx.resolve::<GraphService>().summary().await?;
    Envelope::new().merge(summary)
}

pub async fn graph_schema(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let schema = ctx.resolve::<LoaderService>().graph_schema().await?;
    Envelope::new().with("schema", schema)
}

pub async fn group_by(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let group_id = params.required("group_id")?;
    let members = params.list("entity_ids").unwrap_or_default();
    let grouped = ctx
        .resolve::<GroupService>()
        .group_by(group_id, &members)
        .await?;
    Envelope::message(format!("Group {} created with {} members", group_id, members.len()))
        .merge(grouped)
}

pub async fn airport_graph(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let graph = ctx.resolve::<AirportService>().airport_graph().await?;
    Envelope::new().merge(graph)
}

pub async fn airport_neighborhood(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let neighborhood = ctx
        .resolve::<AirportService>()
        .neighborhood(params.required("airport_id")?, params.number("hops")?)
        .await?;
    Envelope::new().merge(neighborhood)
}

pub async fn airport_route(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let route = ctx
        .resolve::<AirportService>()
        .route(params.required("from")?, params.required("to")?)
        .await?;
    Envelope::new().merge(route)
}
