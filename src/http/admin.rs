//! Landing page, health, loading and transformation endpoints.

use axum::extract::State;
use axum::response::Html;

use super::{Envelope, QueryParams};
use crate::context::Context;
use crate::error::AppError;
use crate::services::{
    ExampleService, JobService, LoaderService, SearchService, TransformService,
};
use crate::transform::Pass;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>commgraph API</title></head>
  <body>
    <h1>commgraph API</h1>
    <p>Communication graph service. Try <a href="/health">/health</a>,
       <a href="/graph-summary">/graph-summary</a> or
       <a href="/read-db-example">/read-db-example</a>.</p>
  </body>
</html>
"#;

pub async fn root() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

pub async fn health(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let search = ctx.resolve::<SearchService>();
    Envelope::new()
        .with("status", "ok")?
        .with("index_ready", search.is_ready())?
        .with("indexed_messages", ctx.index.message_count())?
        .with("started_at", ctx.started_at)
}

pub async fn clear_db(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    ctx.resolve::<LoaderService>().clear_database().await?;
    Ok(Envelope::message("Database cleared"))
}

pub async fn write_example(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    ctx.resolve::<ExampleService>().write().await?;
    Ok(Envelope::message("Sample data written"))
}

pub async fn read_example(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let lines = ctx.resolve::<ExampleService>().read_lines().await?;
    Envelope::new().with("db-content", lines)
}

pub async fn load_graph_json(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let clear = params.flag("clear")?.unwrap_or(true);
    let summary = ctx.resolve::<LoaderService>().load_graph_json(clear).await?;
    Envelope::message(format!(
        "Loaded {} nodes and {} edges",
        summary.nodes, summary.edges
    ))
    .merge(summary)
}

pub async fn load_csv(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let clear = params.flag("clear")?.unwrap_or(false);
    let summary = ctx.resolve::<LoaderService>().load_airports(clear).await?;
    Envelope::message(format!(
        "Loaded {} airports and {} connections",
        summary.nodes, summary.edges
    ))
    .merge(summary)
}

pub async fn start_loading(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let job = ctx.resolve::<JobService>().start_loading()?;
    Envelope::message("Loading started")
        .with("job_id", &job.id)?
        .with("job", job)
}

pub async fn loading_status(
    State(ctx): State<Context>,
    params: QueryParams,
) -> Result<Envelope, AppError> {
    let job = ctx
        .resolve::<JobService>()
        .status(params.required("job_id")?)?;
    Envelope::new().merge(job)
}

pub async fn loading_jobs(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    Envelope::new().with("data", ctx.resolve::<JobService>().list())
}

async fn run_pass(ctx: &Context, pass: Pass) -> Result<Envelope, AppError> {
    let report = ctx.resolve::<TransformService>().run_pass(pass).await?;
    Envelope::message(format!(
        "{}: {} created, {} deleted",
        pass, report.created, report.deleted
    ))
    .with("report", report)
}

pub async fn flatten_communications(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    run_pass(&ctx, Pass::FlattenCommunications).await
}

pub async fn combine_links(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    run_pass(&ctx, Pass::CombineLinks).await
}

pub async fn remove_redundant_edges(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    run_pass(&ctx, Pass::RemoveRedundantEdges).await
}

pub async fn collapse_relationships(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    run_pass(&ctx, Pass::CollapseRelationships).await
}

pub async fn aggregate_interactions(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    run_pass(&ctx, Pass::AggregateInteractions).await
}

pub async fn transform(State(ctx): State<Context>) -> Result<Envelope, AppError> {
    let report = ctx.resolve::<TransformService>().run_pipeline().await?;
    Envelope::message("Transformation pipeline finished").merge(report)
}
