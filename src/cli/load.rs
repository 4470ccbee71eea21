//! Load and transform command handlers.

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::services::{LoaderService, TransformService};

use super::App;

impl App {
    /// Clear the database, load the dataset and optionally transform it.
    pub async fn run_load(&self, skip_transform: bool) -> Result<()> {
        let ctx = Context::for_batch(Config::load()?).await?;

        let summary = ctx.resolve::<LoaderService>().load_graph_json(true).await?;
        println!(
            "Loaded {} nodes and {} edges ({} skipped)",
            summary.nodes, summary.edges, summary.skipped_edges
        );

        if skip_transform {
            return Ok(());
        }
        self.transform_with(&ctx).await
    }

    /// Run the transformation pipeline on the loaded graph.
    pub async fn run_transform(&self) -> Result<()> {
        let ctx = Context::for_batch(Config::load()?).await?;
        self.transform_with(&ctx).await
    }

    async fn transform_with(&self, ctx: &Context) -> Result<()> {
        let report = ctx.resolve::<TransformService>().run_pipeline().await?;
        for pass in &report.passes {
            println!(
                "{:<24} created {:>6}  deleted {:>6}",
                pass.pass, pass.created, pass.deleted
            );
        }
        Ok(())
    }
}
