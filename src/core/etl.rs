use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting coauthor ETL process");

        // Extract
        tracing::info!("📥 Extracting collaboration graph...");
        let graph = self.pipeline.extract().await?;
        tracing::info!(
            "📊 Extracted {} authors and {} collaborations",
            graph.node_count(),
            graph.edge_count()
        );
        self.monitor.finish_phase("extract");

        // Transform
        tracing::info!("🔄 Building output documents...");
        let result = self.pipeline.transform(graph).await?;
        tracing::info!(
            "🌞 Sunburst has {} author nodes, network has {} links",
            result.sunburst.children.len(),
            result.network.links.len()
        );
        self.monitor.finish_phase("transform");

        // Load
        tracing::info!("💾 Writing output files...");
        let output_path = self.pipeline.load(result).await?;
        self.monitor.finish_phase("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
