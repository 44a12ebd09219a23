use crate::adapters::dblp::DblpClient;
use crate::domain::model::{CollaborationGraph, OutputFormat, Seed, TransformResult};
use crate::domain::ports::{CoauthorSource, ConfigProvider, Pipeline, Storage};
use crate::domain::sunburst::{build_network, build_sunburst, edges_csv};
use crate::domain::traversal::GraphBuilder;
use crate::utils::error::{CoauthorError, Result};

/// Seeds -> traversal -> documents -> files.
pub struct CoauthorPipeline<S: Storage, C: ConfigProvider, Src: CoauthorSource = DblpClient> {
    storage: S,
    config: C,
    source: Src,
}

impl<S: Storage, C: ConfigProvider> CoauthorPipeline<S, C> {
    /// Talks to the DBLP instance at `config.base_url()`.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let source =
            DblpClient::new(config.base_url())?.with_timeout(config.request_timeout());
        Ok(Self::with_source(storage, config, source))
    }
}

impl<S: Storage, C: ConfigProvider, Src: CoauthorSource> CoauthorPipeline<S, C, Src> {
    pub fn with_source(storage: S, config: C, source: Src) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }

    async fn seeds(&self) -> Result<Vec<Seed>> {
        let mut seeds: Vec<Seed> = self
            .config
            .seed_authors()
            .iter()
            .map(Seed::named)
            .collect();

        if let Some(query) = self.config.seed_query() {
            tracing::info!("🔍 Discovering seed authors with query '{}'", query.query);
            match self.source.venue_authors(&query).await {
                Ok(found) => seeds.extend(found),
                Err(e) => tracing::warn!("⚠️ Seed discovery failed for '{}': {}", query.query, e),
            }
        }

        if seeds.is_empty() {
            return Err(CoauthorError::ProcessingError {
                message: "No seed authors to start from".to_string(),
            });
        }
        Ok(seeds)
    }

    fn render(&self, format: OutputFormat, result: &TransformResult) -> Result<Vec<u8>> {
        let bytes = match format {
            OutputFormat::Sunburst => serde_json::to_vec_pretty(&result.sunburst)?,
            OutputFormat::Network => serde_json::to_vec_pretty(&result.network)?,
            OutputFormat::Graph => serde_json::to_vec_pretty(&result.graph)?,
            OutputFormat::Csv => result.edges_csv.clone().into_bytes(),
        };
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, Src: CoauthorSource> Pipeline for CoauthorPipeline<S, C, Src> {
    async fn extract(&self) -> Result<CollaborationGraph> {
        let seeds = self.seeds().await?;
        tracing::info!("🌱 Starting from {} seed authors", seeds.len());

        let mut graph = CollaborationGraph::new();
        let builder = GraphBuilder::new(&self.source, self.config.traversal(), self.config.scope());
        let report = builder.build(&seeds, &mut graph).await;

        if !report.unresolved.is_empty() {
            tracing::warn!(
                "⚠️ {} authors could not be resolved: {}",
                report.unresolved.len(),
                report.unresolved.join(", ")
            );
        }
        tracing::debug!("Traversal report: {:?}", report);
        Ok(graph)
    }

    async fn transform(&self, graph: CollaborationGraph) -> Result<TransformResult> {
        let options = self.config.sunburst();
        let sunburst = build_sunburst(&graph, &options);
        let network = build_network(&graph, &options.base_url);
        let edges_csv = edges_csv(&graph)?;

        Ok(TransformResult {
            graph,
            sunburst,
            network,
            edges_csv,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let formats = self.config.output_formats();
        if formats.is_empty() {
            return Err(CoauthorError::MissingConfigError {
                field: "output formats".to_string(),
            });
        }

        for format in formats {
            let filename = self.config.output_filename(format);
            let data = self.render(format, &result)?;
            tracing::debug!("Writing {} ({} bytes)", filename, data.len());
            self.storage.write_file(&filename, &data).await?;
            tracing::info!("📁 Wrote {} output to {}", format.as_str(), filename);
        }

        Ok(self.config.output_path().to_string())
    }
}
