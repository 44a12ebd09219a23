use crate::domain::model::{
    CoauthorRecord, CollaborationGraph, OutputFormat, Seed, TransformResult, VenueSeedQuery,
};
use crate::domain::scope::CollaborationScope;
use crate::domain::sunburst::SunburstOptions;
use crate::domain::traversal::TraversalOptions;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn seed_authors(&self) -> &[String];
    fn seed_query(&self) -> Option<VenueSeedQuery>;
    fn scope(&self) -> CollaborationScope;
    fn traversal(&self) -> TraversalOptions;
    fn sunburst(&self) -> SunburstOptions;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn output_filename(&self, format: OutputFormat) -> String {
        format.default_filename().to_string()
    }
    fn request_timeout(&self) -> Option<Duration>;
}

/// The bibliographic service as seen by the traversal.
#[async_trait]
pub trait CoauthorSource: Send + Sync {
    /// Identifier of the first exact-name match, `None` when nothing matches.
    async fn resolve_pid(&self, display_name: &str) -> Result<Option<String>>;

    /// One entry per distinct coauthor of `pid` within `scope`. A missing or
    /// unavailable document yields an empty list.
    async fn fetch_coauthors(
        &self,
        pid: &str,
        name: &str,
        scope: &CollaborationScope,
    ) -> Result<Vec<CoauthorRecord>>;

    /// Distinct authors of the publications matching a venue query.
    async fn venue_authors(&self, query: &VenueSeedQuery) -> Result<Vec<Seed>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CollaborationGraph>;
    async fn transform(&self, graph: CollaborationGraph) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
