//! Level-by-level coauthor traversal.
//!
//! Level 0 fetches the seeds, level 1 the coauthors picked from level 0, and
//! so on until `depth` levels have been fetched. Every author is fetched at
//! most once per traversal; an author whose lookup or fetch fails
//! contributes no edges.

use crate::domain::model::{CollaborationGraph, Seed};
use crate::domain::names::{normalize_name, strip_annotation};
use crate::domain::ports::CoauthorSource;
use crate::domain::ranking::top_k;
use crate::domain::scope::CollaborationScope;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOptions {
    /// Number of fetch levels; 0 fetches nothing.
    pub depth: usize,
    /// Freeze the known-author set to the seeds.
    pub restrict_to_seeds: bool,
    /// Only the top N coauthors of a node are queued for the next level.
    pub expand_top: Option<usize>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            depth: 1,
            restrict_to_seeds: false,
            expand_top: Some(crate::domain::ranking::DEFAULT_TOP_K),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    pub levels: usize,
    pub fetched: usize,
    pub resolved: usize,
    pub unresolved: Vec<String>,
    pub failed: usize,
    pub revisits_skipped: usize,
    pub edges_recorded: usize,
}

pub struct GraphBuilder<'a, S: CoauthorSource + ?Sized> {
    source: &'a S,
    options: TraversalOptions,
    scope: CollaborationScope,
}

impl<'a, S: CoauthorSource + ?Sized> GraphBuilder<'a, S> {
    pub fn new(source: &'a S, options: TraversalOptions, scope: CollaborationScope) -> Self {
        Self {
            source,
            options,
            scope,
        }
    }

    pub async fn build(&self, seeds: &[Seed], graph: &mut CollaborationGraph) -> TraversalReport {
        let mut report = TraversalReport::default();
        let mut frontier: Vec<String> = Vec::new();

        for seed in seeds {
            let name = normalize_name(&seed.name);
            if name.is_empty() {
                continue;
            }
            // 原始拼法留作顯示名稱，查詢 pid 時也使用
            graph.insert_named(&name, &strip_annotation(&seed.name), seed.pid.as_deref());
            graph.mark_seed(&name);
            if !frontier.contains(&name) {
                frontier.push(name);
            }
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut visited_pids: HashSet<String> = HashSet::new();

        for level in 0..self.options.depth {
            if frontier.is_empty() {
                break;
            }
            report.levels = level + 1;
            tracing::info!(
                "🔎 Traversal level {}: {} authors to fetch",
                level,
                frontier.len()
            );

            let mut next: Vec<String> = Vec::new();
            for name in frontier {
                if !visited.insert(name.clone()) {
                    report.revisits_skipped += 1;
                    continue;
                }

                let Some(pid) = self.identifier_for(&name, graph, &mut report).await else {
                    continue;
                };
                if !visited_pids.insert(pid.clone()) {
                    report.revisits_skipped += 1;
                    continue;
                }

                self.expand(&name, &pid, graph, &mut report).await;

                if let Some(author) = graph.author(&name) {
                    let candidates = match self.options.expand_top {
                        Some(k) => top_k(author.collaborations(), k),
                        None => author.collaborations().iter().collect(),
                    };
                    for c in candidates {
                        if !visited.contains(&c.name) && !next.contains(&c.name) {
                            next.push(c.name.clone());
                        }
                    }
                }
            }
            frontier = next;
        }

        tracing::info!(
            "✅ Traversal done: {} fetched, {} unresolved, {} failed, {} edges",
            report.fetched,
            report.unresolved.len(),
            report.failed,
            report.edges_recorded
        );
        report
    }

    async fn identifier_for(
        &self,
        name: &str,
        graph: &mut CollaborationGraph,
        report: &mut TraversalReport,
    ) -> Option<String> {
        if let Some(pid) = graph.author(name).and_then(|a| a.pid.clone()) {
            return Some(pid);
        }

        let display_name = graph.display_name(name).to_string();
        match self.source.resolve_pid(&display_name).await {
            Ok(Some(pid)) => {
                tracing::debug!("Resolved '{}' -> {}", display_name, pid);
                graph.insert_author(name, Some(&pid));
                report.resolved += 1;
                Some(pid)
            }
            Ok(None) => {
                tracing::warn!("⚠️ No exact identifier match for '{}', skipping", display_name);
                report.unresolved.push(name.to_string());
                None
            }
            Err(e) => {
                tracing::warn!("⚠️ Identifier lookup failed for '{}': {}", display_name, e);
                report.failed += 1;
                None
            }
        }
    }

    async fn expand(
        &self,
        name: &str,
        pid: &str,
        graph: &mut CollaborationGraph,
        report: &mut TraversalReport,
    ) {
        let records = match self.source.fetch_coauthors(pid, name, &self.scope).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("⚠️ Coauthor fetch failed for '{}' ({}): {}", name, pid, e);
                report.failed += 1;
                return;
            }
        };
        report.fetched += 1;
        tracing::debug!("'{}' has {} coauthors in scope", name, records.len());

        for record in records {
            let coauthor = normalize_name(&record.name);
            if coauthor.is_empty() || coauthor == name {
                continue;
            }
            if !self.options.restrict_to_seeds || graph.contains(&coauthor) {
                let display_name = strip_annotation(&record.name);
                graph.insert_named(&coauthor, &display_name, record.pid.as_deref());
            }
            if graph.add_edge(name, &coauthor, record.count) {
                report.edges_recorded += 1;
            }
        }
    }
}
