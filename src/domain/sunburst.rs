//! Tree and flat documents derived from a [`CollaborationGraph`].

use crate::domain::model::{Author, CollaborationGraph};
use crate::domain::ranking::{top_k, DEFAULT_TOP_K};
use crate::utils::error::{CoauthorError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://dblp.org";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunburstOptions {
    pub root_label: String,
    pub top_k: usize,
    /// Coauthor levels nested below each author node.
    pub tree_depth: usize,
    /// Presentation weight of first-level coauthor nodes.
    pub coauthor_value: u32,
    /// Presentation weight of deeper nodes.
    pub nested_value: u32,
    /// Profile links are `<base_url>/pid/<pid>.html`.
    pub base_url: String,
}

impl Default for SunburstOptions {
    fn default() -> Self {
        Self {
            root_label: "Authors".to_string(),
            top_k: DEFAULT_TOP_K,
            tree_depth: 2,
            coauthor_value: 100,
            nested_value: 100,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

pub fn profile_url(base_url: &str, pid: &str) -> String {
    format!("{}/pid/{}.html", base_url.trim_end_matches('/'), pid)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunburstDocument {
    pub name: String,
    pub children: Vec<AuthorNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorNode {
    pub name: String,
    pub most_collaborated: String,
    /// `null` when the identifier is unknown.
    #[serde(default)]
    pub url: Option<String>,
    pub children: Vec<CoauthorNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorNode {
    /// `"<name> (<count>)"`
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub value: u32,
    #[serde(default)]
    pub children: Vec<CoauthorNode>,
}

/// Seed authors in seed order, each with its top-K coauthors nested
/// `tree_depth` levels deep. Seeds without collaborations are left out.
pub fn build_sunburst(graph: &CollaborationGraph, options: &SunburstOptions) -> SunburstDocument {
    let mut children = Vec::new();

    for seed in graph.seeds() {
        let Some(author) = graph.author(seed) else {
            continue;
        };
        if author.collaborations().is_empty() {
            continue;
        }

        let most_collaborated = top_k(author.collaborations(), 1)
            .first()
            .map(|c| graph.display_name(&c.name).to_string())
            .unwrap_or_default();

        let mut path = vec![author.name.clone()];
        children.push(AuthorNode {
            name: author.display_name.clone(),
            most_collaborated,
            url: author.pid.as_deref().map(|p| profile_url(&options.base_url, p)),
            children: coauthor_nodes(graph, author, &mut path, 1, options),
        });
    }

    SunburstDocument {
        name: options.root_label.clone(),
        children,
    }
}

fn coauthor_nodes(
    graph: &CollaborationGraph,
    author: &Author,
    path: &mut Vec<String>,
    level: usize,
    options: &SunburstOptions,
) -> Vec<CoauthorNode> {
    // 路徑上的祖先不會再出現在子節點
    let candidates = author
        .collaborations()
        .iter()
        .filter(|c| !path.contains(&c.name));
    let ranked = top_k(candidates, options.top_k);

    let mut nodes = Vec::with_capacity(ranked.len());
    for collaboration in ranked {
        let known = graph.author(&collaboration.name);
        let pid = collaboration
            .pid
            .as_deref()
            .or_else(|| known.and_then(|a| a.pid.as_deref()));

        let children = match known {
            Some(child) if level < options.tree_depth => {
                path.push(collaboration.name.clone());
                let nested = coauthor_nodes(graph, child, path, level + 1, options);
                path.pop();
                nested
            }
            _ => Vec::new(),
        };

        nodes.push(CoauthorNode {
            name: format!(
                "{} ({})",
                graph.display_name(&collaboration.name),
                collaboration.count
            ),
            url: pid.map(|p| profile_url(&options.base_url, p)),
            value: if level == 1 {
                options.coauthor_value
            } else {
                options.nested_value
            },
            children,
        });
    }
    nodes
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkLink {
    pub source: String,
    pub target: String,
    pub value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub nodes: Vec<NetworkNode>,
    pub links: Vec<NetworkLink>,
}

/// Every author with at least one link, and every edge once.
pub fn build_network(graph: &CollaborationGraph, base_url: &str) -> NetworkDocument {
    let nodes = graph
        .authors()
        .filter(|a| !a.collaborations().is_empty())
        .map(|a| NetworkNode {
            id: a.display_name.clone(),
            url: a.pid.as_deref().map(|p| profile_url(base_url, p)),
        })
        .collect();

    let links = graph
        .edges()
        .into_iter()
        .map(|e| NetworkLink {
            source: graph.display_name(&e.a).to_string(),
            target: graph.display_name(&e.b).to_string(),
            value: e.weight,
        })
        .collect();

    NetworkDocument { nodes, links }
}

pub fn edges_csv(graph: &CollaborationGraph) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["source", "target", "count"])?;
    for edge in graph.edges() {
        let weight = edge.weight.to_string();
        writer.write_record([
            graph.display_name(&edge.a),
            graph.display_name(&edge.b),
            weight.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CoauthorError::ProcessingError {
            message: format!("CSV buffer flush failed: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| CoauthorError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}
