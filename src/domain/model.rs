use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::sunburst::{NetworkDocument, SunburstDocument};

/// One row returned by a coauthor fetch: a distinct coauthor and the number
/// of joint works in the active scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoauthorRecord {
    pub name: String,
    pub pid: Option<String>,
    pub count: u32,
}

impl CoauthorRecord {
    pub fn new(name: impl Into<String>, pid: Option<&str>, count: u32) -> Self {
        Self {
            name: name.into(),
            pid: pid.map(str::to_string),
            count,
        }
    }
}

/// Starting point of a traversal. `name` may still carry a count annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub name: String,
    pub pid: Option<String>,
}

impl Seed {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pid: None,
        }
    }
}

/// Seeds taken from the authors of a venue's publications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSeedQuery {
    /// Publication search query, e.g. `"ICSE:"` or `"venue:Empir. Softw. Eng.:"`.
    pub query: String,
    /// Paging stops at the first publication older than this year.
    pub min_year: Option<i32>,
    pub max_publications: Option<usize>,
    pub page_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Nested tree for radial charts.
    Sunburst,
    /// Flat `{nodes, links}` document for force-directed layouts.
    Network,
    /// Full graph snapshot that can be read back.
    Graph,
    /// `source,target,count` edge list.
    Csv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Sunburst,
        OutputFormat::Network,
        OutputFormat::Graph,
        OutputFormat::Csv,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sunburst" => Some(OutputFormat::Sunburst),
            "network" => Some(OutputFormat::Network),
            "graph" => Some(OutputFormat::Graph),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Sunburst => "sunburst",
            OutputFormat::Network => "network",
            OutputFormat::Graph => "graph",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn default_filename(&self) -> &'static str {
        match self {
            OutputFormat::Sunburst => "sunburst.json",
            OutputFormat::Network => "network.json",
            OutputFormat::Graph => "graph.json",
            OutputFormat::Csv => "edges.csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    pub count: u32,
}

#[derive(Debug, Clone)]
pub struct Author {
    /// Normalized identity key.
    pub name: String,
    /// Spelling from the first insert, used in rendered documents.
    pub display_name: String,
    pub pid: Option<String>,
    collaborations: Vec<Collaboration>,
    index: HashMap<String, usize>,
}

impl Author {
    pub fn new(name: impl Into<String>, pid: Option<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            pid,
            collaborations: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Coauthor entries in first-seen order.
    pub fn collaborations(&self) -> &[Collaboration] {
        &self.collaborations
    }

    pub fn coauthors(&self) -> impl Iterator<Item = &str> {
        self.collaborations.iter().map(|c| c.name.as_str())
    }

    pub fn collaborates_with(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn collaboration_with(&self, name: &str) -> Option<&Collaboration> {
        self.index.get(name).map(|&i| &self.collaborations[i])
    }

    /// Records or refreshes a coauthor entry. A repeated entry keeps its
    /// original position and the larger of the two counts.
    fn record(&mut self, name: &str, pid: Option<&str>, count: u32) -> bool {
        if let Some(&i) = self.index.get(name) {
            let existing = &mut self.collaborations[i];
            existing.count = existing.count.max(count);
            if existing.pid.is_none() {
                existing.pid = pid.map(str::to_string);
            }
            return false;
        }
        self.index.insert(name.to_string(), self.collaborations.len());
        self.collaborations.push(Collaboration {
            name: name.to_string(),
            pid: pid.map(str::to_string),
            count,
        });
        true
    }
}

/// Unordered author pair; `a` is the endpoint inserted into the graph first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationEdge {
    pub a: String,
    pub b: String,
    pub weight: u32,
}

/// Author registry for one run. Owned by the caller and handed to the
/// traversal; insertion order is preserved for deterministic output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphSnapshot", into = "GraphSnapshot")]
pub struct CollaborationGraph {
    authors: HashMap<String, Author>,
    order: Vec<String>,
    seeds: Vec<String>,
}

impl CollaborationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an author if unknown, filling in a missing identifier otherwise.
    /// Returns `true` when the author is new.
    pub fn insert_author(&mut self, name: &str, pid: Option<&str>) -> bool {
        self.insert_named(name, name, pid)
    }

    /// Like [`insert_author`](Self::insert_author), keyed by `name` and
    /// rendered as `display_name`. The first display name wins.
    pub fn insert_named(&mut self, name: &str, display_name: &str, pid: Option<&str>) -> bool {
        if let Some(author) = self.authors.get_mut(name) {
            if author.pid.is_none() {
                author.pid = pid.map(str::to_string);
            }
            return false;
        }
        let mut author = Author::new(name, pid.map(str::to_string));
        if !display_name.trim().is_empty() {
            author.display_name = display_name.to_string();
        }
        self.order.push(name.to_string());
        self.authors.insert(name.to_string(), author);
        true
    }

    /// Display spelling of a known author, or `name` itself.
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.authors
            .get(name)
            .map(|a| a.display_name.as_str())
            .unwrap_or(name)
    }

    pub fn mark_seed(&mut self, name: &str) {
        if self.authors.contains_key(name) && !self.seeds.iter().any(|s| s == name) {
            self.seeds.push(name.to_string());
        }
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    pub fn contains(&self, name: &str) -> bool {
        self.authors.contains_key(name)
    }

    pub fn author(&self, name: &str) -> Option<&Author> {
        self.authors.get(name)
    }

    pub fn authors(&self) -> impl Iterator<Item = &Author> {
        self.order.iter().filter_map(|name| self.authors.get(name))
    }

    /// Records a collaboration on both endpoints. Rejected when either
    /// endpoint is unknown or both are the same author.
    pub fn add_edge(&mut self, a: &str, b: &str, count: u32) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        let a_pid = self.authors.get(a).and_then(|x| x.pid.clone());
        let b_pid = self.authors.get(b).and_then(|x| x.pid.clone());

        let mut added = false;
        if let Some(author) = self.authors.get_mut(a) {
            added |= author.record(b, b_pid.as_deref(), count);
        }
        if let Some(author) = self.authors.get_mut(b) {
            added |= author.record(a, a_pid.as_deref(), count);
        }
        added
    }

    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Each unordered pair once; `a` is the endpoint inserted first.
    pub fn edges(&self) -> Vec<CollaborationEdge> {
        let position: HashMap<&str, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for (i, author) in self.authors().enumerate() {
            for collaboration in author.collaborations() {
                let Some(&j) = position.get(collaboration.name.as_str()) else {
                    continue;
                };
                let (first, second) = if i < j { (i, j) } else { (j, i) };
                if first != second && seen.insert((first, second)) {
                    edges.push(CollaborationEdge {
                        a: self.order[first].clone(),
                        b: self.order[second].clone(),
                        weight: collaboration.count,
                    });
                }
            }
        }
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuthorSnapshot {
    name: String,
    /// 舊的快照沒有這個欄位，讀回時沿用 name
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pid: Option<String>,
    #[serde(default)]
    collaborations: Vec<Collaboration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphSnapshot {
    #[serde(default)]
    seeds: Vec<String>,
    authors: Vec<AuthorSnapshot>,
}

impl From<CollaborationGraph> for GraphSnapshot {
    fn from(graph: CollaborationGraph) -> Self {
        let authors = graph
            .authors()
            .map(|author| AuthorSnapshot {
                name: author.name.clone(),
                display_name: Some(author.display_name.clone()),
                pid: author.pid.clone(),
                collaborations: author.collaborations().to_vec(),
            })
            .collect();
        GraphSnapshot {
            seeds: graph.seeds,
            authors,
        }
    }
}

impl From<GraphSnapshot> for CollaborationGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        let mut graph = CollaborationGraph::new();
        for author in &snapshot.authors {
            let display_name = author.display_name.as_deref().unwrap_or(&author.name);
            graph.insert_named(&author.name, display_name, author.pid.as_deref());
        }
        let known: HashSet<String> = graph.order.iter().cloned().collect();

        // 只保留兩端都存在的合作關係
        for author in snapshot.authors {
            if let Some(entry) = graph.authors.get_mut(&author.name) {
                for c in author.collaborations {
                    if c.name != entry.name && known.contains(&c.name) {
                        entry.record(&c.name, c.pid.as_deref(), c.count);
                    }
                }
            }
        }
        for seed in snapshot.seeds {
            graph.mark_seed(&seed);
        }
        graph
    }
}

/// Everything the load step may write.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub graph: CollaborationGraph,
    pub sunburst: SunburstDocument,
    pub network: NetworkDocument,
    pub edges_csv: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(names: &[&str]) -> CollaborationGraph {
        let mut graph = CollaborationGraph::new();
        for name in names {
            graph.insert_author(name, None);
            graph.mark_seed(name);
        }
        graph
    }

    #[test]
    fn test_edge_requires_both_endpoints() {
        let mut graph = graph_with(&["A", "B"]);
        assert!(graph.add_edge("A", "B", 2));
        assert!(!graph.add_edge("A", "D", 5));
        assert!(!graph.author("A").unwrap().collaborates_with("D"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_edges_are_rejected() {
        let mut graph = graph_with(&["A"]);
        assert!(!graph.add_edge("A", "A", 1));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_repeated_edge_keeps_position_and_max_count() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "B", 1);
        graph.add_edge("A", "C", 4);
        assert!(!graph.add_edge("B", "A", 3));

        let a = graph.author("A").unwrap();
        let names: Vec<_> = a.coauthors().collect();
        assert_eq!(names, vec!["B", "C"]);
        assert_eq!(a.collaboration_with("B").unwrap().count, 3);
        assert_eq!(graph.author("B").unwrap().collaboration_with("A").unwrap().count, 3);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_edges_are_reported_once_per_pair() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A", "B", 1);
        graph.add_edge("C", "B", 2);
        let edges = graph.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].a.as_str(), edges[0].b.as_str()), ("A", "B"));
        assert_eq!((edges[1].a.as_str(), edges[1].b.as_str()), ("B", "C"));
    }

    #[test]
    fn test_insert_author_fills_missing_pid() {
        let mut graph = CollaborationGraph::new();
        assert!(graph.insert_author("A", None));
        assert!(!graph.insert_author("A", Some("a/1")));
        assert_eq!(graph.author("A").unwrap().pid.as_deref(), Some("a/1"));
    }

    #[test]
    fn test_first_display_name_is_kept() {
        let mut graph = CollaborationGraph::new();
        assert!(graph.insert_named("Yann-Gael Gueheneuc", "Yann-Gaël Guéheneuc", None));
        assert!(!graph.insert_named("Yann-Gael Gueheneuc", "Yann-Gael Gueheneuc", Some("y/1")));

        let author = graph.author("Yann-Gael Gueheneuc").unwrap();
        assert_eq!(author.display_name, "Yann-Gaël Guéheneuc");
        assert_eq!(author.pid.as_deref(), Some("y/1"));
        assert_eq!(graph.display_name("Yann-Gael Gueheneuc"), "Yann-Gaël Guéheneuc");
        assert_eq!(graph.display_name("Unknown"), "Unknown");
    }

    #[test]
    fn test_snapshot_display_name_defaults_to_key() {
        let json = serde_json::json!({
            "authors": [
                {"name": "Jose Perez", "display_name": "José Pérez"},
                {"name": "Bram Adams"}
            ]
        });
        let graph: CollaborationGraph = serde_json::from_value(json).unwrap();
        assert_eq!(graph.display_name("Jose Perez"), "José Pérez");
        assert_eq!(graph.display_name("Bram Adams"), "Bram Adams");

        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["authors"][0]["display_name"], "José Pérez");
    }

    #[test]
    fn test_snapshot_drops_dangling_collaborations() {
        let json = serde_json::json!({
            "seeds": ["A"],
            "authors": [
                {"name": "A", "collaborations": [
                    {"name": "B", "count": 2},
                    {"name": "Z", "count": 9},
                    {"name": "A", "count": 1}
                ]},
                {"name": "B", "collaborations": [{"name": "A", "count": 2}]}
            ]
        });
        let graph: CollaborationGraph = serde_json::from_value(json).unwrap();
        let a = graph.author("A").unwrap();
        assert_eq!(a.coauthors().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(graph.seeds(), ["A".to_string()]);
    }
}
