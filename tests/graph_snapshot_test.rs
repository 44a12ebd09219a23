use anyhow::Result;
use coauthor_etl::domain::model::CollaborationGraph;
use coauthor_etl::domain::ranking::top_k;
use coauthor_etl::domain::sunburst::{build_sunburst, SunburstOptions};

fn sample_graph() -> CollaborationGraph {
    let mut graph = CollaborationGraph::new();
    for (name, pid) in [
        ("Ahmed E. Hassan", Some("h/AEH")),
        ("Bram Adams", Some("a/BA")),
        ("Foutse Khomh", Some("k/FK")),
        ("Weiyi Shang", Some("s/WS")),
        ("Cor-Paul Bezemer", None),
    ] {
        graph.insert_author(name, pid);
    }
    graph.mark_seed("Ahmed E. Hassan");
    graph.mark_seed("Bram Adams");

    graph.add_edge("Ahmed E. Hassan", "Bram Adams", 41);
    graph.add_edge("Ahmed E. Hassan", "Weiyi Shang", 41);
    graph.add_edge("Ahmed E. Hassan", "Cor-Paul Bezemer", 17);
    graph.add_edge("Bram Adams", "Foutse Khomh", 30);
    graph.add_edge("Foutse Khomh", "Weiyi Shang", 3);
    graph
}

fn ranked(graph: &CollaborationGraph, name: &str, k: usize) -> Vec<String> {
    graph
        .author(name)
        .map(|a| top_k(a.collaborations(), k).into_iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_graph_json_round_trip_preserves_counts_and_ranking() -> Result<()> {
    let graph = sample_graph();
    let json = serde_json::to_string_pretty(&graph)?;
    let restored: CollaborationGraph = serde_json::from_str(&json)?;

    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.edge_count(), graph.edge_count());
    assert_eq!(restored.seeds(), graph.seeds());

    for author in graph.authors() {
        assert_eq!(ranked(&restored, &author.name, 5), ranked(&graph, &author.name, 5));
    }
    // 同分時保留先出現的順序
    assert_eq!(
        ranked(&restored, "Ahmed E. Hassan", 2),
        vec!["Bram Adams", "Weiyi Shang"]
    );
    Ok(())
}

#[test]
fn test_restored_graph_renders_identical_sunburst() -> Result<()> {
    let graph = sample_graph();
    let restored: CollaborationGraph = serde_json::from_str(&serde_json::to_string(&graph)?)?;

    let options = SunburstOptions::default();
    assert_eq!(build_sunburst(&restored, &options), build_sunburst(&graph, &options));
    Ok(())
}

#[test]
fn test_snapshot_shape() -> Result<()> {
    let value = serde_json::to_value(sample_graph())?;

    assert_eq!(value["seeds"][0], "Ahmed E. Hassan");
    let authors = value["authors"].as_array().map(Vec::len).unwrap_or(0);
    assert_eq!(authors, 5);
    assert_eq!(value["authors"][0]["pid"], "h/AEH");
    assert!(value["authors"][4].get("pid").is_none());
    assert_eq!(value["authors"][4]["display_name"], "Cor-Paul Bezemer");
    Ok(())
}

#[test]
fn test_round_trip_keeps_display_names() -> Result<()> {
    let mut graph = sample_graph();
    graph.insert_named("Yann-Gael Gueheneuc", "Yann-Gaël Guéheneuc", Some("g/YGG"));
    graph.add_edge("Foutse Khomh", "Yann-Gael Gueheneuc", 6);

    let restored: CollaborationGraph = serde_json::from_str(&serde_json::to_string(&graph)?)?;
    assert!(restored.contains("Yann-Gael Gueheneuc"));
    assert_eq!(restored.display_name("Yann-Gael Gueheneuc"), "Yann-Gaël Guéheneuc");
    assert_eq!(ranked(&restored, "Foutse Khomh", 1), vec!["Bram Adams"]);
    Ok(())
}
