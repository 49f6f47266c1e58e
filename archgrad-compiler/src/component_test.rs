use super::*;
use crate::parser::parse;

fn assembled(architecture: &str) -> Result<ComponentGraph, CompileError> {
    let statements = parse(architecture)?;
    let mut graph = ComponentGraph::assemble(&statements)?;
    graph.normalize()?;
    Ok(graph)
}

fn keys(graph: &ComponentGraph) -> Vec<String> {
    let g = graph.graph();
    g.node_indices().map(|n| g[n].key.clone()).collect()
}

fn edges(graph: &ComponentGraph) -> Vec<(String, String)> {
    let g = graph.graph();
    let mut edges: Vec<(String, String)> = g
        .edge_indices()
        .filter_map(|e| g.edge_endpoints(e))
        .map(|(a, b)| (g[a].key.clone(), g[b].key.clone()))
        .collect();
    edges.sort();
    edges
}

fn edge(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

#[test]
fn test_top_level_statements_continue_the_chain() -> Result<(), CompileError> {
    let graph = assembled("5C3x3+1(S),10N")?;
    assert_eq!(keys(&graph), vec!["5C3x3#0", "10N#1"]);
    assert_eq!(edges(&graph), vec![edge("5C3x3#0", "10N#1")]);
    Ok(())
}

#[test]
fn test_named_definitions() -> Result<(), CompileError> {
    let graph = assembled("A=5C3x3+1(S),B=2x2MP,A~B~10N")?;
    assert_eq!(keys(&graph), vec!["A", "B", "10N#2"]);
    assert_eq!(edges(&graph), vec![edge("A", "B"), edge("B", "10N#2")]);
    Ok(())
}

#[test]
fn test_self_edge_is_a_duplicate() {
    assert!(matches!(
        assembled("A=3N,A~A"),
        Err(CompileError::DuplicateEdge { ref from, ref to }) if from == "A" && to == "A"
    ));
}

#[test]
fn test_repeated_edge_between_vertices() {
    assert!(matches!(
        assembled("A=3N,B=4N,A~B,A~B"),
        Err(CompileError::DuplicateEdge { ref from, ref to }) if from == "A" && to == "B"
    ));
    // The same pair reached through a longer chain is still a repeat.
    assert!(matches!(
        assembled("A=3N,B=4N,A~B~5N,A~B"),
        Err(CompileError::DuplicateEdge { ref from, ref to }) if from == "A" && to == "B"
    ));
}

#[test]
fn test_duplicate_definition() {
    assert!(matches!(
        assembled("A=3N,A=4N,A"),
        Err(CompileError::DuplicateVertex { ref name }) if name == "A"
    ));
}

#[test]
fn test_unrecognized_token() {
    assert!(matches!(
        assembled("3N,B~4N"),
        Err(CompileError::UnrecognizedArchitecture(ref token)) if token == "B"
    ));
}

#[test]
fn test_cycles_are_rejected() {
    assert!(matches!(
        assembled("A=3N,B=4N,A~B,B~A"),
        Err(CompileError::CyclicArchitecture { .. })
    ));
    assert!(matches!(assembled("A=B,B=A,A"), Err(CompileError::CyclicArchitecture { .. })));
}

#[test]
fn test_module_gets_split_and_concat() -> Result<(), CompileError> {
    let graph = assembled("4N,{3N,2N},5N")?;
    // 4N fans out into the module and both branches fan in to 5N.
    assert_eq!(keys(&graph), vec!["4N#0", "3N#1", "2N#2", "5N#3", "SPLIT#4", "CONCAT#5"]);
    assert_eq!(
        edges(&graph),
        vec![
            edge("2N#2", "CONCAT#5"),
            edge("3N#1", "CONCAT#5"),
            edge("4N#0", "SPLIT#4"),
            edge("CONCAT#5", "5N#3"),
            edge("SPLIT#4", "2N#2"),
            edge("SPLIT#4", "3N#1"),
        ]
    );
    Ok(())
}

#[test]
fn test_modules_zip_when_counts_match() -> Result<(), CompileError> {
    let graph = assembled("{3N,2N}~{1N,4N}")?;
    // Two zipped edges, the root split and the concat closing the second module.
    assert_eq!(graph.graph().edge_count(), 6);
    let found = edges(&graph);
    assert!(found.contains(&edge("1N#2", "CONCAT#4")));
    assert!(found.contains(&edge("4N#3", "CONCAT#4")));
    assert!(found.contains(&edge("3N#0", "1N#2")));
    assert!(found.contains(&edge("2N#1", "4N#3")));
    // The two roots are joined under a synthetic split.
    assert!(found.contains(&edge("SPLIT#5", "3N#0")));
    assert!(found.contains(&edge("SPLIT#5", "2N#1")));
    Ok(())
}

#[test]
fn test_named_module_reused() -> Result<(), CompileError> {
    let graph = assembled("M={X=3N,X~1N,X~2N},8N~M~SM")?;
    // X fans out inside the module; the module's two sinks fan in to SM.
    let g = graph.graph();
    let splits = g.node_indices().filter(|&n| g[n].spec == LayerSpec::Split).count();
    let concats = g.node_indices().filter(|&n| g[n].spec == LayerSpec::Concat).count();
    assert_eq!((splits, concats), (1, 1));
    assert!(edges(&graph).contains(&edge("8N#0", "X")));
    Ok(())
}

#[test]
fn test_named_vertex_starts_a_new_chain() -> Result<(), CompileError> {
    let graph = assembled("A=3N,B=4N,A~B,A~5N")?;
    let found = edges(&graph);
    // A now fans out to B and 5N through a split.
    assert!(found.contains(&edge("A", "SPLIT#3")));
    assert_eq!(found.len(), 3);
    Ok(())
}

#[test]
fn test_definitions_only_is_invalid() {
    assert!(matches!(assembled("A=3N"), Err(CompileError::InvalidArchitecture(_))));
}

#[test]
fn test_trailing_module_gets_one_exit() -> Result<(), CompileError> {
    let graph = assembled("8N,{3N,5N}")?;
    assert_eq!(keys(&graph), vec!["8N#0", "3N#1", "5N#2", "CONCAT#3", "SPLIT#4"]);
    assert_eq!(
        edges(&graph),
        vec![
            edge("3N#1", "CONCAT#3"),
            edge("5N#2", "CONCAT#3"),
            edge("8N#0", "SPLIT#4"),
            edge("SPLIT#4", "3N#1"),
            edge("SPLIT#4", "5N#2"),
        ]
    );
    Ok(())
}

#[test]
fn test_nested_open_modules_share_one_exit() -> Result<(), CompileError> {
    let graph = assembled("8N,{{3N,5N},2N}")?;
    let g = graph.graph();
    let concats: Vec<NodeIndex> = g.node_indices().filter(|&n| g[n].spec == LayerSpec::Concat).collect();
    assert_eq!(concats.len(), 1);
    assert_eq!(g.neighbors_directed(concats[0], Direction::Incoming).count(), 3);
    Ok(())
}

#[test]
fn test_open_fan_out_of_a_vertex_is_not_closed() -> Result<(), CompileError> {
    let graph = assembled("A=4N,A~3N,A~2N")?;
    let g = graph.graph();
    assert!(g.node_indices().all(|n| g[n].spec != LayerSpec::Concat));
    Ok(())
}
