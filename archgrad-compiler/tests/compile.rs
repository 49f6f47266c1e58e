mod common;

use archgrad_compiler::{compile, compile_with, CompileError};
use archgrad_core::nn::LayerKind;
use archgrad_core::Session;
use common::{init_logging, options_for, random_batch, seeded};

#[test]
fn convolution_then_classifier() -> Result<(), CompileError> {
    init_logging();
    let graph = compile("5C3x3+1(S),10N", false, true)?;
    assert_eq!(graph.node_count(), 3);
    assert_eq!(
        graph.kinds(),
        vec![LayerKind::Convolution, LayerKind::FullyConnected, LayerKind::Loss]
    );

    let activated = compile("5C3x3+1(S),10N", true, true)?;
    assert_eq!(activated.node_count(), 4);
    assert_eq!(activated.architecture(), "5C3x3,RELU,10N,SM");
    Ok(())
}

#[test]
fn mnist_style_forward() -> Result<(), CompileError> {
    init_logging();
    let graph = compile("5C5x5+1(S)+2(P),2x2MP,10C3x3,2x2AP,D0.5,32N,10N", true, true)?;
    let mut session = Session::new();
    let output = graph.forward(&mut session, &random_batch(2, &[28, 28, 1], &mut seeded(1)))?;
    assert_eq!(output.shape(), vec![2, 10]);
    Ok(())
}

#[test]
fn named_definitions_build_a_chain() -> Result<(), CompileError> {
    init_logging();
    let graph = compile("A=5C3x3+1(S),B=2x2MP,A~B~10N", false, false)?;
    assert_eq!(
        graph.kinds(),
        vec![LayerKind::Convolution, LayerKind::MaxPool, LayerKind::FullyConnected]
    );
    assert!(graph.layer("A").is_some());
    assert!(graph.layer("B").is_some());
    Ok(())
}

#[test]
fn module_branches_are_concatenated() -> Result<(), CompileError> {
    init_logging();
    let graph = compile_with("8N,{3N,5N~2N},4N", &options_for(&[6]))?;
    let kinds = graph.kinds();
    assert_eq!(kinds.iter().filter(|k| **k == LayerKind::Split).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == LayerKind::Concat).count(), 1);

    let mut session = Session::training();
    let output = graph.forward(&mut session, &random_batch(3, &[6], &mut seeded(2)))?;
    assert_eq!(output.shape(), vec![3, 4]);
    Ok(())
}

#[test]
fn malformed_architectures_are_rejected() {
    init_logging();
    assert!(matches!(compile("", true, true), Err(CompileError::InvalidArchitecture(_))));
    assert!(matches!(compile("   ", true, true), Err(CompileError::InvalidArchitecture(_))));
    assert!(matches!(
        compile("A=3N,A~A", true, true),
        Err(CompileError::DuplicateEdge { .. })
    ));
    assert!(matches!(
        compile("A=3N,B=4N,A~B,A~B", true, true),
        Err(CompileError::DuplicateEdge { ref from, ref to }) if from == "A" && to == "B"
    ));
    assert!(matches!(
        compile("3N,{4N", true, true),
        Err(CompileError::MalformedArchitecture { .. })
    ));
    assert!(matches!(
        compile("3N,,4N", true, true),
        Err(CompileError::MalformedArchitecture { .. })
    ));
    assert!(matches!(
        compile("3N,7Q", true, true),
        Err(CompileError::UnrecognizedArchitecture(ref token)) if token == "7Q"
    ));
}

#[test]
fn rendered_graph_round_trips() -> Result<(), CompileError> {
    init_logging();
    for architecture in ["10N", "5C3x3+2(S)+1(P),2x2MP,10N", "4N,{3N,2N},5N", "8N,D0.5,S0.5,LRN,4N"] {
        let first = compile_with(architecture, &options_for(&[12, 12, 1]))?;
        let second = compile_with(&first.architecture(), &options_for(&[12, 12, 1]))?;
        assert_eq!(first.architecture(), second.architecture(), "{}", architecture);
        assert_eq!(first.kinds(), second.kinds(), "{}", architecture);
    }
    Ok(())
}

#[test]
fn trailing_module_is_closed_before_the_loss() -> Result<(), CompileError> {
    init_logging();
    let graph = compile("8N,{3N,5N}", false, true)?;
    let kinds = graph.kinds();
    assert_eq!(kinds.iter().filter(|k| **k == LayerKind::Concat).count(), 1);
    assert_eq!(kinds.iter().filter(|k| **k == LayerKind::Loss).count(), 1);
    assert_eq!(graph.architecture(), "8N,{3N,5N},SM");
    Ok(())
}
