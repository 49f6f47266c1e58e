use super::*;

fn token(text: &str) -> Segment {
    Segment::Token(text.to_string())
}

#[test]
fn test_split_keeps_braced_groups_whole() -> Result<(), CompileError> {
    let tokens = split_architecture("A={3N,4N}, 5C3x3 ,A~{2N~{1N,1N}}")?;
    assert_eq!(tokens, vec!["A={3N,4N}", "5C3x3", "A~{2N~{1N,1N}}"]);
    Ok(())
}

#[test]
fn test_unbalanced_braces_are_malformed() {
    for text in ["{3N,4N", "3N}", "{3N}},4N", "A={{3N}"] {
        assert!(
            matches!(parse(text), Err(CompileError::MalformedArchitecture { .. })),
            "{} should be rejected",
            text
        );
    }
}

#[test]
fn test_empty_input_is_invalid() {
    assert!(matches!(parse(""), Err(CompileError::InvalidArchitecture(_))));
    assert!(matches!(parse("  "), Err(CompileError::InvalidArchitecture(_))));
}

#[test]
fn test_empty_statements_and_segments() {
    assert!(matches!(parse("3N,,4N"), Err(CompileError::MalformedArchitecture { .. })));
    assert!(matches!(parse("3N~~4N"), Err(CompileError::MalformedArchitecture { .. })));
    assert!(matches!(parse("3N,{}"), Err(CompileError::MalformedArchitecture { .. })));
}

#[test]
fn test_definitions_and_chains() -> Result<(), CompileError> {
    let statements = parse("A=5C3x3+1(S),B=2x2MP,A~B~10N")?;
    assert_eq!(
        statements,
        vec![
            Statement::Define {
                name: "A".to_string(),
                value: vec![token("5C3x3+1(S)")],
            },
            Statement::Define {
                name: "B".to_string(),
                value: vec![token("2x2MP")],
            },
            Statement::Chain(vec![token("A"), token("B"), token("10N")]),
        ]
    );
    Ok(())
}

#[test]
fn test_nested_modules() -> Result<(), CompileError> {
    let statements = parse("M={3N~{1N,2N},4N},M~SM")?;
    let inner = Segment::Module(vec![
        Statement::Chain(vec![token("1N")]),
        Statement::Chain(vec![token("2N")]),
    ]);
    let module = Segment::Module(vec![
        Statement::Chain(vec![token("3N"), inner]),
        Statement::Chain(vec![token("4N")]),
    ]);
    assert_eq!(
        statements,
        vec![
            Statement::Define {
                name: "M".to_string(),
                value: vec![module],
            },
            Statement::Chain(vec![token("M"), token("SM")]),
        ]
    );
    Ok(())
}

#[test]
fn test_bad_definitions() {
    assert!(matches!(parse("1A=3N"), Err(CompileError::MalformedArchitecture { .. })));
    assert!(matches!(parse("A=B=3N"), Err(CompileError::MalformedArchitecture { .. })));
    assert!(matches!(parse("A="), Err(CompileError::MalformedArchitecture { .. })));
}

#[test]
fn test_braces_inside_a_token() {
    assert!(matches!(parse("3N{4N}"), Err(CompileError::MalformedArchitecture { .. })));
    assert!(matches!(parse("{3N}{4N}"), Err(CompileError::MalformedArchitecture { .. })));
}
