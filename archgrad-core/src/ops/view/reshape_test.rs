use super::*;

#[test]
fn test_reshape_preserves_values_and_aliases() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = Tensor::new((0..6).map(|v| v as f32).collect(), vec![2, 3])?;
    let y = reshape_op(&mut session, &x, vec![3, 2])?;
    assert_eq!(y.shape(), vec![3, 2]);
    assert_eq!(y.values(), x.values());
    assert!(y.shares_values_with(&x));
    assert_eq!(y.get(&[2, 1])?, 5.0);
    Ok(())
}

#[test]
fn test_reshape_backward_accumulates() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![4])?;
    x.accumulate_grad(&[1.0, 1.0, 1.0, 1.0])?;
    let y = reshape_op(&mut session, &x, vec![2, 2])?;
    y.accumulate_grad(&[1.0, 2.0, 3.0, 4.0])?;
    session.finalize()?;
    assert_eq!(x.grad(), vec![2.0, 3.0, 4.0, 5.0]);
    Ok(())
}

#[test]
fn test_reshape_count_mismatch() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = Tensor::new(vec![0.0; 6], vec![2, 3])?;
    let result = reshape_op(&mut session, &x, vec![4, 2]);
    assert!(matches!(result, Err(ArchGradError::ShapeMismatch { .. })));
    assert!(session.is_empty());
    Ok(())
}
