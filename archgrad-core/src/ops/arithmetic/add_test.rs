use super::*;

#[test]
fn test_add_forward_backward() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2])?;
    let b = Tensor::new(vec![10.0, 20.0, 30.0, 40.0], vec![2, 2])?;
    let c = add_op(&mut session, &a, &b)?;
    assert_eq!(c.values(), vec![11.0, 22.0, 33.0, 44.0]);
    c.accumulate_grad(&[1.0, 2.0, 3.0, 4.0])?;
    session.finalize()?;
    assert_eq!(a.grad(), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(b.grad(), vec![1.0, 2.0, 3.0, 4.0]);
    Ok(())
}

#[test]
fn test_add_same_tensor_twice() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let c = add_op(&mut session, &a, &a)?;
    c.accumulate_grad(&[1.0, 1.0])?;
    session.finalize()?;
    assert_eq!(a.grad(), vec![2.0, 2.0]);
    Ok(())
}

#[test]
fn test_add_shape_mismatch() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let b = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
    assert!(matches!(
        add_op(&mut session, &a, &b),
        Err(ArchGradError::ShapeMismatch { .. })
    ));
    Ok(())
}
