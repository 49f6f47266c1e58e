use super::*;
use crate::autograd::grad_check::check_grad;

#[test]
fn test_matmul_forward() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3])?;
    let b = Tensor::new(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2])?;
    let c = matmul_op(&mut session, &a, &b)?;
    assert_eq!(c.shape(), vec![2, 2]);
    assert_eq!(c.values(), vec![58.0, 64.0, 139.0, 154.0]);
    Ok(())
}

#[test]
fn test_matmul_backward_simple() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0], vec![1, 2])?;
    let b = Tensor::new(vec![3.0, 4.0], vec![2, 1])?;
    let c = matmul_op(&mut session, &a, &b)?;
    c.accumulate_grad(&[1.0])?;
    session.finalize()?;
    assert_eq!(a.grad(), vec![3.0, 4.0]);
    assert_eq!(b.grad(), vec![1.0, 2.0]);
    Ok(())
}

#[test]
fn test_matmul_shape_errors() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![0.0; 6], vec![2, 3])?;
    let b = Tensor::new(vec![0.0; 4], vec![2, 2])?;
    assert!(matches!(
        matmul_op(&mut session, &a, &b),
        Err(ArchGradError::ShapeMismatch { .. })
    ));
    let v = Tensor::new(vec![0.0; 3], vec![3])?;
    assert!(matches!(
        matmul_op(&mut session, &v, &a),
        Err(ArchGradError::UnsupportedOperation(_))
    ));
    Ok(())
}

#[test]
fn test_matmul_grad_check() {
    let a = Tensor::new(vec![0.1, -0.2, 0.3, 0.4, 0.5, -0.6], vec![2, 3]).unwrap();
    let b = Tensor::new(vec![1.0, 0.5, -0.5, 2.0, 0.25, -1.0], vec![3, 2]).unwrap();
    check_grad(
        |s, inputs| matmul_op(s, &inputs[0], &inputs[1]),
        &[a, b],
        &[1.0, -1.0, 0.5, 2.0],
        1e-2,
        1e-3,
    )
    .unwrap();
}
