use crate::error::ArchGradError;
use crate::tensor::Tensor;

#[test]
fn test_grad_is_lazily_zero() {
    let t = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
    assert!(!t.has_grad());
    assert_eq!(t.grad(), vec![0.0; 3]);
    assert!(t.has_grad());
}

#[test]
fn test_accumulate_grad_adds() -> Result<(), ArchGradError> {
    let t = Tensor::new(vec![0.0; 2], vec![2])?;
    t.accumulate_grad(&[1.0, 2.0])?;
    t.accumulate_grad(&[0.5, 0.5])?;
    assert_eq!(t.grad(), vec![1.5, 2.5]);
    Ok(())
}

#[test]
fn test_accumulate_grad_length_mismatch() {
    let t = Tensor::new(vec![0.0; 2], vec![2]).unwrap();
    let result = t.accumulate_grad(&[1.0]);
    assert!(matches!(result, Err(ArchGradError::ShapeMismatch { .. })));
}

#[test]
fn test_zero_grad() -> Result<(), ArchGradError> {
    let t = Tensor::new(vec![0.0; 2], vec![2])?;
    t.with_grad_mut(|g| g[1] = 4.0);
    t.zero_grad();
    assert!(!t.has_grad());
    assert_eq!(t.grad(), vec![0.0, 0.0]);
    Ok(())
}
