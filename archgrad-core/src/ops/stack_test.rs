use super::*;
use crate::autograd::grad_check::check_grad;

#[test]
fn test_stack_new_leading_axis() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let b = Tensor::new(vec![3.0, 4.0], vec![2])?;
    let s = stack_op(&mut session, &[a.clone(), b.clone()], 0)?;
    assert_eq!(s.shape(), vec![2, 2]);
    assert_eq!(s.values(), vec![1.0, 2.0, 3.0, 4.0]);

    let t = stack_op(&mut session, &[a, b], 1)?;
    assert_eq!(t.shape(), vec![2, 2]);
    assert_eq!(t.values(), vec![1.0, 3.0, 2.0, 4.0]);
    Ok(())
}

#[test]
fn test_stack_errors() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    assert!(matches!(
        stack_op(&mut session, &[], 0),
        Err(ArchGradError::EmptyTensorList { .. })
    ));
    let a = Tensor::new(vec![1.0, 2.0], vec![2])?;
    let b = Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?;
    assert!(matches!(
        stack_op(&mut session, &[a.clone(), b], 0),
        Err(ArchGradError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        stack_op(&mut session, &[a], 2),
        Err(ArchGradError::AxisOutOfRange { .. })
    ));
    Ok(())
}

#[test]
fn test_unstack_middle_axis() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = Tensor::new((0..12).map(|v| v as f32).collect(), vec![2, 3, 2])?;
    let parts = unstack_op(&mut session, &x, 1)?;
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[1].shape(), vec![2, 2]);
    assert_eq!(parts[1].values(), vec![2.0, 3.0, 8.0, 9.0]);
    let back = stack_op(&mut session, &parts, 1)?;
    assert_eq!(back, x);
    Ok(())
}

#[test]
fn test_unstack_rank_one_fails() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = Tensor::new(vec![1.0, 2.0], vec![2])?;
    assert!(matches!(
        unstack_op(&mut session, &x, 0),
        Err(ArchGradError::RankTooLow { .. })
    ));
    Ok(())
}

#[test]
fn test_unstack_grad_check() {
    let x = Tensor::new(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6], vec![3, 2]).unwrap();
    check_grad(
        |s, inputs| {
            let rows = unstack_op(s, &inputs[0], 0)?;
            stack_op(s, &[rows[2].clone(), rows[0].clone()], 1)
        },
        &[x],
        &[1.0, 2.0, 3.0, 4.0],
        1e-2,
        1e-3,
    )
    .unwrap();
}
