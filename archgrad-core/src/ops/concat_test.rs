use super::*;
use crate::autograd::grad_check::check_grad;

fn ramp(shape: Vec<usize>, start: f32) -> Tensor {
    let numel = shape.iter().product();
    Tensor::new((0..numel).map(|i| start + i as f32).collect(), shape).unwrap()
}

#[test]
fn test_concat_axis0_shapes() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = ramp(vec![2, 4, 6], 0.0);
    let b = ramp(vec![3, 4, 6], 100.0);
    let c = concat_op(&mut session, &[a.clone(), b.clone()], 0)?;
    assert_eq!(c.shape(), vec![5, 4, 6]);
    assert_eq!(c.get(&[1, 3, 5])?, a.get(&[1, 3, 5])?);
    assert_eq!(c.get(&[2, 0, 0])?, b.get(&[0, 0, 0])?);
    assert_eq!(c.get(&[4, 3, 5])?, b.get(&[2, 3, 5])?);
    Ok(())
}

#[test]
fn test_concat_inner_axis_interleaves() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2])?;
    let b = Tensor::new(vec![5.0, 6.0], vec![2, 1])?;
    let c = concat_op(&mut session, &[a, b], 1)?;
    assert_eq!(c.shape(), vec![2, 3]);
    assert_eq!(c.values(), vec![1.0, 2.0, 5.0, 3.0, 4.0, 6.0]);
    Ok(())
}

#[test]
fn test_concat_errors() {
    let mut session = Session::new();
    assert!(matches!(
        concat_op(&mut session, &[], 0),
        Err(ArchGradError::EmptyTensorList { .. })
    ));
    let a = ramp(vec![2, 3], 0.0);
    let b = ramp(vec![2, 4], 0.0);
    assert!(matches!(
        concat_op(&mut session, &[a.clone(), b.clone()], 0),
        Err(ArchGradError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        concat_op(&mut session, &[a.clone(), b], -1),
        Err(ArchGradError::NegativeAxisIndex { .. })
    ));
    assert!(matches!(
        concat_op(&mut session, &[a], 2),
        Err(ArchGradError::AxisOutOfRange { .. })
    ));
}

#[test]
fn test_concat_backward_routes_blocks() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let a = ramp(vec![2, 1], 0.0);
    let b = ramp(vec![2, 2], 0.0);
    let c = concat_op(&mut session, &[a.clone(), b.clone()], 1)?;
    c.accumulate_grad(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
    session.finalize()?;
    assert_eq!(a.grad(), vec![1.0, 4.0]);
    assert_eq!(b.grad(), vec![2.0, 3.0, 5.0, 6.0]);
    Ok(())
}

#[test]
fn test_split_by_sizes_and_count() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = ramp(vec![2, 6], 0.0);
    let parts = split_op(&mut session, &x, 1, SplitArg::Sizes(vec![1, 2, 3]))?;
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[1].shape(), vec![2, 2]);
    assert_eq!(parts[1].values(), vec![1.0, 2.0, 7.0, 8.0]);

    let halves = split_op(&mut session, &x, 1, SplitArg::Count(2))?;
    assert_eq!(halves[0].values(), vec![0.0, 1.0, 2.0, 6.0, 7.0, 8.0]);
    Ok(())
}

#[test]
fn test_split_errors() {
    let mut session = Session::new();
    let x = ramp(vec![2, 6], 0.0);
    assert!(matches!(
        split_op(&mut session, &x, 1, SplitArg::Count(4)),
        Err(ArchGradError::IndivisibleSplit { length: 6, count: 4, .. })
    ));
    assert!(matches!(
        split_op(&mut session, &x, 1, SplitArg::Sizes(vec![2, 2])),
        Err(ArchGradError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        split_op(&mut session, &x, 1, SplitArg::Sizes(vec![6, 0])),
        Err(ArchGradError::InvalidShape { .. })
    ));
}

#[test]
fn test_concat_of_split_restores_input() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = ramp(vec![3, 4, 2], 0.5);
    let parts = split_op(&mut session, &x, 1, SplitArg::Sizes(vec![3, 1]))?;
    let joined = concat_op(&mut session, &parts, 1)?;
    assert_eq!(joined, x);
    Ok(())
}

#[test]
fn test_split_grad_check() {
    let x = ramp(vec![2, 3], 0.0);
    check_grad(
        |s, inputs| {
            let parts = split_op(s, &inputs[0], 1, SplitArg::Sizes(vec![2, 1]))?;
            concat_op(s, &[parts[1].clone(), parts[0].clone()], 1)
        },
        &[x],
        &[1.0, -2.0, 0.5, 3.0, 0.25, -1.5],
        1e-2,
        1e-3,
    )
    .unwrap();
}
