use super::*;
use crate::autograd::grad_check::check_grad;

fn grid() -> Tensor {
    Tensor::new((0..12).map(|v| v as f32).collect(), vec![3, 4]).unwrap()
}

#[test]
fn test_slice_extracts_box() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let y = slice_op(&mut session, &grid(), &[1, 1], &[2, 2])?;
    assert_eq!(y.shape(), vec![2, 2]);
    assert_eq!(y.values(), vec![5.0, 6.0, 9.0, 10.0]);
    Ok(())
}

#[test]
fn test_slice_out_of_range() {
    let mut session = Session::new();
    let x = grid();
    assert!(matches!(
        slice_op(&mut session, &x, &[2, 0], &[2, 4]),
        Err(ArchGradError::OutOfRange { .. })
    ));
    assert!(matches!(
        slice_op(&mut session, &x, &[0], &[1]),
        Err(ArchGradError::OutOfRange { .. })
    ));
    assert!(matches!(
        slice_op(&mut session, &x, &[0, 0], &[0, 2]),
        Err(ArchGradError::InvalidShape { .. })
    ));
}

#[test]
fn test_slice_offset_overflow_is_out_of_range() {
    let mut session = Session::new();
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![4]).unwrap();
    match slice_op(&mut session, &x, &[usize::MAX], &[2]) {
        Err(ArchGradError::OutOfRange { index, shape, .. }) => {
            assert_eq!(index, vec![isize::MAX]);
            assert_eq!(shape, vec![4]);
        }
        other => panic!("expected OutOfRange, got {:?}", other),
    }
    assert!(matches!(
        slice_op(&mut session, &grid(), &[1, usize::MAX - 1], &[1, 3]),
        Err(ArchGradError::OutOfRange { .. })
    ));
    assert!(session.is_empty());
}

#[test]
fn test_slice_backward_scatters_into_box() -> Result<(), ArchGradError> {
    let mut session = Session::new();
    let x = grid();
    let y = slice_op(&mut session, &x, &[0, 2], &[2, 2])?;
    y.accumulate_grad(&[1.0, 2.0, 3.0, 4.0])?;
    session.finalize()?;
    let expected = vec![
        0.0, 0.0, 1.0, 2.0, //
        0.0, 0.0, 3.0, 4.0, //
        0.0, 0.0, 0.0, 0.0,
    ];
    assert_eq!(x.grad(), expected);
    Ok(())
}

#[test]
fn test_slice_grad_check() {
    let x = grid();
    let output_grad = vec![0.3, -1.2, 0.7];
    check_grad(
        |s, inputs| slice_op(s, &inputs[0], &[0, 1], &[3, 1]),
        &[x],
        &output_grad,
        1e-2,
        1e-3,
    )
    .unwrap();
}
