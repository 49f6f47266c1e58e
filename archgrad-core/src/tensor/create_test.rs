use super::*;
use crate::error::ArchGradError;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_zeros() {
    let t = zeros(&[2, 3]).unwrap();
    assert_eq!(t.shape(), vec![2, 3]);
    assert_eq!(t.numel(), 6);
    assert!(t.values().iter().all(|&x| x == 0.0));
}

#[test]
fn test_zeros_like() {
    let t = Tensor::new(vec![1.0, 2.0, 3.0], vec![1, 3]).unwrap();
    let z = zeros_like(&t).unwrap();
    assert_eq!(z.shape(), t.shape());
    assert!(z.values().iter().all(|&x| x == 0.0));
}

#[test]
fn test_full() {
    let t = full(&[2, 2], 7.5).unwrap();
    assert_eq!(t.values(), vec![7.5; 4]);
}

#[test]
fn test_zero_axis_rejected() {
    assert!(matches!(zeros(&[2, 0]), Err(ArchGradError::InvalidShape { .. })));
    assert!(matches!(zeros(&[]), Err(ArchGradError::InvalidShape { .. })));
}

#[test]
fn test_randn_is_seeded() {
    let a = randn(&[4, 4], 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
    let b = randn(&[4, 4], 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_uniform_bounds() {
    let t = uniform(&[100], -0.5, 0.5, &mut StdRng::seed_from_u64(11)).unwrap();
    assert!(t.values().iter().all(|&x| (-0.5..0.5).contains(&x)));
    assert!(uniform(&[1], 1.0, 1.0, &mut StdRng::seed_from_u64(0)).is_err());
}
