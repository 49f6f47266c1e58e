use super::*;
use crate::autograd::grad_check::check_grad;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_fully_connected_flattens_samples() -> Result<(), ArchGradError> {
    let mut rng = StdRng::seed_from_u64(0);
    let layer = FullyConnected::new(&[2, 3], 4, &mut rng)?;
    assert_eq!(layer.output_shape(), &[4]);
    assert_eq!(layer.weight().shape(), vec![6, 4]);
    assert_eq!(layer.architecture(), "4N");
    assert!(layer.needs_activation());
    assert_eq!(layer.parameters().len(), 2);

    let mut session = Session::new();
    let x = Tensor::new(vec![0.5; 12], vec![2, 2, 3])?;
    let y = layer.forward(&mut session, &[x])?;
    assert_eq!(y[0].shape(), vec![2, 4]);
    Ok(())
}

#[test]
fn test_fully_connected_rejects_wrong_sample_shape() -> Result<(), ArchGradError> {
    let layer = FullyConnected::new(&[3], 2, &mut StdRng::seed_from_u64(0))?;
    let mut session = Session::new();
    let x = Tensor::new(vec![0.0; 8], vec![2, 4])?;
    assert!(matches!(
        layer.forward(&mut session, &[x]),
        Err(ArchGradError::ShapeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_fully_connected_gradients() -> Result<(), ArchGradError> {
    let layer = FullyConnected::new(&[3], 2, &mut StdRng::seed_from_u64(5))?;
    layer.init_bias(0.1);
    assert_eq!(layer.bias().values(), vec![0.1, 0.1]);
    let x = Tensor::new(vec![0.2, -0.4, 0.6, 1.0, 0.0, -1.0], vec![2, 3])?;
    check_grad(
        |s, inputs| Ok(layer.forward(s, inputs)?.remove(0)),
        &[x],
        &[1.0, -1.0, 0.5, 2.0],
        1e-2,
        1e-3,
    )
    .unwrap();
    Ok(())
}
