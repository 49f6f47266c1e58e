use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};
use rand::Rng;

#[derive(Debug)]
struct DropoutBackward {
    input: Tensor,
    output: Tensor,
    mask: Vec<f32>,
}

impl BackwardOp for DropoutBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let delta: Vec<f32> = self
            .output
            .grad()
            .iter()
            .zip(&self.mask)
            .map(|(g, m)| g * m)
            .collect();
        self.input.accumulate_grad(&delta)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Inverted dropout: each element is kept with probability `keep` and scaled by
/// `1 / keep`, or zeroed. The same mask gates the gradient.
///
/// # Errors
/// `UnsupportedOperation` unless `0 < keep <= 1`.
pub fn dropout_op<R: Rng + ?Sized>(
    session: &mut Session,
    x: &Tensor,
    keep: f32,
    rng: &mut R,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("dropout")?;
    if !(keep > 0.0 && keep <= 1.0) {
        return Err(ArchGradError::UnsupportedOperation(format!(
            "dropout keep probability must be in (0, 1], got {}",
            keep
        )));
    }
    let mask: Vec<f32> = (0..x.numel())
        .map(|_| if rng.gen::<f32>() < keep { 1.0 / keep } else { 0.0 })
        .collect();
    let values = x.values_arc().iter().zip(&mask).map(|(v, m)| v * m).collect();
    let output = Tensor::new(values, x.shape())?;
    session.push(
        "dropout",
        DropoutBackward {
            input: x.clone(),
            output: output.clone(),
            mask,
        },
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dropout_masks_and_rescales() -> Result<(), ArchGradError> {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = Session::new();
        let x = Tensor::new(vec![1.0; 200], vec![200])?;
        let y = dropout_op(&mut session, &x, 0.5, &mut rng)?;
        let values = y.values();
        assert!(values.iter().all(|&v| v == 0.0 || v == 2.0));
        let kept = values.iter().filter(|&&v| v > 0.0).count();
        assert!(kept > 60 && kept < 140, "kept {}", kept);

        y.accumulate_grad(&[1.0; 200])?;
        session.finalize()?;
        assert_eq!(x.grad(), values);
        Ok(())
    }

    #[test]
    fn test_dropout_keep_one_is_identity() -> Result<(), ArchGradError> {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = Session::new();
        let x = Tensor::new(vec![0.5, -1.0, 3.0], vec![3])?;
        let y = dropout_op(&mut session, &x, 1.0, &mut rng)?;
        assert_eq!(y.values(), x.values());
        assert!(dropout_op(&mut session, &x, 0.0, &mut rng).is_err());
        Ok(())
    }
}
