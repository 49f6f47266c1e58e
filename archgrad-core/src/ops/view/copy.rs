use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// Backward for operations whose output is the input with a different shape or
/// a different buffer: the output gradient is added unchanged to the input.
#[derive(Debug)]
pub(crate) struct IdentityBackward {
    pub(crate) input: Tensor,
    pub(crate) output: Tensor,
}

impl BackwardOp for IdentityBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        self.input.accumulate_grad(&self.output.grad())
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Returns a tensor with the same shape and values as `x`, backed by its own buffer.
///
/// Used to fan a value out to several consumers: each copy accumulates its own
/// gradient, and the backward pass adds all of them into `x`.
pub fn copy_op(session: &mut Session, x: &Tensor) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("copy")?;
    let output = Tensor::new(x.values(), x.shape())?;
    session.push(
        "copy",
        IdentityBackward {
            input: x.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_owns_its_buffer() -> Result<(), ArchGradError> {
        let mut session = Session::new();
        let x = Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?;
        let y = copy_op(&mut session, &x)?;
        assert_eq!(y, x);
        assert!(!y.shares_values_with(&x));
        y.update_values(|v| v[0] = 10.0);
        assert_eq!(x.values(), vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_fan_out_copies_sum_into_source() -> Result<(), ArchGradError> {
        let mut session = Session::new();
        let x = Tensor::new(vec![1.0, 2.0], vec![2])?;
        let a = copy_op(&mut session, &x)?;
        let b = copy_op(&mut session, &x)?;
        a.accumulate_grad(&[1.0, 2.0])?;
        b.accumulate_grad(&[0.5, -1.0])?;
        session.finalize()?;
        assert_eq!(x.grad(), vec![1.5, 1.0]);
        Ok(())
    }
}
