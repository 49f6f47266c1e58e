use super::check_same_shape;
use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct AddBackward {
    a: Tensor,
    b: Tensor,
    output: Tensor,
}

impl BackwardOp for AddBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        self.a.accumulate_grad(&grad_output)?;
        self.b.accumulate_grad(&grad_output)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.a.node_id(), self.b.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Elementwise sum of two tensors of identical shape.
pub fn add_op(session: &mut Session, a: &Tensor, b: &Tensor) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("add")?;
    check_same_shape(a, b, "add")?;
    let values = {
        let (va, vb) = (a.values_arc(), b.values_arc());
        va.iter().zip(vb.iter()).map(|(x, y)| x + y).collect()
    };
    let output = Tensor::new(values, a.shape())?;
    session.push(
        "add",
        AddBackward {
            a: a.clone(),
            b: b.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
