use super::check_same_shape;
use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct MulBackward {
    a: Tensor,
    b: Tensor,
    output: Tensor,
}

impl BackwardOp for MulBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let (va, vb) = (self.a.values(), self.b.values());
        let grad_a: Vec<f32> = grad_output.iter().zip(&vb).map(|(g, y)| g * y).collect();
        let grad_b: Vec<f32> = grad_output.iter().zip(&va).map(|(g, x)| g * x).collect();
        self.a.accumulate_grad(&grad_a)?;
        self.b.accumulate_grad(&grad_b)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.a.node_id(), self.b.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Elementwise (Hadamard) product of two tensors of identical shape.
pub fn mul_op(session: &mut Session, a: &Tensor, b: &Tensor) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("mul")?;
    check_same_shape(a, b, "mul")?;
    let values = {
        let (va, vb) = (a.values_arc(), b.values_arc());
        va.iter().zip(vb.iter()).map(|(x, y)| x * y).collect()
    };
    let output = Tensor::new(values, a.shape())?;
    session.push(
        "mul",
        MulBackward {
            a: a.clone(),
            b: b.clone(),
            output: output.clone(),
        },
    );
    Ok(output)
}
