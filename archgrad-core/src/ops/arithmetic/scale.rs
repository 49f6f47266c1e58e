use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct ScaleBackward {
    input: Tensor,
    output: Tensor,
    factor: f32,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let delta: Vec<f32> = self.output.grad().iter().map(|g| g * self.factor).collect();
        self.input.accumulate_grad(&delta)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Multiplies every element by a constant.
pub fn scale_op(session: &mut Session, x: &Tensor, factor: f32) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("scale")?;
    let values = x.values_arc().iter().map(|v| v * factor).collect();
    let output = Tensor::new(values, x.shape())?;
    session.push(
        "scale",
        ScaleBackward {
            input: x.clone(),
            output: output.clone(),
            factor,
        },
    );
    Ok(output)
}
