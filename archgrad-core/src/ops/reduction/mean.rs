use super::GroupLayout;
use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct MeanReduceBackward {
    input: Tensor,
    output: Tensor,
    layout: GroupLayout,
}

impl BackwardOp for MeanReduceBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let scale = 1.0 / self.layout.count as f32;
        self.input.with_grad_mut(|grad_input| {
            for (out, g) in grad_output.iter().enumerate() {
                for m in self.layout.members(out) {
                    grad_input[m] += g * scale;
                }
            }
        });
        Ok(())
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Mean over each group of `count` consecutive elements along `axis`.
pub fn mean_reduce_op(
    session: &mut Session,
    x: &Tensor,
    axis: isize,
    count: usize,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("mean_reduce")?;
    let (layout, out_shape) = GroupLayout::new(x, axis, count, "mean_reduce")?;
    let source = x.values_arc();
    let values: Vec<f32> = (0..layout.output_len())
        .map(|out| layout.members(out).map(|m| source[m]).sum::<f32>() / count as f32)
        .collect();
    let output = Tensor::new(values, out_shape)?;
    session.push(
        "mean_reduce",
        MeanReduceBackward {
            input: x.clone(),
            output: output.clone(),
            layout,
        },
    );
    Ok(output)
}
