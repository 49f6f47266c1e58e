use super::GroupLayout;
use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// Backward for the grouped max: each output gradient goes to the single input
/// element that won its group.
#[derive(Debug)]
struct MaxReduceBackward {
    input: Tensor,
    output: Tensor,
    argmax: Vec<usize>,
}

impl BackwardOp for MaxReduceBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        self.input.with_grad_mut(|grad_input| {
            for (&source, g) in self.argmax.iter().zip(&grad_output) {
                grad_input[source] += *g;
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

/// Maximum over each group of `count` consecutive elements along `axis`.
///
/// Ties resolve to the first maximal element; only that element receives gradient.
///
/// # Errors
/// `NegativeAxisIndex` / `AxisOutOfRange`, or `IndivisibleSplit` if `count` does
/// not divide the axis length.
pub fn max_reduce_op(
    session: &mut Session,
    x: &Tensor,
    axis: isize,
    count: usize,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("max_reduce")?;
    let (layout, out_shape) = GroupLayout::new(x, axis, count, "max_reduce")?;
    let source = x.values_arc();
    let mut values = Vec::with_capacity(layout.output_len());
    let mut argmax = Vec::with_capacity(layout.output_len());
    for out in 0..layout.output_len() {
        let mut members = layout.members(out);
        // `count >= 1`, so every group has a first member.
        let mut best = members.next().unwrap_or_default();
        for m in members {
            if source[m] > source[best] {
                best = m;
            }
        }
        values.push(source[best]);
        argmax.push(best);
    }
    let output = Tensor::new(values, out_shape)?;
    session.push(
        "max_reduce",
        MaxReduceBackward {
            input: x.clone(),
            output: output.clone(),
            argmax,
        },
    );
    Ok(output)
}
