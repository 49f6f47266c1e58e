use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct SoftmaxBackward {
    input: Tensor,
    output: Tensor,
    width: usize,
}

impl BackwardOp for SoftmaxBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let probs = self.output.values_arc();
        let mut delta = Vec::with_capacity(grad_output.len());
        // dx_i = y_i * (g_i - sum_j g_j y_j)
        for (g, y) in grad_output.chunks(self.width).zip(probs.chunks(self.width)) {
            let dot: f32 = g.iter().zip(y).map(|(a, b)| a * b).sum();
            delta.extend(g.iter().zip(y).map(|(gi, yi)| yi * (gi - dot)));
        }
        self.input.accumulate_grad(&delta)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// Row-wise softmax: every run along the last axis is normalized to a probability
/// distribution. The maximum is subtracted before exponentiating.
pub(crate) fn softmax_rows(values: &[f32], width: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(values.len());
    for row in values.chunks(width) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = row.iter().map(|v| (v - max).exp()).collect();
        let total: f32 = exps.iter().sum();
        out.extend(exps.iter().map(|e| e / total));
    }
    out
}

/// Softmax over the last axis.
pub fn softmax_op(session: &mut Session, x: &Tensor) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("softmax")?;
    let shape = x.shape();
    let width = shape[shape.len() - 1];
    let output = Tensor::new(softmax_rows(&x.values_arc(), width), shape)?;
    session.push(
        "softmax",
        SoftmaxBackward {
            input: x.clone(),
            output: output.clone(),
            width,
        },
    );
    Ok(output)
}
