use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::ops::view::utils::{first_shape, normalize_axis};
use crate::tensor::utils::axis_blocks;
use crate::tensor::{NodeId, Tensor};

/// How [`split_op`] partitions the split axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitArg {
    /// Explicit part sizes; they must be positive and sum to the axis length.
    Sizes(Vec<usize>),
    /// Number of equal parts; must divide the axis length.
    Count(usize),
}

/// Backward shared by concat and split: a list of "parts" laid side by side
/// along an axis of a "whole". Concat routes whole -> parts, split parts -> whole.
#[derive(Debug)]
struct PartsLayout {
    outer: usize,
    inner: usize,
    lengths: Vec<usize>,
}

impl PartsLayout {
    fn total(&self) -> usize {
        self.lengths.iter().sum()
    }

    /// Calls `f(part, part_range, whole_range)` for each contiguous run.
    fn for_each_run<F: FnMut(usize, std::ops::Range<usize>, std::ops::Range<usize>)>(&self, mut f: F) {
        let row = self.total() * self.inner;
        for o in 0..self.outer {
            let mut start = o * row;
            for (p, &len) in self.lengths.iter().enumerate() {
                let run = len * self.inner;
                f(p, o * run..(o + 1) * run, start..start + run);
                start += run;
            }
        }
    }
}

#[derive(Debug)]
struct ConcatBackward {
    inputs: Vec<Tensor>,
    output: Tensor,
    layout: PartsLayout,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let mut deltas: Vec<Vec<f32>> = self.inputs.iter().map(|t| vec![0.0; t.numel()]).collect();
        self.layout.for_each_run(|p, part, whole| {
            deltas[p][part].copy_from_slice(&grad_output[whole]);
        });
        for (input, delta) in self.inputs.iter().zip(&deltas) {
            input.accumulate_grad(delta)?;
        }
        Ok(())
    }

    fn inputs(&self) -> Vec<NodeId> {
        self.inputs.iter().map(Tensor::node_id).collect()
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

#[derive(Debug)]
struct SplitBackward {
    input: Tensor,
    outputs: Vec<Tensor>,
    layout: PartsLayout,
}

impl BackwardOp for SplitBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grads: Vec<Vec<f32>> = self.outputs.iter().map(Tensor::grad).collect();
        let mut delta = vec![0.0; self.input.numel()];
        self.layout.for_each_run(|p, part, whole| {
            delta[whole].copy_from_slice(&grads[p][part]);
        });
        self.input.accumulate_grad(&delta)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        self.outputs.iter().map(Tensor::node_id).collect()
    }
}

/// Concatenates tensors along `axis`.
///
/// All inputs must have the same rank and agree on every axis except `axis`.
/// Concatenating `[2,4,6]` and `[3,4,6]` along axis 0 gives `[5,4,6]`.
///
/// # Errors
/// `EmptyTensorList`, `NegativeAxisIndex`, `AxisOutOfRange` or `ShapeMismatch`.
pub fn concat_op(session: &mut Session, xs: &[Tensor], axis: isize) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("concat")?;
    let reference = first_shape(xs, "concat")?;
    let axis = normalize_axis(axis, reference.len(), "concat")?;
    let mut lengths = Vec::with_capacity(xs.len());
    for x in xs {
        let shape = x.shape();
        let compatible = shape.len() == reference.len()
            && (0..shape.len()).all(|a| a == axis || shape[a] == reference[a]);
        if !compatible {
            return Err(ArchGradError::ShapeMismatch {
                expected: reference,
                actual: shape,
                operation: "concat".to_string(),
            });
        }
        lengths.push(shape[axis]);
    }

    let (outer, _, inner) = axis_blocks(&reference, axis);
    let layout = PartsLayout { outer, inner, lengths };
    let mut out_shape = reference;
    out_shape[axis] = layout.total();

    let sources: Vec<_> = xs.iter().map(Tensor::values_arc).collect();
    let mut values = vec![0.0; out_shape.iter().product()];
    layout.for_each_run(|p, part, whole| {
        values[whole].copy_from_slice(&sources[p][part]);
    });
    let output = Tensor::new(values, out_shape)?;
    session.push(
        "concat",
        ConcatBackward {
            inputs: xs.to_vec(),
            output: output.clone(),
            layout,
        },
    );
    Ok(output)
}

/// Splits `x` along `axis` into consecutive parts.
///
/// # Errors
/// - `NegativeAxisIndex` / `AxisOutOfRange` for an invalid axis.
/// - `IndivisibleSplit` when a count does not divide the axis length.
/// - `ShapeMismatch` when explicit sizes do not sum to the axis length.
/// - `InvalidShape` for a zero size.
pub fn split_op(
    session: &mut Session,
    x: &Tensor,
    axis: isize,
    split: SplitArg,
) -> Result<Vec<Tensor>, ArchGradError> {
    session.ensure_recording("split")?;
    let shape = x.shape();
    let axis = normalize_axis(axis, shape.len(), "split")?;
    let length = shape[axis];
    let lengths = match split {
        SplitArg::Count(count) => {
            if count == 0 || length % count != 0 {
                return Err(ArchGradError::IndivisibleSplit {
                    length,
                    count,
                    operation: "split".to_string(),
                });
            }
            vec![length / count; count]
        }
        SplitArg::Sizes(sizes) => {
            if sizes.is_empty() || sizes.contains(&0) {
                let mut bad = shape.clone();
                bad[axis] = 0;
                return Err(ArchGradError::InvalidShape { shape: bad });
            }
            if sizes.iter().sum::<usize>() != length {
                return Err(ArchGradError::ShapeMismatch {
                    expected: vec![length],
                    actual: sizes,
                    operation: "split".to_string(),
                });
            }
            sizes
        }
    };

    let (outer, _, inner) = axis_blocks(&shape, axis);
    let layout = PartsLayout { outer, inner, lengths };
    let source = x.values_arc();
    let mut parts: Vec<Vec<f32>> = layout
        .lengths
        .iter()
        .map(|len| vec![0.0; outer * len * inner])
        .collect();
    layout.for_each_run(|p, part, whole| {
        parts[p][part].copy_from_slice(&source[whole]);
    });
    let outputs = parts
        .into_iter()
        .zip(&layout.lengths)
        .map(|(values, &len)| {
            let mut part_shape = shape.clone();
            part_shape[axis] = len;
            Tensor::new(values, part_shape)
        })
        .collect::<Result<Vec<_>, _>>()?;

    session.push(
        "split",
        SplitBackward {
            input: x.clone(),
            outputs: outputs.clone(),
            layout,
        },
    );
    Ok(outputs)
}

#[cfg(test)]
#[path = "concat_test.rs"]
mod tests;
