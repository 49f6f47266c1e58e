use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::ops::view::utils::{first_shape, normalize_axis};
use crate::tensor::{NodeId, Tensor};

/// Element layout of a stacked tensor: `outer` blocks, each holding one
/// `inner`-long chunk from every member in order.
#[derive(Debug)]
struct StackLayout {
    outer: usize,
    inner: usize,
    count: usize,
}

impl StackLayout {
    fn new(member_shape: &[usize], axis: usize, count: usize) -> Self {
        StackLayout {
            outer: member_shape[..axis].iter().product(),
            inner: member_shape[axis..].iter().product(),
            count,
        }
    }

    /// Range of member `i`'s `o`-th chunk in the stacked buffer.
    fn stacked(&self, o: usize, i: usize) -> std::ops::Range<usize> {
        let start = (o * self.count + i) * self.inner;
        start..start + self.inner
    }

    fn member(&self, o: usize) -> std::ops::Range<usize> {
        o * self.inner..(o + 1) * self.inner
    }

    fn gather(&self, members: &[Vec<f32>]) -> Vec<f32> {
        let mut stacked = vec![0.0; self.outer * self.count * self.inner];
        for o in 0..self.outer {
            for (i, member) in members.iter().enumerate() {
                stacked[self.stacked(o, i)].copy_from_slice(&member[self.member(o)]);
            }
        }
        stacked
    }

    fn scatter(&self, stacked: &[f32]) -> Vec<Vec<f32>> {
        let mut members = vec![vec![0.0; self.outer * self.inner]; self.count];
        for o in 0..self.outer {
            for (i, member) in members.iter_mut().enumerate() {
                member[self.member(o)].copy_from_slice(&stacked[self.stacked(o, i)]);
            }
        }
        members
    }
}

#[derive(Debug)]
struct StackBackward {
    inputs: Vec<Tensor>,
    output: Tensor,
    layout: StackLayout,
}

impl BackwardOp for StackBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let deltas = self.layout.scatter(&self.output.grad());
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
struct UnstackBackward {
    input: Tensor,
    outputs: Vec<Tensor>,
    layout: StackLayout,
}

impl BackwardOp for UnstackBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grads: Vec<Vec<f32>> = self.outputs.iter().map(Tensor::grad).collect();
        self.input.accumulate_grad(&self.layout.gather(&grads))
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        self.outputs.iter().map(Tensor::node_id).collect()
    }
}

/// Stacks equally-shaped tensors along a new axis inserted at `axis` (`0..=rank`).
///
/// # Errors
/// `EmptyTensorList`, `NegativeAxisIndex`, `AxisOutOfRange`, or `ShapeMismatch`
/// if the inputs do not all have the same shape.
pub fn stack_op(session: &mut Session, xs: &[Tensor], axis: isize) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("stack")?;
    let shape = first_shape(xs, "stack")?;
    let axis = normalize_axis(axis, shape.len() + 1, "stack")?;
    for x in &xs[1..] {
        let other = x.shape();
        if other != shape {
            return Err(ArchGradError::ShapeMismatch {
                expected: shape,
                actual: other,
                operation: "stack".to_string(),
            });
        }
    }

    let layout = StackLayout::new(&shape, axis, xs.len());
    let members: Vec<Vec<f32>> = xs.iter().map(Tensor::values).collect();
    let mut out_shape = shape;
    out_shape.insert(axis, xs.len());
    let output = Tensor::new(layout.gather(&members), out_shape)?;
    session.push(
        "stack",
        StackBackward {
            inputs: xs.to_vec(),
            output: output.clone(),
            layout,
        },
    );
    Ok(output)
}

/// Splits `x` into `shape[axis]` tensors with that axis removed.
///
/// # Errors
/// `NegativeAxisIndex` / `AxisOutOfRange`, or `RankTooLow` for a rank-1 input.
pub fn unstack_op(session: &mut Session, x: &Tensor, axis: isize) -> Result<Vec<Tensor>, ArchGradError> {
    session.ensure_recording("unstack")?;
    let shape = x.shape();
    let axis = normalize_axis(axis, shape.len(), "unstack")?;
    if shape.len() < 2 {
        return Err(ArchGradError::RankTooLow {
            shape,
            operation: "unstack".to_string(),
        });
    }
    let mut member_shape = shape.clone();
    let count = member_shape.remove(axis);
    let layout = StackLayout::new(&member_shape, axis, count);
    let outputs = layout
        .scatter(&x.values_arc())
        .into_iter()
        .map(|values| Tensor::new(values, member_shape.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    session.push(
        "unstack",
        UnstackBackward {
            input: x.clone(),
            outputs: outputs.clone(),
            layout,
        },
    );
    Ok(outputs)
}

#[cfg(test)]
#[path = "stack_test.rs"]
mod tests;
