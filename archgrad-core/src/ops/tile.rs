use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::ops::view::utils::normalize_axis;
use crate::tensor::utils::axis_blocks;
use crate::tensor::{NodeId, Tensor};

/// `outer` blocks of a long axis made of `count` repetitions of a short block
/// of `run` contiguous elements.
#[derive(Debug)]
struct Repetition {
    outer: usize,
    run: usize,
    count: usize,
}

impl Repetition {
    /// Writes `count` copies of each short block of `short` into a long buffer.
    fn tile(&self, short: &[f32]) -> Vec<f32> {
        let mut long = Vec::with_capacity(self.outer * self.count * self.run);
        for block in short.chunks(self.run) {
            for _ in 0..self.count {
                long.extend_from_slice(block);
            }
        }
        long
    }

    /// Sums the `count` partitions of each long block into a short buffer.
    fn fold(&self, long: &[f32]) -> Vec<f32> {
        let mut short = vec![0.0; self.outer * self.run];
        for (o, block) in long.chunks(self.count * self.run).enumerate() {
            let target = &mut short[o * self.run..(o + 1) * self.run];
            for part in block.chunks(self.run) {
                for (t, v) in target.iter_mut().zip(part) {
                    *t += *v;
                }
            }
        }
        short
    }
}

#[derive(Debug)]
struct TileBackward {
    input: Tensor,
    output: Tensor,
    repetition: Repetition,
}

impl BackwardOp for TileBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        self.input
            .accumulate_grad(&self.repetition.fold(&self.output.grad()))
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

#[derive(Debug)]
struct UntileBackward {
    input: Tensor,
    output: Tensor,
    repetition: Repetition,
}

impl BackwardOp for UntileBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        self.input
            .accumulate_grad(&self.repetition.tile(&self.output.grad()))
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

fn check_count(count: usize, shape: &[usize], axis: usize) -> Result<(), ArchGradError> {
    if count == 0 {
        let mut bad = shape.to_vec();
        bad[axis] = 0;
        return Err(ArchGradError::InvalidShape { shape: bad });
    }
    Ok(())
}

/// Repeats `x` `count` times along `axis`: the output axis holds `count`
/// consecutive copies of the whole input axis.
pub fn tile_op(
    session: &mut Session,
    x: &Tensor,
    axis: isize,
    count: usize,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("tile")?;
    let mut shape = x.shape();
    let axis = normalize_axis(axis, shape.len(), "tile")?;
    check_count(count, &shape, axis)?;
    let (outer, len, inner) = axis_blocks(&shape, axis);
    let repetition = Repetition {
        outer,
        run: len * inner,
        count,
    };
    shape[axis] *= count;
    let output = Tensor::new(repetition.tile(&x.values_arc()), shape)?;
    session.push(
        "tile",
        TileBackward {
            input: x.clone(),
            output: output.clone(),
            repetition,
        },
    );
    Ok(output)
}

/// Sums `count` contiguous partitions of `axis` elementwise.
///
/// `untile(tile(x, n), n)` is `n * x`.
///
/// # Errors
/// `IndivisibleSplit` if `count` does not divide the axis length.
pub fn untile_op(
    session: &mut Session,
    x: &Tensor,
    axis: isize,
    count: usize,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("untile")?;
    let mut shape = x.shape();
    let axis = normalize_axis(axis, shape.len(), "untile")?;
    check_count(count, &shape, axis)?;
    let (outer, len, inner) = axis_blocks(&shape, axis);
    if len % count != 0 {
        return Err(ArchGradError::IndivisibleSplit {
            length: len,
            count,
            operation: "untile".to_string(),
        });
    }
    let repetition = Repetition {
        outer,
        run: len / count * inner,
        count,
    };
    shape[axis] = len / count;
    let output = Tensor::new(repetition.fold(&x.values_arc()), shape)?;
    session.push(
        "untile",
        UntileBackward {
            input: x.clone(),
            output: output.clone(),
            repetition,
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "tile_test.rs"]
mod tests;
