use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::utils::index_to_coord;
use crate::tensor::{NodeId, Tensor};

#[derive(Debug)]
struct SliceBackward {
    input: Tensor,
    output: Tensor,
    offsets: Vec<usize>,
}

impl BackwardOp for SliceBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let out_shape = self.output.shape();
        let strides = self.input.strides();
        self.input.with_grad_mut(|grad_input| {
            for (i, g) in grad_output.iter().enumerate() {
                grad_input[source_offset(i, &out_shape, &self.offsets, &strides)] += *g;
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

/// Offset in the input buffer of output element `index`.
fn source_offset(index: usize, out_shape: &[usize], offsets: &[usize], strides: &[usize]) -> usize {
    index_to_coord(index, out_shape)
        .iter()
        .zip(offsets)
        .zip(strides)
        .map(|((c, o), s)| (c + o) * s)
        .sum()
}

/// Extracts the box of extent `sizes` starting at `offsets` from `x`.
///
/// # Errors
/// `OutOfRange` if either list length differs from the rank or the box does not
/// fit inside `x`; `InvalidShape` if any size is zero.
pub fn slice_op(
    session: &mut Session,
    x: &Tensor,
    offsets: &[usize],
    sizes: &[usize],
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("slice")?;
    let shape = x.shape();
    let fits = offsets.len() == shape.len()
        && sizes.len() == shape.len()
        && (0..shape.len()).all(|a| offsets[a].checked_add(sizes[a]).map_or(false, |end| end <= shape[a]));
    if !fits {
        return Err(ArchGradError::OutOfRange {
            index: offsets
                .iter()
                .zip(sizes)
                .map(|(o, s)| isize::try_from(o.saturating_add(*s)).unwrap_or(isize::MAX))
                .collect(),
            shape,
            operation: "slice".to_string(),
        });
    }

    let strides = x.strides();
    let numel: usize = sizes.iter().product();
    let output = {
        let source = x.read_data();
        let values: Vec<f32> = (0..numel)
            .map(|i| source.values[source_offset(i, sizes, offsets, &strides)])
            .collect();
        Tensor::new(values, sizes.to_vec())?
    };
    session.push(
        "slice",
        SliceBackward {
            input: x.clone(),
            output: output.clone(),
            offsets: offsets.to_vec(),
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "slice_test.rs"]
mod tests;
