/// Calculates the row-major strides for a given shape.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Converts a linear row-major index into per-axis coordinates.
pub fn index_to_coord(index: usize, shape: &[usize]) -> Vec<usize> {
    let mut coord = vec![0; shape.len()];
    let mut remaining = index;
    for axis in (0..shape.len()).rev() {
        coord[axis] = remaining % shape[axis];
        remaining /= shape[axis];
    }
    coord
}

/// Splits a shape around `axis` into `(outer, axis_len, inner)`:
/// the product of the axes before, the axis itself, and the product after.
///
/// A row-major buffer is then `outer` consecutive blocks of `axis_len * inner`
/// elements, which is how every axis-aligned copy in the op library walks memory.
pub fn axis_blocks(shape: &[usize], axis: usize) -> (usize, usize, usize) {
    let outer = shape[..axis].iter().product();
    let inner = shape[axis + 1..].iter().product();
    (outer, shape[axis], inner)
}

#[cfg(test)]
#[path = "utils_test.rs"]
mod tests;
