use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// Row-major `[m, k] x [k, n]` product, accumulated into `out`.
/// `transpose_a` / `transpose_b` read the stored operand as its transpose.
#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm_acc(
    a: &[f32],
    b: &[f32],
    out: &mut [f32],
    m: usize,
    k: usize,
    n: usize,
    transpose_a: bool,
    transpose_b: bool,
) {
    for i in 0..m {
        for p in 0..k {
            let lhs = if transpose_a { a[p * m + i] } else { a[i * k + p] };
            if lhs == 0.0 {
                continue;
            }
            for j in 0..n {
                let rhs = if transpose_b { b[j * k + p] } else { b[p * n + j] };
                out[i * n + j] += lhs * rhs;
            }
        }
    }
}

#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    output: Tensor,
    m: usize,
    k: usize,
    n: usize,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let grad_output = self.output.grad();
        let (va, vb) = (self.a.values(), self.b.values());
        // dA = dY . B^T, dB = A^T . dY
        let mut grad_a = vec![0.0; self.m * self.k];
        gemm_acc(&grad_output, &vb, &mut grad_a, self.m, self.n, self.k, false, true);
        let mut grad_b = vec![0.0; self.k * self.n];
        gemm_acc(&va, &grad_output, &mut grad_b, self.k, self.m, self.n, true, false);
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

/// Matrix product of a `[m, k]` and a `[k, n]` tensor.
///
/// # Errors
/// `UnsupportedOperation` for operands that are not rank 2, `ShapeMismatch` if
/// the inner dimensions differ.
pub fn matmul_op(session: &mut Session, a: &Tensor, b: &Tensor) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("matmul")?;
    let (sa, sb) = (a.shape(), b.shape());
    if sa.len() != 2 || sb.len() != 2 {
        return Err(ArchGradError::UnsupportedOperation(format!(
            "matmul expects rank-2 operands, got {:?} and {:?}",
            sa, sb
        )));
    }
    if sa[1] != sb[0] {
        return Err(ArchGradError::ShapeMismatch {
            expected: vec![sa[1], sb[1]],
            actual: sb,
            operation: "matmul".to_string(),
        });
    }
    let (m, k, n) = (sa[0], sa[1], sb[1]);
    let mut values = vec![0.0; m * n];
    gemm_acc(&a.values_arc(), &b.values_arc(), &mut values, m, k, n, false, false);
    let output = Tensor::new(values, vec![m, n])?;
    session.push(
        "matmul",
        MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            output: output.clone(),
            m,
            k,
            n,
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
