use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// Stride and zero padding of a 2-D convolution, as `(rows, cols)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dConfig {
    pub stride: (usize, usize),
    pub padding: (usize, usize),
}

impl Default for Conv2dConfig {
    fn default() -> Self {
        Conv2dConfig {
            stride: (1, 1),
            padding: (0, 0),
        }
    }
}

impl Conv2dConfig {
    /// Spatial output size for an input extent and kernel extent along one axis,
    /// or `None` if the padded input is smaller than the kernel.
    pub fn output_extent(input: usize, kernel: usize, stride: usize, padding: usize) -> Option<usize> {
        let padded = input + 2 * padding;
        if stride == 0 || padded < kernel {
            return None;
        }
        Some((padded - kernel) / stride + 1)
    }
}

/// Resolved dimensions of one convolution call (NHWC input, `[KH, KW, C, N]` kernel).
#[derive(Debug, Clone, Copy)]
struct Geometry {
    batch: usize,
    height: usize,
    width: usize,
    channels: usize,
    kernel_h: usize,
    kernel_w: usize,
    filters: usize,
    out_h: usize,
    out_w: usize,
    config: Conv2dConfig,
}

impl Geometry {
    /// Calls `f(input_pixel, kernel_tap, output_pixel)` for every in-bounds
    /// (output position, kernel tap) pair. Offsets are to the first channel of
    /// the input pixel, the first `[c, n]` entry of the tap, and the first
    /// filter of the output pixel.
    fn for_each_tap<F: FnMut(usize, usize, usize)>(&self, mut f: F) {
        let (sy, sx) = self.config.stride;
        let (py, px) = self.config.padding;
        for b in 0..self.batch {
            for oy in 0..self.out_h {
                for ox in 0..self.out_w {
                    let out_base = ((b * self.out_h + oy) * self.out_w + ox) * self.filters;
                    for ky in 0..self.kernel_h {
                        let iy = oy * sy + ky;
                        if iy < py || iy - py >= self.height {
                            continue;
                        }
                        for kx in 0..self.kernel_w {
                            let ix = ox * sx + kx;
                            if ix < px || ix - px >= self.width {
                                continue;
                            }
                            let in_base =
                                ((b * self.height + iy - py) * self.width + ix - px) * self.channels;
                            let tap_base = (ky * self.kernel_w + kx) * self.channels * self.filters;
                            f(in_base, tap_base, out_base);
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug)]
struct Conv2dBackward {
    input: Tensor,
    kernel: Tensor,
    bias: Tensor,
    output: Tensor,
    geometry: Geometry,
}

impl BackwardOp for Conv2dBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let g = self.geometry;
        let grad_output = self.output.grad();
        let x = self.input.values_arc();
        let w = self.kernel.values_arc();
        let mut grad_x = vec![0.0; x.len()];
        let mut grad_w = vec![0.0; w.len()];
        let mut grad_b = vec![0.0; g.filters];

        for pixel in grad_output.chunks(g.filters) {
            for (db, dy) in grad_b.iter_mut().zip(pixel) {
                *db += *dy;
            }
        }
        g.for_each_tap(|in_base, tap_base, out_base| {
            let dy = &grad_output[out_base..out_base + g.filters];
            for c in 0..g.channels {
                let row = tap_base + c * g.filters;
                let xv = x[in_base + c];
                let mut acc = 0.0;
                for n in 0..g.filters {
                    acc += dy[n] * w[row + n];
                    grad_w[row + n] += xv * dy[n];
                }
                grad_x[in_base + c] += acc;
            }
        });

        self.input.accumulate_grad(&grad_x)?;
        self.kernel.accumulate_grad(&grad_w)?;
        self.bias.accumulate_grad(&grad_b)
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![self.input.node_id(), self.kernel.node_id(), self.bias.node_id()]
    }

    fn outputs(&self) -> Vec<NodeId> {
        vec![self.output.node_id()]
    }
}

/// 2-D convolution of an NHWC batch with a `[KH, KW, C, N]` kernel plus a
/// per-filter bias, producing `[B, OH, OW, N]`.
///
/// # Errors
/// `ShapeMismatch` if the ranks or channel counts disagree, the bias is not
/// `[N]`, or the padded input is smaller than the kernel.
pub fn conv2d_op(
    session: &mut Session,
    x: &Tensor,
    kernel: &Tensor,
    bias: &Tensor,
    config: Conv2dConfig,
) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("conv2d")?;
    let (xs, ks, bs) = (x.shape(), kernel.shape(), bias.shape());
    let mismatch = |expected: Vec<usize>, actual: Vec<usize>| ArchGradError::ShapeMismatch {
        expected,
        actual,
        operation: "conv2d".to_string(),
    };
    if xs.len() != 4 || ks.len() != 4 || xs[3] != ks[2] {
        return Err(mismatch(xs, ks));
    }
    if bs != [ks[3]] {
        return Err(mismatch(vec![ks[3]], bs));
    }
    let out_h = Conv2dConfig::output_extent(xs[1], ks[0], config.stride.0, config.padding.0);
    let out_w = Conv2dConfig::output_extent(xs[2], ks[1], config.stride.1, config.padding.1);
    let (out_h, out_w) = match (out_h, out_w) {
        (Some(h), Some(w)) => (h, w),
        _ => return Err(mismatch(ks[..2].to_vec(), xs[1..3].to_vec())),
    };
    let geometry = Geometry {
        batch: xs[0],
        height: xs[1],
        width: xs[2],
        channels: xs[3],
        kernel_h: ks[0],
        kernel_w: ks[1],
        filters: ks[3],
        out_h,
        out_w,
        config,
    };

    let values = {
        let xv = x.values_arc();
        let wv = kernel.values_arc();
        let bv = bias.values_arc();
        let mut out: Vec<f32> = (0..geometry.batch * out_h * out_w)
            .flat_map(|_| bv.iter().copied())
            .collect();
        geometry.for_each_tap(|in_base, tap_base, out_base| {
            for c in 0..geometry.channels {
                let xval = xv[in_base + c];
                let row = tap_base + c * geometry.filters;
                for n in 0..geometry.filters {
                    out[out_base + n] += xval * wv[row + n];
                }
            }
        });
        out
    };
    let output = Tensor::new(values, vec![geometry.batch, out_h, out_w, geometry.filters])?;
    session.push(
        "conv2d",
        Conv2dBackward {
            input: x.clone(),
            kernel: kernel.clone(),
            bias: bias.clone(),
            output: output.clone(),
            geometry,
        },
    );
    Ok(output)
}

#[cfg(test)]
#[path = "conv2d_test.rs"]
mod tests;
