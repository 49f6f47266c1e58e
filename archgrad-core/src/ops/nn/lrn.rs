use crate::autograd::{BackwardOp, Session};
use crate::error::ArchGradError;
use crate::tensor::{NodeId, Tensor};

/// Parameters of local response normalization:
/// `y_c = x_c / (k + alpha * sum_{j in window(c)} x_j^2)^beta`, with a window of
/// `size` neighbouring channels centred on `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrnConfig {
    pub size: usize,
    pub alpha: f32,
    pub beta: f32,
    pub k: f32,
}

impl Default for LrnConfig {
    fn default() -> Self {
        LrnConfig {
            size: 5,
            alpha: 1e-4,
            beta: 0.75,
            k: 2.0,
        }
    }
}

impl LrnConfig {
    fn window(&self, c: usize, channels: usize) -> std::ops::Range<usize> {
        let half = self.size / 2;
        c.saturating_sub(half)..(c + half + 1).min(channels)
    }

    /// Denominator base `k + alpha * window sum of squares` for every channel of one pixel.
    fn denominators(&self, pixel: &[f32]) -> Vec<f32> {
        (0..pixel.len())
            .map(|c| {
                let sum: f32 = pixel[self.window(c, pixel.len())].iter().map(|v| v * v).sum();
                self.k + self.alpha * sum
            })
            .collect()
    }
}

#[derive(Debug)]
struct LrnBackward {
    input: Tensor,
    output: Tensor,
    config: LrnConfig,
    channels: usize,
}

impl BackwardOp for LrnBackward {
    fn backward(&self) -> Result<(), ArchGradError> {
        let cfg = self.config;
        let grad_output = self.output.grad();
        let x = self.input.values_arc();
        let mut delta = Vec::with_capacity(x.len());
        for (pixel, g) in x.chunks(self.channels).zip(grad_output.chunks(self.channels)) {
            let denom = cfg.denominators(pixel);
            // t_c = g_c * x_c * d_c^(-beta - 1)
            let t: Vec<f32> = (0..self.channels)
                .map(|c| g[c] * pixel[c] * denom[c].powf(-cfg.beta - 1.0))
                .collect();
            for i in 0..self.channels {
                let cross: f32 = t[cfg.window(i, self.channels)].iter().sum();
                delta.push(
                    g[i] * denom[i].powf(-cfg.beta) - 2.0 * cfg.alpha * cfg.beta * pixel[i] * cross,
                );
            }
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

/// Local response normalization across the last (channel) axis.
///
/// # Errors
/// `UnsupportedOperation` for a zero window size or a non-positive `k`.
pub fn lrn_op(session: &mut Session, x: &Tensor, config: LrnConfig) -> Result<Tensor, ArchGradError> {
    session.ensure_recording("lrn")?;
    if config.size == 0 || config.k <= 0.0 {
        return Err(ArchGradError::UnsupportedOperation(format!(
            "lrn requires size > 0 and k > 0, got {:?}",
            config
        )));
    }
    let shape = x.shape();
    let channels = shape[shape.len() - 1];
    let values: Vec<f32> = x
        .values_arc()
        .chunks(channels)
        .flat_map(|pixel| {
            let denom = config.denominators(pixel);
            pixel
                .iter()
                .zip(denom)
                .map(|(v, d)| v * d.powf(-config.beta))
                .collect::<Vec<_>>()
        })
        .collect();
    let output = Tensor::new(values, shape)?;
    session.push(
        "lrn",
        LrnBackward {
            input: x.clone(),
            output: output.clone(),
            config,
            channels,
        },
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use approx::assert_relative_eq;

    #[test]
    fn test_lrn_single_channel_value() -> Result<(), ArchGradError> {
        let mut session = Session::new();
        let x = Tensor::new(vec![2.0], vec![1, 1])?;
        let config = LrnConfig {
            size: 1,
            alpha: 0.5,
            beta: 1.0,
            k: 1.0,
        };
        let y = lrn_op(&mut session, &x, config)?;
        // 2 / (1 + 0.5 * 4)
        assert_relative_eq!(y.values()[0], 2.0 / 3.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn test_lrn_rejects_zero_size() -> Result<(), ArchGradError> {
        let mut session = Session::new();
        let x = Tensor::new(vec![1.0; 4], vec![2, 2])?;
        let config = LrnConfig {
            size: 0,
            ..LrnConfig::default()
        };
        assert!(matches!(
            lrn_op(&mut session, &x, config),
            Err(ArchGradError::UnsupportedOperation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_lrn_grad_check() {
        let x = Tensor::new(
            vec![0.5, -1.0, 1.5, 0.2, -0.3, 0.8, 1.1, -0.6, 0.4, 0.9],
            vec![2, 5],
        )
        .unwrap();
        let config = LrnConfig {
            size: 3,
            alpha: 0.3,
            beta: 0.75,
            k: 1.0,
        };
        check_grad(
            |s, inputs| lrn_op(s, &inputs[0], config),
            &[x],
            &[1.0, -0.5, 0.25, 2.0, -1.0, 0.5, 0.5, 1.5, -2.0, 1.0],
            1e-2,
            1e-2,
        )
        .unwrap();
    }
}
