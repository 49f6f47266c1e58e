use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::init::kaiming_normal;
use crate::nn::layer::{check_arity, check_batch_shape, Layer, LayerKind};
use crate::nn::Parameter;
use crate::ops::nn::Conv2dConfig;
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Square-kernel 2-D convolution over `[height, width, channels]` samples.
#[derive(Debug)]
pub struct Convolution {
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
    config: Conv2dConfig,
    kernel: Parameter,
    bias: Parameter,
}

impl Convolution {
    /// # Errors
    /// `RankTooLow` unless the input is rank 3, `ShapeMismatch` if the padded
    /// input is smaller than the kernel.
    pub fn new<R: Rng + ?Sized>(
        input_shape: &[usize],
        filters: usize,
        kernel_size: usize,
        config: Conv2dConfig,
        rng: &mut R,
    ) -> Result<Self, ArchGradError> {
        if input_shape.len() != 3 {
            return Err(ArchGradError::RankTooLow {
                shape: input_shape.to_vec(),
                operation: "convolution expects [height, width, channels]".to_string(),
            });
        }
        let (height, width, channels) = (input_shape[0], input_shape[1], input_shape[2]);
        let out_h = Conv2dConfig::output_extent(height, kernel_size, config.stride.0, config.padding.0);
        let out_w = Conv2dConfig::output_extent(width, kernel_size, config.stride.1, config.padding.1);
        let (out_h, out_w) = match (out_h, out_w) {
            (Some(h), Some(w)) => (h, w),
            _ => {
                return Err(ArchGradError::ShapeMismatch {
                    expected: vec![kernel_size, kernel_size],
                    actual: vec![height, width],
                    operation: "convolution".to_string(),
                })
            }
        };
        let kernel_shape = [kernel_size, kernel_size, channels, filters];
        let kernel = kaiming_normal(&kernel_shape, kernel_size * kernel_size * channels, rng)?;
        Ok(Convolution {
            input_shape: input_shape.to_vec(),
            output_shape: vec![out_h, out_w, filters],
            config,
            kernel: Parameter::new(kernel, "conv.kernel"),
            bias: Parameter::new(tensor::zeros(&[filters])?, "conv.bias"),
        })
    }

    pub fn kernel(&self) -> &Parameter {
        &self.kernel
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }
}

impl Layer for Convolution {
    fn kind(&self) -> LayerKind {
        LayerKind::Convolution
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "convolution")?;
        check_batch_shape(&inputs[0], &self.input_shape, "convolution")?;
        Ok(vec![session.conv2d(&inputs[0], &self.kernel, &self.bias, self.config)?])
    }

    fn output_shape(&self) -> &[usize] {
        &self.output_shape
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.kernel, &self.bias]
    }

    fn needs_activation(&self) -> bool {
        true
    }

    fn init_bias(&self, value: f32) {
        self.bias.fill(value);
    }

    fn architecture(&self) -> String {
        let shape = self.kernel.shape();
        let mut token = format!("{}C{}x{}", shape[3], shape[0], shape[1]);
        let Conv2dConfig { stride, padding } = self.config;
        if stride != (1, 1) {
            token.push_str(&format!("+{}x{}(S)", stride.0, stride.1));
        }
        if padding != (0, 0) {
            token.push_str(&format!("+{}x{}(P)", padding.0, padding.1));
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_convolution_output_shape() -> Result<(), ArchGradError> {
        let mut rng = StdRng::seed_from_u64(1);
        let valid = Convolution::new(&[28, 28, 1], 5, 3, Conv2dConfig::default(), &mut rng)?;
        assert_eq!(valid.output_shape(), &[26, 26, 5]);
        assert_eq!(valid.architecture(), "5C3x3");

        let config = Conv2dConfig {
            stride: (2, 2),
            padding: (1, 1),
        };
        let strided = Convolution::new(&[8, 8, 3], 4, 3, config, &mut rng)?;
        assert_eq!(strided.output_shape(), &[4, 4, 4]);
        assert_eq!(strided.architecture(), "4C3x3+2x2(S)+1x1(P)");
        assert_eq!(strided.kernel().shape(), vec![3, 3, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_convolution_rejects_bad_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            Convolution::new(&[10], 2, 3, Conv2dConfig::default(), &mut rng),
            Err(ArchGradError::RankTooLow { .. })
        ));
        assert!(matches!(
            Convolution::new(&[2, 2, 1], 2, 3, Conv2dConfig::default(), &mut rng),
            Err(ArchGradError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_convolution_forward_batch() -> Result<(), ArchGradError> {
        let layer = Convolution::new(&[4, 4, 2], 3, 3, Conv2dConfig::default(), &mut StdRng::seed_from_u64(9))?;
        let mut session = Session::new();
        let x = Tensor::new(vec![0.1; 2 * 4 * 4 * 2], vec![2, 4, 4, 2])?;
        let y = layer.forward(&mut session, &[x])?;
        assert_eq!(y[0].shape(), vec![2, 2, 2, 3]);
        Ok(())
    }
}
