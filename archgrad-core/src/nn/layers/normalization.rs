use crate::autograd::Session;
use crate::error::ArchGradError;
use crate::nn::layer::{check_arity, Layer, LayerKind};
use crate::nn::layers::format_number;
use crate::ops::nn::LrnConfig;
use crate::tensor::Tensor;

/// Multiplies its input by a constant.
#[derive(Debug)]
pub struct Scale {
    factor: f32,
    shape: Vec<usize>,
}

impl Scale {
    pub fn new(factor: f32, shape: &[usize]) -> Self {
        Scale {
            factor,
            shape: shape.to_vec(),
        }
    }
}

impl Layer for Scale {
    fn kind(&self) -> LayerKind {
        LayerKind::Scale
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "scale")?;
        Ok(vec![session.scale(&inputs[0], self.factor)?])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        format!("S{}", format_number(self.factor))
    }
}

/// Local response normalization across the channel (last) axis.
#[derive(Debug)]
pub struct Lrn {
    config: LrnConfig,
    shape: Vec<usize>,
}

impl Lrn {
    pub fn new(config: LrnConfig, shape: &[usize]) -> Self {
        Lrn {
            config,
            shape: shape.to_vec(),
        }
    }
}

impl Layer for Lrn {
    fn kind(&self) -> LayerKind {
        LayerKind::Lrn
    }

    fn forward(&self, session: &mut Session, inputs: &[Tensor]) -> Result<Vec<Tensor>, ArchGradError> {
        check_arity(inputs, 1, "lrn")?;
        Ok(vec![session.lrn(&inputs[0], self.config)?])
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn architecture(&self) -> String {
        if self.config.size == LrnConfig::default().size {
            "LRN".to_string()
        } else {
            format!("LRN{}", self.config.size)
        }
    }
}
