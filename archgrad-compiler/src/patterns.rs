//! The grammar's layer vocabulary.
//!
//! Every token is matched against an ordered table of recognizers; the first
//! one that accepts the whole token wins. A recognized token becomes a
//! [`LayerSpec`], which is turned into a concrete layer once the shapes of its
//! predecessors are known.

use archgrad_core::nn::layers::{
    Activation, Concat, Convolution, Dropout, FullyConnected, Input, Loss, Lrn, Pool, PoolKind,
    Recurrent, Scale, Split,
};
use archgrad_core::nn::{ActivationKind, Layer, LossKind};
use archgrad_core::ops::nn::{Conv2dConfig, LrnConfig};
use archgrad_core::ArchGradError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// A recognized layer token, before its shapes are known.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSpec {
    /// Explicit input declaration; `None` entries come from the placeholder shape.
    Input { dims: Vec<Option<usize>> },
    FullyConnected { units: usize },
    Convolution {
        filters: usize,
        kernel: usize,
        config: Conv2dConfig,
    },
    Pool { kind: PoolKind, size: usize },
    Recurrent { units: usize, summarize: bool },
    Dropout { keep: f32 },
    Scale { factor: f32 },
    Lrn { size: Option<usize> },
    Split,
    Concat,
    Activation(ActivationKind),
    Loss(LossKind),
}

type Recognizer = fn(&str) -> Option<LayerSpec>;

const PATTERNS: &[(&str, Recognizer)] = &[
    ("fully-connected", fully_connected),
    ("convolution", convolution),
    ("pooling", pooling),
    ("recurrent", recurrent),
    ("dropout", dropout),
    ("scale", scale),
    ("lrn", lrn),
    ("keyword", keyword),
    ("input", input),
];

/// Where a layer sits in the assembled graph.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// Output shapes of the predecessors in edge order, or the placeholder
    /// input shape for a source.
    pub input_shapes: &'a [Vec<usize>],
    pub out_degree: usize,
    pub is_source: bool,
}

impl LayerSpec {
    /// Matches `token` against the pattern table, first match wins.
    pub fn parse(token: &str) -> Option<LayerSpec> {
        PATTERNS.iter().find_map(|(name, recognize)| {
            let spec = recognize(token)?;
            log::trace!("pattern {} matched {:?}", name, token);
            Some(spec)
        })
    }

    /// Builds the concrete layer for this spec at `placement`.
    ///
    /// # Errors
    /// Whatever the layer constructor rejects, plus `InternalError` when a
    /// single-input layer is handed several inputs.
    pub fn instantiate(
        &self,
        placement: &Placement<'_>,
        rng: &mut StdRng,
    ) -> Result<Box<dyn Layer>, ArchGradError> {
        let shape: &[usize] = match placement.input_shapes {
            [shape] => shape.as_slice(),
            shapes if !matches!(self, LayerSpec::Concat) => {
                return Err(ArchGradError::InternalError(format!(
                    "{} expects one input shape, got {}",
                    self,
                    shapes.len()
                )))
            }
            // Concat reads every input shape itself.
            _ => &[],
        };
        let layer: Box<dyn Layer> = match self {
            LayerSpec::Input { dims } => {
                let declared = resolve_input_dims(dims, shape)?;
                if !placement.is_source && declared != shape {
                    return Err(ArchGradError::ShapeMismatch {
                        expected: declared,
                        actual: shape.to_vec(),
                        operation: "input declaration".to_string(),
                    });
                }
                Box::new(Input::new(declared)?)
            }
            LayerSpec::FullyConnected { units } => Box::new(FullyConnected::new(shape, *units, rng)?),
            LayerSpec::Convolution {
                filters,
                kernel,
                config,
            } => Box::new(Convolution::new(shape, *filters, *kernel, *config, rng)?),
            LayerSpec::Pool { kind, size } => Box::new(Pool::new(*kind, *size, shape)?),
            LayerSpec::Recurrent { units, summarize } => {
                Box::new(Recurrent::new(shape, *units, *summarize, rng)?)
            }
            LayerSpec::Dropout { keep } => {
                let layer_rng = StdRng::seed_from_u64(rng.gen());
                Box::new(Dropout::new(*keep, shape, layer_rng)?)
            }
            LayerSpec::Scale { factor } => Box::new(Scale::new(*factor, shape)),
            LayerSpec::Lrn { size } => {
                let defaults = LrnConfig::default();
                let config = LrnConfig {
                    size: size.unwrap_or(defaults.size),
                    ..defaults
                };
                Box::new(Lrn::new(config, shape))
            }
            LayerSpec::Split => Box::new(Split::new(placement.out_degree.max(1), shape)),
            LayerSpec::Concat => Box::new(Concat::new(placement.input_shapes)?),
            LayerSpec::Activation(kind) => Box::new(Activation::new(*kind, shape)),
            LayerSpec::Loss(kind) => Box::new(Loss::new(*kind, shape)),
        };
        Ok(layer)
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerSpec::Input { .. } => f.write_str("input"),
            LayerSpec::FullyConnected { units } => write!(f, "{}N", units),
            LayerSpec::Convolution { filters, kernel, .. } => write!(f, "{}C{}x{}", filters, kernel, kernel),
            LayerSpec::Pool { kind, size } => {
                let suffix = match kind {
                    PoolKind::Max => "MP",
                    PoolKind::Average => "AP",
                };
                write!(f, "{}x{}{}", size, size, suffix)
            }
            LayerSpec::Recurrent { units, summarize } => {
                write!(f, "{}R{}", units, if *summarize { "S" } else { "" })
            }
            LayerSpec::Dropout { keep } => write!(f, "D{}", keep),
            LayerSpec::Scale { factor } => write!(f, "S{}", factor),
            LayerSpec::Lrn { .. } => f.write_str("LRN"),
            LayerSpec::Split => f.write_str("SPLIT"),
            LayerSpec::Concat => f.write_str("CONCAT"),
            LayerSpec::Activation(kind) => write!(f, "{}", kind),
            LayerSpec::Loss(kind) => write!(f, "{}", kind),
        }
    }
}

/// Replaces placeholder entries of an input declaration with the matching
/// axis of `placeholder`.
fn resolve_input_dims(dims: &[Option<usize>], placeholder: &[usize]) -> Result<Vec<usize>, ArchGradError> {
    let uses_placeholder = dims.iter().any(Option::is_none);
    if uses_placeholder && dims.len() != placeholder.len() {
        return Err(ArchGradError::ShapeMismatch {
            expected: placeholder.to_vec(),
            actual: dims.iter().map(|d| d.unwrap_or(0)).collect(),
            operation: "input declaration".to_string(),
        });
    }
    Ok(dims
        .iter()
        .zip(placeholder.iter().chain(std::iter::repeat(&0)))
        .map(|(dim, &fallback)| dim.unwrap_or(fallback))
        .collect())
}

/// Left-to-right reader over one token.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(token: &'a str) -> Self {
        Cursor { rest: token }
    }

    fn is_done(&self) -> bool {
        self.rest.is_empty()
    }

    fn eat(&mut self, literal: &str) -> bool {
        match self.rest.strip_prefix(literal) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// A run of decimal digits.
    fn number(&mut self) -> Option<usize> {
        let end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if end == 0 {
            return None;
        }
        let value = self.rest[..end].parse().ok()?;
        self.rest = &self.rest[end..];
        Some(value)
    }

    fn positive(&mut self) -> Option<usize> {
        self.number().filter(|&n| n > 0)
    }

    /// `{K}x{K}` with equal extents.
    fn square(&mut self) -> Option<usize> {
        let rows = self.positive()?;
        if !self.eat("x") {
            return None;
        }
        let cols = self.positive()?;
        (rows == cols).then_some(rows)
    }

    /// `{A}` or `{A}x{B}`.
    fn pair(&mut self) -> Option<(usize, usize)> {
        let first = self.number()?;
        if self.eat("x") {
            Some((first, self.number()?))
        } else {
            Some((first, first))
        }
    }

    /// The rest of the token as a finite float.
    fn float(&mut self) -> Option<f32> {
        let value: f32 = self.rest.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        self.rest = "";
        Some(value)
    }
}

fn fully_connected(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    let units = cursor.positive()?;
    (cursor.eat("N") && cursor.is_done()).then_some(LayerSpec::FullyConnected { units })
}

fn convolution(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    let filters = cursor.positive()?;
    if !cursor.eat("C") {
        return None;
    }
    let kernel = cursor.square()?;
    let mut config = Conv2dConfig::default();
    let (mut has_stride, mut has_padding) = (false, false);
    while cursor.eat("+") {
        let pair = cursor.pair()?;
        if cursor.eat("(S)") && !has_stride && !has_padding && pair.0 > 0 && pair.1 > 0 {
            config.stride = pair;
            has_stride = true;
        } else if cursor.eat("(P)") && !has_padding {
            config.padding = pair;
            has_padding = true;
        } else {
            return None;
        }
    }
    cursor.is_done().then_some(LayerSpec::Convolution {
        filters,
        kernel,
        config,
    })
}

fn pooling(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    let size = cursor.square()?;
    let kind = if cursor.eat("MP") {
        PoolKind::Max
    } else if cursor.eat("AP") {
        PoolKind::Average
    } else {
        return None;
    };
    cursor.is_done().then_some(LayerSpec::Pool { kind, size })
}

fn recurrent(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    let units = cursor.positive()?;
    if !cursor.eat("R") {
        return None;
    }
    let summarize = cursor.eat("S");
    cursor.is_done().then_some(LayerSpec::Recurrent { units, summarize })
}

fn dropout(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    if !cursor.eat("D") {
        return None;
    }
    let keep = cursor.float()?;
    (keep > 0.0 && keep <= 1.0).then_some(LayerSpec::Dropout { keep })
}

fn scale(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    if !cursor.eat("S") {
        return None;
    }
    Some(LayerSpec::Scale {
        factor: cursor.float()?,
    })
}

fn lrn(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    if !cursor.eat("LRN") {
        return None;
    }
    if cursor.is_done() {
        return Some(LayerSpec::Lrn { size: None });
    }
    let size = cursor.positive()?;
    cursor.is_done().then_some(LayerSpec::Lrn { size: Some(size) })
}

fn keyword(token: &str) -> Option<LayerSpec> {
    let spec = match token {
        "SPLIT" => LayerSpec::Split,
        "CONCAT" => LayerSpec::Concat,
        "RELU" => LayerSpec::Activation(ActivationKind::Relu),
        "SIGMOID" => LayerSpec::Activation(ActivationKind::Sigmoid),
        "TANH" => LayerSpec::Activation(ActivationKind::Tanh),
        "SOFTMAX" => LayerSpec::Activation(ActivationKind::Softmax),
        "SM" => LayerSpec::Loss(LossKind::SoftmaxCrossEntropy),
        "L2" => LayerSpec::Loss(LossKind::L2),
        _ => return None,
    };
    Some(spec)
}

fn input(token: &str) -> Option<LayerSpec> {
    let mut cursor = Cursor::new(token);
    let mut dims = Vec::new();
    loop {
        if cursor.eat("-1") {
            dims.push(None);
        } else {
            dims.push(Some(cursor.positive()?));
        }
        if cursor.is_done() {
            return Some(LayerSpec::Input { dims });
        }
        if !cursor.eat("x") {
            return None;
        }
    }
}

#[cfg(test)]
#[path = "patterns_test.rs"]
mod tests;
