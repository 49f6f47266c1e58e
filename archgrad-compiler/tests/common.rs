use archgrad_core::tensor::{self, Tensor};
use archgrad_compiler::CompileOptions;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Reproducible options for a per-sample input of `shape`.
#[allow(dead_code)]
pub fn options_for(shape: &[usize]) -> CompileOptions {
    CompileOptions::default().with_seed(5).with_input_shape(shape.to_vec())
}

/// Uniform random batch `[rows, shape...]` in `[-1, 1)`.
#[allow(dead_code)]
pub fn random_batch(rows: usize, shape: &[usize], rng: &mut StdRng) -> Tensor {
    let mut full = vec![rows];
    full.extend_from_slice(shape);
    tensor::uniform(&full, -1.0, 1.0, rng).expect("Test tensor creation failed")
}
