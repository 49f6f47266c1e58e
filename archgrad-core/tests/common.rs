use archgrad_core::tensor::{self, Tensor};
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

/// Uniform random tensor in `[-1, 1)`.
#[allow(dead_code)]
pub fn random_tensor(shape: &[usize], rng: &mut StdRng) -> Tensor {
    tensor::uniform(shape, -1.0, 1.0, rng).expect("Test tensor creation failed")
}

/// Uniform random values, one per element of `shape`.
#[allow(dead_code)]
pub fn random_values(shape: &[usize], rng: &mut StdRng) -> Vec<f32> {
    random_tensor(shape, rng).values()
}
