use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{CheckValue, Checksum, Kernel};

#[derive(Debug, Clone, Copy)]
pub struct BranchParams {
    pub len: usize,
    pub seed: u64,
}

impl Default for BranchParams {
    fn default() -> Self {
        BranchParams {
            len: 100_000,
            seed: super::DEFAULT_SEED,
        }
    }
}

/// sums the even values of random data, the branch is taken about half the time at random
pub struct Branch {
    params: BranchParams,
}

fn sum_even(data: &[i32]) -> i64 {
    let mut sum = 0i64;
    for v in data {
        if v % 2 == 0 {
            sum += *v as i64;
        }
    }
    sum
}

impl Branch {
    pub fn new(params: BranchParams) -> Self {
        Branch { params }
    }
}

impl Kernel for Branch {
    fn name(&self) -> &'static str {
        "branch"
    }

    fn description(&self) -> &'static str {
        "unpredictable data dependent branch over random values"
    }

    fn run(&self) -> Checksum {
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        let data: Vec<i32> = (0..self.params.len).map(|_| rng.gen_range(0..100)).collect();
        Checksum::new().with("sum", CheckValue::Int(sum_even(&data)))
    }
}
