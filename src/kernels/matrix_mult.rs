use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{CheckValue, Checksum, Kernel};

#[derive(Debug, Clone, Copy)]
pub struct MatrixMultParams {
    pub n: usize,
    pub seed: u64,
}

impl Default for MatrixMultParams {
    fn default() -> Self {
        MatrixMultParams {
            n: 256,
            seed: super::DEFAULT_SEED,
        }
    }
}

/// C = A * B with the textbook i-j-k loop order, B is walked down its columns
pub struct MatrixMult {
    params: MatrixMultParams,
}

/// every row is its own allocation, like a `double **` matrix
type Matrix = Vec<Vec<f64>>;

fn random_matrix(n: usize, rng: &mut ChaCha8Rng) -> Matrix {
    (0..n)
        .map(|_| (0..n).map(|_| rng.gen_range(0..100) as f64 / 10.0).collect())
        .collect()
}

fn multiply(a: &Matrix, b: &Matrix, c: &mut Matrix) {
    let n = a.len();
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                c[i][j] += a[i][k] * b[k][j];
            }
        }
    }
}

impl MatrixMult {
    pub fn new(params: MatrixMultParams) -> Self {
        MatrixMult { params }
    }

    /// the full result matrix
    pub fn compute(&self) -> Matrix {
        let n = self.params.n;
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        let a = random_matrix(n, &mut rng);
        let b = random_matrix(n, &mut rng);
        let mut c = vec![vec![0.0; n]; n];
        multiply(&a, &b, &mut c);
        c
    }
}

impl Kernel for MatrixMult {
    fn name(&self) -> &'static str {
        "matrix_mult"
    }

    fn description(&self) -> &'static str {
        "naive dense matrix multiply, B accessed column-wise"
    }

    fn run(&self) -> Checksum {
        let c = self.compute();
        let mut checksum = Checksum::new();
        if c.is_empty() {
            return checksum;
        }
        let probe = 100.min(c.len() - 1);
        checksum = checksum
            .with("C[0][0]", CheckValue::Float(c[0][0]))
            .with(format!("C[{}][{}]", probe, probe), CheckValue::Float(c[probe][probe]));
        checksum
    }
}
