//! # Description
//! - the benchmark kernels that run inside the simulator
//! - every kernel is deliberately naive, the poor locality is the point of the lab
//! - the only contract is a deterministic checksum: same seed, same checksum, on every build
//!
//! # Kernels
//! - matrix_mult: dense multiply walking B column-wise
//! - image_blur: 5x5 weighted blur walking the image column by column
//! - hash_ops: open addressing hash table insert/lookup/remove with random keys
//! - stream: copy/scale/add/triad over large arrays
//! - branch: data dependent branch over random data
//! - tlb_stress: one access per page over a large array

use std::fmt;

use crate::error::LabError;

mod branch;
mod hash_ops;
mod image_blur;
mod matrix_mult;
mod stream;
mod tlb_stress;

pub use branch::{Branch, BranchParams};
pub use hash_ops::{HashOps, HashOpsParams, HashTable};
pub use image_blur::{ImageBlur, ImageBlurParams};
pub use matrix_mult::{MatrixMult, MatrixMultParams};
pub use stream::{Stream, StreamParams};
pub use tlb_stress::{TlbStress, TlbStressParams};

/// the seed used when none is given, the lab's original fixed seed
pub const DEFAULT_SEED: u64 = 42;

pub const NAMES: &[&str] = &[
    "matrix_mult",
    "image_blur",
    "hash_ops",
    "stream",
    "branch",
    "tlb_stress",
];

pub trait Kernel {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&self) -> Checksum;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckValue {
    Int(i64),
    Float(f64),
}

impl fmt::Display for CheckValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckValue::Int(v) => write!(f, "{}", v),
            CheckValue::Float(v) => write!(f, "{:.6}", v),
        }
    }
}

/// the named sample values a kernel reports, printed as
/// `Result checksum: C[0][0] = 1234.560000, C[100][100] = 1187.230000`
#[derive(Debug, Clone, PartialEq)]
pub struct Checksum {
    pub values: Vec<(String, CheckValue)>,
}

impl Checksum {
    pub fn new() -> Self {
        Checksum { values: Vec::new() }
    }

    pub fn with(mut self, name: impl Into<String>, value: CheckValue) -> Self {
        self.values.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<CheckValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Result checksum: ")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} = {}", name, value)?;
        }
        Ok(())
    }
}

/// # Description
/// build a kernel with its lab default workload
/// # Arguments
/// * `name` - one of [`NAMES`]
/// * `seed` - the seed for kernels with random data, ignored by the others
pub fn by_name(name: &str, seed: u64) -> Result<Box<dyn Kernel>, LabError> {
    let kernel: Box<dyn Kernel> = match name {
        "matrix_mult" => Box::new(MatrixMult::new(MatrixMultParams {
            seed,
            ..Default::default()
        })),
        "image_blur" => Box::new(ImageBlur::new(ImageBlurParams::default())),
        "hash_ops" => Box::new(HashOps::new(HashOpsParams {
            seed,
            ..Default::default()
        })),
        "stream" => Box::new(Stream::new(StreamParams::default())),
        "branch" => Box::new(Branch::new(BranchParams {
            seed,
            ..Default::default()
        })),
        "tlb_stress" => Box::new(TlbStress::new(TlbStressParams::default())),
        other => {
            return Err(LabError::UnknownKernel(
                other.to_string(),
                NAMES.join(", "),
            ))
        }
    };
    Ok(kernel)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registry() {
        for name in NAMES {
            let kernel = by_name(name, DEFAULT_SEED).unwrap();
            assert_eq!(kernel.name(), *name);
            assert!(!kernel.description().is_empty());
        }
        let err = by_name("quicksort", DEFAULT_SEED).err().unwrap();
        assert!(err.to_string().contains("matrix_mult"));
    }

    #[test]
    fn test_checksum_display() {
        let checksum = Checksum::new()
            .with("C[0][0]", CheckValue::Float(1.5))
            .with("sum", CheckValue::Int(-3));
        assert_eq!(
            checksum.to_string(),
            "Result checksum: C[0][0] = 1.500000, sum = -3"
        );
        assert_eq!(checksum.get("sum"), Some(CheckValue::Int(-3)));
        assert_eq!(checksum.get("nope"), None);
    }
}
