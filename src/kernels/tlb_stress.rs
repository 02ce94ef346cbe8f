use super::{CheckValue, Checksum, Kernel};

#[derive(Debug, Clone, Copy)]
pub struct TlbStressParams {
    /// distance between two accesses in elements, 1024 i32 = one 4 KiB page
    pub stride: usize,
    pub accesses: usize,
    pub block: usize,
}

impl Default for TlbStressParams {
    fn default() -> Self {
        TlbStressParams {
            stride: 1024,
            accesses: 10_000,
            block: 64,
        }
    }
}

/// touches one element per page, in blocks, so every access needs a new translation
pub struct TlbStress {
    params: TlbStressParams,
}

impl TlbStress {
    pub fn new(params: TlbStressParams) -> Self {
        TlbStress { params }
    }
}

impl Kernel for TlbStress {
    fn name(&self) -> &'static str {
        "tlb_stress"
    }

    fn description(&self) -> &'static str {
        "page-stride walk over a large array"
    }

    fn run(&self) -> Checksum {
        let TlbStressParams {
            stride,
            accesses,
            block,
        } = self.params;
        let data: Vec<i32> = (0..stride * accesses).map(|i| i as i32).collect();
        let block = block.max(1);

        let mut sum = 0i64;
        for start in (0..accesses).step_by(block) {
            for i in start..(start + block).min(accesses) {
                sum += data[i * stride] as i64;
            }
        }
        Checksum::new().with("sum", CheckValue::Int(sum))
    }
}
