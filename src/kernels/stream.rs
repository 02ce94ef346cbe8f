use super::{CheckValue, Checksum, Kernel};

const SCALE: f64 = 2.5;
const TRIAD_SCALAR: f64 = 1.5;

#[derive(Debug, Clone, Copy)]
pub struct StreamParams {
    pub len: usize,
    pub repeat: usize,
}

impl Default for StreamParams {
    fn default() -> Self {
        StreamParams {
            len: 1024 * 1024,
            repeat: 10,
        }
    }
}

/// the four STREAM loops, repeated, over arrays far larger than any cache
pub struct Stream {
    params: StreamParams,
}

fn copy(src: &[f64], dst: &mut [f64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = *s;
    }
}

fn scale(src: &[f64], dst: &mut [f64], scalar: f64) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = scalar * *s;
    }
}

fn add(a: &[f64], b: &[f64], dst: &mut [f64]) {
    for ((d, x), y) in dst.iter_mut().zip(a).zip(b) {
        *d = *x + *y;
    }
}

fn triad(dst: &mut [f64], b: &[f64], c: &[f64], scalar: f64) {
    for ((d, x), y) in dst.iter_mut().zip(b).zip(c) {
        *d = *x + scalar * *y;
    }
}

impl Stream {
    pub fn new(params: StreamParams) -> Self {
        Stream { params }
    }

    /// bytes moved by one run, 10 array sweeps per repetition
    pub fn bytes_moved(&self) -> u64 {
        (self.params.len * std::mem::size_of::<f64>() * 10 * self.params.repeat) as u64
    }
}

impl Kernel for Stream {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn description(&self) -> &'static str {
        "STREAM copy/scale/add/triad memory bandwidth loops"
    }

    fn run(&self) -> Checksum {
        let n = self.params.len;
        let mut a = vec![1.0; n];
        let mut b = vec![2.0; n];
        let mut c = vec![0.0; n];
        for _ in 0..self.params.repeat {
            copy(&a, &mut c);
            scale(&c, &mut b, SCALE);
            add(&a, &b, &mut c);
            triad(&mut a, &b, &c, TRIAD_SCALAR);
        }
        match (a.get(100), b.get(100)) {
            (Some(a), Some(b)) => Checksum::new()
                .with("a[100]", CheckValue::Float(*a))
                .with("b[100]", CheckValue::Float(*b)),
            _ => Checksum::new(),
        }
    }
}
