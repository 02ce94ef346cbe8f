use super::{CheckValue, Checksum, Kernel};

const KERNEL_SIZE: usize = 5;
const WEIGHTS: [[u32; KERNEL_SIZE]; KERNEL_SIZE] = [
    [1, 1, 1, 1, 1],
    [1, 2, 2, 2, 1],
    [1, 2, 3, 2, 1],
    [1, 2, 2, 2, 1],
    [1, 1, 1, 1, 1],
];
const WEIGHT_SUM: u32 = 35;

#[derive(Debug, Clone, Copy)]
pub struct ImageBlurParams {
    pub width: usize,
    pub height: usize,
}

impl Default for ImageBlurParams {
    fn default() -> Self {
        ImageBlurParams {
            width: 512,
            height: 512,
        }
    }
}

/// 5x5 weighted blur over a grayscale image, the outer loop runs over columns
pub struct ImageBlur {
    params: ImageBlurParams,
}

type Image = Vec<Vec<u8>>;

fn gradient_image(width: usize, height: usize) -> Image {
    let mut image = vec![vec![0u8; width]; height];
    // column by column on purpose
    for x in 0..width {
        for y in 0..height {
            image[y][x] = ((x + y) % 256) as u8;
        }
    }
    image
}

fn blur(input: &Image, output: &mut Image, width: usize, height: usize) {
    let offset = KERNEL_SIZE / 2;
    if width <= 2 * offset || height <= 2 * offset {
        return;
    }
    for x in offset..width - offset {
        for y in offset..height - offset {
            let mut sum = 0u32;
            for kx in 0..KERNEL_SIZE {
                for ky in 0..KERNEL_SIZE {
                    let pixel = input[y + ky - offset][x + kx - offset] as u32;
                    sum += pixel * WEIGHTS[ky][kx];
                }
            }
            output[y][x] = (sum / WEIGHT_SUM) as u8;
        }
    }
}

impl ImageBlur {
    pub fn new(params: ImageBlurParams) -> Self {
        ImageBlur { params }
    }

    pub fn compute(&self) -> Image {
        let ImageBlurParams { width, height } = self.params;
        let input = gradient_image(width, height);
        let mut output = vec![vec![0u8; width]; height];
        blur(&input, &mut output, width, height);
        output
    }
}

impl Kernel for ImageBlur {
    fn name(&self) -> &'static str {
        "image_blur"
    }

    fn description(&self) -> &'static str {
        "5x5 weighted blur, column-major traversal"
    }

    fn run(&self) -> Checksum {
        let output = self.compute();
        let mut checksum = Checksum::new();
        let (width, height) = (self.params.width, self.params.height);
        for probe in [100usize, 200] {
            if probe < width && probe < height {
                checksum = checksum.with(
                    format!("output[{}][{}]", probe, probe),
                    CheckValue::Int(output[probe][probe] as i64),
                );
            }
        }
        checksum
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_weights_sum() {
        let total: u32 = WEIGHTS.iter().flatten().sum();
        assert_eq!(total, WEIGHT_SUM);
    }

    #[test]
    fn test_gradient_checksum() {
        // the weights are symmetric so a linear gradient blurs to itself,
        // as long as the 5x5 window doesn't cross a wrap at 256
        let checksum = ImageBlur::new(ImageBlurParams::default()).run();
        assert_eq!(
            checksum.to_string(),
            "Result checksum: output[100][100] = 200, output[200][200] = 144"
        );
    }

    #[test]
    fn test_border_untouched() {
        let output = ImageBlur::new(ImageBlurParams {
            width: 16,
            height: 8,
        })
        .compute();
        assert_eq!(output[0][0], 0);
        assert_eq!(output[7][15], 0);
        assert_eq!(output[4][6], 10);
        assert!(ImageBlur::new(ImageBlurParams { width: 3, height: 3 })
            .run()
            .values
            .is_empty());
    }
}
