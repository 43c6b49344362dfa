use image::{DynamicImage, GrayImage};

/// Number of intensity bins — one per 8-bit grayscale level.
pub const NUM_BINS: usize = 256;

/// Pixel counts per intensity level. The sum of all bins equals the
/// pixel count of the image the histogram was built from.
pub type Histogram = [u64; NUM_BINS];

/// Build the intensity histogram of an 8-bit grayscale image.
pub fn gray_histogram(image: &GrayImage) -> Histogram {
    let mut bins = [0u64; NUM_BINS];
    for pixel in image.pixels() {
        bins[pixel.0[0] as usize] += 1;
    }
    bins
}

/// Build the intensity histogram of an arbitrary image, reducing it to
/// 8-bit grayscale first. The reduction is a no-op for images that are
/// already single-channel luma, so difference images can pass through
/// unchanged.
#[allow(dead_code)]
pub fn build_histogram(image: &DynamicImage) -> Histogram {
    gray_histogram(&image.to_luma8())
}

/// Shannon entropy (natural log) of an intensity histogram.
///
/// Sums `(c/total) * ln(total/c)` over the populated bins; bins with a
/// zero count are skipped so `ln(0)` is never evaluated. The result is
/// not normalized — a uniform 256-bin distribution yields `ln(256)`.
/// An all-zero histogram yields 0.
pub fn shannon_entropy(histogram: &Histogram) -> f64 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let mut entropy = 0.0;
    for &count in histogram.iter() {
        if count > 0 {
            let count = count as f64;
            entropy += (count / total) * (total / count).ln();
        }
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn histogram_counts_every_pixel() {
        let mut image = GrayImage::new(16, 9);
        for (i, px) in image.pixels_mut().enumerate() {
            *px = Luma([(i % 256) as u8]);
        }
        let histogram = gray_histogram(&image);
        assert_eq!(histogram.iter().sum::<u64>(), 16 * 9);
    }

    #[test]
    fn histogram_bins_match_intensities() {
        let mut image = GrayImage::new(2, 2);
        image.put_pixel(0, 0, Luma([0]));
        image.put_pixel(1, 0, Luma([0]));
        image.put_pixel(0, 1, Luma([255]));
        image.put_pixel(1, 1, Luma([7]));
        let histogram = gray_histogram(&image);
        assert_eq!(histogram[0], 2);
        assert_eq!(histogram[7], 1);
        assert_eq!(histogram[255], 1);
    }

    #[test]
    fn color_input_is_reduced_before_binning() {
        let image = RgbImage::from_pixel(8, 8, Rgb([200, 30, 90]));
        let histogram = build_histogram(&DynamicImage::ImageRgb8(image));
        assert_eq!(histogram.iter().sum::<u64>(), 64);
        // A constant-color image reduces to a single populated bin.
        assert_eq!(histogram.iter().filter(|&&c| c > 0).count(), 1);
    }

    #[test]
    fn single_bin_has_zero_entropy() {
        let mut histogram = [0u64; NUM_BINS];
        histogram[42] = 10_000;
        assert_eq!(shannon_entropy(&histogram), 0.0);
    }

    #[test]
    fn uniform_distribution_has_maximum_entropy() {
        let histogram = [4u64; NUM_BINS];
        let entropy = shannon_entropy(&histogram);
        assert!((entropy - (NUM_BINS as f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn two_equal_bins_yield_ln_two() {
        let mut histogram = [0u64; NUM_BINS];
        histogram[0] = 50;
        histogram[255] = 50;
        let entropy = shannon_entropy(&histogram);
        assert!((entropy - 2.0f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn empty_histogram_yields_zero() {
        let histogram = [0u64; NUM_BINS];
        assert_eq!(shannon_entropy(&histogram), 0.0);
    }
}
