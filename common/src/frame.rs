use image::{GrayImage, Luma, RgbImage};

/// Grayscale difference between two same-sized RGB frames.
///
/// The intensity at each coordinate is the integer average of the
/// per-channel absolute differences: `(|Δr| + |Δg| + |Δb|) / 3`, with the
/// channel diffs summed as integers and then floor-divided. Each channel
/// diff is bounded by 255, so the average stays within 0..=255.
///
/// The operation is commutative and never mutates its inputs. Frames with
/// different geometry are an input-consistency error and abort the run.
pub fn difference_image(prev: &RgbImage, curr: &RgbImage) -> Result<GrayImage, FrameError> {
    if prev.dimensions() != curr.dimensions() {
        let (prev_w, prev_h) = prev.dimensions();
        let (curr_w, curr_h) = curr.dimensions();
        return Err(FrameError::DimensionMismatch {
            prev_w,
            prev_h,
            curr_w,
            curr_h,
        });
    }

    let (width, height) = prev.dimensions();
    let mut out = GrayImage::new(width, height);
    for (out_px, (a, b)) in out.pixels_mut().zip(prev.pixels().zip(curr.pixels())) {
        let sum = a[0].abs_diff(b[0]) as u16
            + a[1].abs_diff(b[1]) as u16
            + a[2].abs_diff(b[2]) as u16;
        *out_px = Luma([(sum / 3) as u8]);
    }
    Ok(out)
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame dimensions mismatch: {prev_w}x{prev_h} vs {curr_w}x{curr_h}")]
    DimensionMismatch {
        prev_w: u32,
        prev_h: u32,
        curr_w: u32,
        curr_h: u32,
    },
}
