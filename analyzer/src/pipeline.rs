use image::{GrayImage, RgbImage};
use tracing::{debug, info, warn};

use frame_entropy_common::frame::{difference_image, FrameError};

use crate::entropy::{gray_histogram, shannon_entropy};
use crate::sink::SinkError;
use crate::source::SourceError;

/// Ordered, forward-only supplier of decoded frames. Returns `None` once
/// the sequence is exhausted; it cannot be restarted.
pub trait FrameSource {
    async fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError>;
}

/// Consumer of difference images, in the exact order they are produced.
///
/// `finish` must run for the output to be valid; `abort` discards it.
pub trait FrameSink {
    async fn push_frame(&mut self, frame: &GrayImage) -> Result<(), SinkError>;
    async fn finish(self) -> Result<(), SinkError>;
    async fn abort(self);
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Sequential single-pass scan over consecutive frame pairs.
///
/// For pair k (frame k, frame k+1) the entropy value lands at series
/// index k and the difference image at sink position k, strictly in
/// order. The sink is disposed of on every exit path: finished on normal
/// exhaustion (even with zero pairs) and on frame-read failure, so the
/// encoded prefix stays playable; aborted on a dimension mismatch, where
/// a partial output would be misleading.
pub async fn run<S, K>(source: &mut S, mut sink: Option<K>) -> Result<Vec<f64>, AnalysisError>
where
    S: FrameSource,
    K: FrameSink,
{
    match scan(source, &mut sink).await {
        Ok(series) => {
            if let Some(sink) = sink.take() {
                sink.finish().await?;
            }
            Ok(series)
        }
        Err(err) => {
            if let Some(sink) = sink.take() {
                if matches!(err, AnalysisError::Frame(_)) {
                    sink.abort().await;
                } else if let Err(e) = sink.finish().await {
                    warn!(error = %e, "failed to finalize difference video after pipeline error");
                }
            }
            Err(err)
        }
    }
}

async fn scan<S, K>(source: &mut S, sink: &mut Option<K>) -> Result<Vec<f64>, AnalysisError>
where
    S: FrameSource,
    K: FrameSink,
{
    let mut series = Vec::new();

    let Some(mut previous) = source.next_frame().await? else {
        info!("input contained no frames");
        return Ok(series);
    };

    let mut pairs: u64 = 0;
    while let Some(current) = source.next_frame().await? {
        let diff = difference_image(&previous, &current)?;
        let histogram = gray_histogram(&diff);
        series.push(shannon_entropy(&histogram));

        if let Some(sink) = sink.as_mut() {
            sink.push_frame(&diff).await?;
        }

        previous = current;
        pairs += 1;
        if pairs % 100 == 0 {
            debug!(pairs, "frame pairs processed");
        }
    }

    Ok(series)
}
