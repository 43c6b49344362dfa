use std::path::{Path, PathBuf};
use std::process::Stdio;

use image::GrayImage;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, error, info, warn};

use frame_entropy_common::config::EncodingConfig;

use crate::pipeline::FrameSink;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to spawn ffmpeg: {0}")]
    Spawn(String),
    #[error("failed to write frame to ffmpeg stdin: {0}")]
    Write(String),
    #[error("failed to wait for ffmpeg: {0}")]
    Wait(String),
    #[error("ffmpeg exited with non-zero status: {0}")]
    FfmpegFailed(String),
}

/// Encodes raw grayscale frames into an MP4 via an ffmpeg subprocess.
///
/// Frames are piped to stdin in presentation order at the configured
/// fixed rate. `finish` must run for the file to be playable; `abort`
/// kills the encoder and removes the partial output.
pub struct DiffVideoSink {
    child: Child,
    stdin: ChildStdin,
    output_path: PathBuf,
    width: u32,
    height: u32,
    frame_count: u64,
}

impl DiffVideoSink {
    pub async fn start(
        output_path: &Path,
        width: u32,
        height: u32,
        encoding: &EncodingConfig,
    ) -> Result<Self, SinkError> {
        let vcodec = match encoding.codec.as_str() {
            "h265" => "libx265",
            _ => "libx264",
        };

        let size = format!("{width}x{height}");
        let fps_str = encoding.fps.to_string();
        let crf_str = encoding.crf.to_string();

        let mut cmd = Command::new("ffmpeg");
        cmd.args([
            "-f", "rawvideo",
            "-pix_fmt", "gray",
            "-s", &size,
            "-r", &fps_str,
            "-i", "pipe:0",
            "-c:v", vcodec,
            "-preset", &encoding.preset,
            "-crf", &crf_str,
            "-pix_fmt", "yuv420p",
            "-movflags", "+faststart",
            "-y",
        ])
        .arg(output_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| SinkError::Spawn(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SinkError::Spawn("could not get stdin handle".into()))?;

        debug!(
            codec = vcodec,
            crf = encoding.crf,
            preset = encoding.preset,
            fps = encoding.fps,
            output = %output_path.display(),
            "ffmpeg encoder started"
        );

        Ok(Self {
            child,
            stdin,
            output_path: output_path.to_path_buf(),
            width,
            height,
            frame_count: 0,
        })
    }
}

impl FrameSink for DiffVideoSink {
    async fn push_frame(&mut self, frame: &GrayImage) -> Result<(), SinkError> {
        // The pipeline only forwards difference images of the probed
        // geometry; anything else would corrupt the rawvideo stream.
        debug_assert_eq!(frame.dimensions(), (self.width, self.height));

        self.stdin
            .write_all(frame.as_raw())
            .await
            .map_err(|e| SinkError::Write(e.to_string()))?;
        self.frame_count += 1;
        debug!(frame_count = self.frame_count, "pushed difference frame to encoder");
        Ok(())
    }

    /// Close stdin and wait for ffmpeg to finalize the container.
    async fn finish(self) -> Result<(), SinkError> {
        drop(self.stdin);

        let output = self
            .child
            .wait_with_output()
            .await
            .map_err(|e| SinkError::Wait(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(stderr = %stderr, "ffmpeg exited with error");
            let _ = tokio::fs::remove_file(&self.output_path).await;
            return Err(SinkError::FfmpegFailed(stderr.into_owned()));
        }

        info!(
            frames = self.frame_count,
            output = %self.output_path.display(),
            "difference video finalized"
        );
        Ok(())
    }

    /// Kill the encoder and remove the partial output file.
    async fn abort(mut self) {
        drop(self.stdin);
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill ffmpeg encoder");
        }
        if let Err(e) = tokio::fs::remove_file(&self.output_path).await {
            warn!(
                path = %self.output_path.display(),
                error = %e,
                "failed to remove partial difference video"
            );
        }
        info!(frames = self.frame_count, "difference video discarded");
    }
}

/// Check whether ffmpeg and ffprobe are available on PATH. Logs a warning
/// if not found.
pub async fn check_ffmpeg_available() {
    for tool in ["ffmpeg", "ffprobe"] {
        match Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) if status.success() => {
                debug!(tool, "available");
            }
            Ok(_) => {
                warn!(tool, "returned non-zero for -version; analysis may fail");
            }
            Err(e) => {
                warn!(tool, error = %e, "not found on PATH; analysis will fail");
            }
        }
    }
}
