use std::path::{Path, PathBuf};
use std::process::Stdio;

use image::RgbImage;
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::{debug, info};

use crate::pipeline::FrameSource;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("input video not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to probe input video: {0}")]
    Probe(String),
    #[error("failed to spawn ffmpeg decoder: {0}")]
    Spawn(String),
    #[error("failed to decode frames: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: u32,
    height: u32,
}

/// Decoded-frame source backed by an ffmpeg child process.
///
/// ffprobe reports the stream geometry first, then ffmpeg writes raw
/// RGB24 frames to a pipe and `next_frame` reads exactly one frame per
/// call. The sequence is finite, forward-only and non-restartable; it
/// ends at a clean EOF on a frame boundary. EOF mid-frame, or ffmpeg
/// exiting non-zero, surfaces as a decode error.
#[derive(Debug)]
pub struct VideoFrameSource {
    child: Child,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
    width: u32,
    height: u32,
    frames_read: u64,
}

impl VideoFrameSource {
    pub async fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }

        let (width, height) = probe_dimensions(path).await?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| SourceError::Spawn(e.to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::Spawn("could not get stdout handle".into()))?;
        let stderr = child.stderr.take();

        info!(width, height, input = %path.display(), "ffmpeg decoder started");

        Ok(Self {
            child,
            stdout,
            stderr,
            width,
            height,
            frames_read: 0,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fill `buf` from the decoder pipe; a short count means EOF.
    async fn read_frame_bytes(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.stdout.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Collect ffmpeg's stderr and exit status once the pipe is drained.
    async fn finish_child(&mut self) -> Result<(), SourceError> {
        let mut stderr_text = String::new();
        if let Some(mut stderr) = self.stderr.take() {
            let _ = stderr.read_to_string(&mut stderr_text).await;
        }
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        if !status.success() {
            return Err(SourceError::Decode(format!(
                "ffmpeg exited with {status}: {}",
                stderr_text.trim()
            )));
        }
        Ok(())
    }
}

impl FrameSource for VideoFrameSource {
    async fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        let frame_len = self.width as usize * self.height as usize * 3;
        let mut buf = vec![0u8; frame_len];

        let filled = self
            .read_frame_bytes(&mut buf)
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        if filled == 0 {
            self.finish_child().await?;
            debug!(frames = self.frames_read, "decoder stream ended");
            return Ok(None);
        }
        if filled < frame_len {
            return Err(SourceError::Decode(format!(
                "truncated frame after {} frames: got {filled} of {frame_len} bytes",
                self.frames_read
            )));
        }

        self.frames_read += 1;
        let frame = RgbImage::from_raw(self.width, self.height, buf)
            .ok_or_else(|| SourceError::Decode("frame buffer size mismatch".into()))?;
        Ok(Some(frame))
    }
}

/// Ask ffprobe for the geometry of the first video stream.
async fn probe_dimensions(path: &Path) -> Result<(u32, u32), SourceError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| SourceError::Probe(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SourceError::Probe(stderr.trim().to_string()));
    }

    let probe: ProbeOutput = serde_json::from_slice(&output.stdout)
        .map_err(|e| SourceError::Probe(format!("unexpected ffprobe output: {e}")))?;
    let stream = probe
        .streams
        .first()
        .ok_or_else(|| SourceError::Probe("no video stream in input".into()))?;
    Ok((stream.width, stream.height))
}
