mod entropy;
mod pipeline;
mod report;
mod sink;
mod source;
mod stats;

use std::path::PathBuf;

use frame_entropy_common::config::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    let input_path = config.analysis.input_path();
    info!(
        input = %input_path.display(),
        difference_video = config.analysis.difference_video,
        fps = config.encoding.fps,
        codec = config.encoding.codec,
        "starting frame-entropy analyzer"
    );

    // Check ffmpeg availability (decoding and encoding will fail without it).
    sink::check_ffmpeg_available().await;

    let mut source = match source::VideoFrameSource::open(&input_path).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to open input video");
            std::process::exit(1);
        }
    };

    let sink = if config.analysis.difference_video {
        let (width, height) = source.dimensions();
        let diff_path = config.analysis.diff_video_path();
        match sink::DiffVideoSink::start(&diff_path, width, height, &config.encoding).await {
            Ok(k) => Some(k),
            Err(e) => {
                error!(error = %e, "failed to start difference video encoder");
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    info!("begin entropy calculation");
    let series = match pipeline::run(&mut source, sink).await {
        Ok(series) => series,
        Err(e) => {
            error!(error = %e, "analysis aborted");
            std::process::exit(1);
        }
    };
    info!(pairs = series.len(), "entropy calculation complete");

    // Persistence failures stay isolated: the summary still prints from
    // the in-memory series.
    let entropy_path = config.analysis.entropy_path();
    if let Err(e) = report::write_entropy_series(&entropy_path, &series).await {
        error!(error = %e, path = %entropy_path.display(), "unable to write entropy file");
    }

    let stats = stats::SeriesStats::new(&series);
    println!("{}", report::summary_line(&stats));
}
