use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Base name of the input video, without extension. `<input>.mp4` is
    /// read and both output paths are derived from it.
    pub input: String,
    /// When true, the difference images are also encoded into
    /// `<input> - DIFF.mp4`.
    #[serde(default)]
    pub difference_video: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_preset")]
    pub preset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl AnalysisConfig {
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.mp4", self.input))
    }

    pub fn entropy_path(&self) -> PathBuf {
        PathBuf::from(format!("{} - ENTROPY.txt", self.input))
    }

    pub fn diff_video_path(&self) -> PathBuf {
        PathBuf::from(format!("{} - DIFF.mp4", self.input))
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            codec: default_codec(),
            crf: default_crf(),
            preset: default_preset(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

// Default value functions
fn default_fps() -> f64 {
    30.0
}
fn default_codec() -> String {
    "h264".into()
}
fn default_crf() -> u32 {
    23
}
fn default_preset() -> String {
    "veryfast".into()
}
fn default_log_level() -> String {
    "info".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            input = "clip"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis.input, "clip");
        assert!(!config.analysis.difference_video);
        assert_eq!(config.encoding.fps, 30.0);
        assert_eq!(config.encoding.codec, "h264");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn derived_paths_use_base_name() {
        let analysis = AnalysisConfig {
            input: "files/run7".into(),
            difference_video: true,
        };
        assert_eq!(analysis.input_path(), PathBuf::from("files/run7.mp4"));
        assert_eq!(
            analysis.entropy_path(),
            PathBuf::from("files/run7 - ENTROPY.txt")
        );
        assert_eq!(
            analysis.diff_video_path(),
            PathBuf::from("files/run7 - DIFF.mp4")
        );
    }

    #[test]
    fn missing_input_is_a_parse_error() {
        let result: Result<Config, _> = toml::from_str("[analysis]\n");
        assert!(result.is_err());
    }
}
