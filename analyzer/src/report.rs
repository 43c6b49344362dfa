use std::path::Path;

use tracing::info;

use crate::stats::SeriesStats;

/// Persist the entropy series, one decimal value per line in series
/// order, newline-terminated. Any previous file is fully rewritten.
pub async fn write_entropy_series(path: &Path, series: &[f64]) -> std::io::Result<()> {
    let mut contents = String::with_capacity(series.len() * 20);
    for value in series {
        contents.push_str(&value.to_string());
        contents.push('\n');
    }
    tokio::fs::write(path, contents).await?;
    info!(values = series.len(), path = %path.display(), "entropy series written");
    Ok(())
}

/// The one-line console summary, 6 decimal digits per statistic.
pub fn summary_line(stats: &SeriesStats) -> String {
    format!(
        "avg: {:.6}\tstd: {:.6}\tmedian: {:.6}",
        stats.mean(),
        stats.std_dev(),
        stats.median()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_six_decimal_digits() {
        let stats = SeriesStats::new(&[1.0, 2.0, 3.0]);
        assert_eq!(
            summary_line(&stats),
            "avg: 2.000000\tstd: 1.000000\tmedian: 2.000000"
        );
    }

    #[test]
    fn summary_of_empty_series_prints_nan() {
        let stats = SeriesStats::new(&[]);
        assert_eq!(summary_line(&stats), "avg: NaN\tstd: NaN\tmedian: NaN");
    }

    #[tokio::test]
    async fn entropy_file_is_one_value_per_line() {
        let path = std::env::temp_dir().join("frame-entropy-report-test.txt");
        write_entropy_series(&path, &[0.0, 1.3862943611198906]).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "0\n1.3862943611198906\n");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn entropy_file_is_rewritten_each_run() {
        let path = std::env::temp_dir().join("frame-entropy-rewrite-test.txt");
        write_entropy_series(&path, &[1.0, 2.0, 3.0]).await.unwrap();
        write_entropy_series(&path, &[0.5]).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "0.5\n");
        let _ = tokio::fs::remove_file(&path).await;
    }
}
