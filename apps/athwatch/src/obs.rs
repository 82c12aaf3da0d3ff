#[cfg(feature = "prometheus")]
use std::fs;
use std::path::{Path, PathBuf};

pub fn init_tracing(log_level: &str, log_format: &str) -> Result<(), String> {
    let filter = std::env::var("ATHWATCH_LOG").unwrap_or_else(|_| log_level.to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;

    let format = log_format.trim().to_lowercase();
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
        return Ok(());
    }
    if format != "text" {
        return Err(format!("unsupported --log-format {log_format} (expected text or json)"));
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Prometheus text exposition written once the scan is done.
#[cfg_attr(not(feature = "prometheus"), allow(dead_code))]
pub struct MetricsTextfile {
    path: PathBuf,
    #[cfg(feature = "prometheus")]
    handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsTextfile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(feature = "prometheus")]
    pub fn write(&self) -> Result<(), String> {
        let tmp = self.path.with_extension("prom.tmp");
        fs::write(&tmp, self.handle.render())
            .map_err(|err| format!("failed to write metrics {}: {err}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .map_err(|err| format!("failed to move metrics into {}: {err}", self.path.display()))
    }

    #[cfg(not(feature = "prometheus"))]
    pub fn write(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(feature = "prometheus")]
pub fn init_metrics(textfile: Option<&Path>) -> Result<Option<MetricsTextfile>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(path) = textfile else {
        return Ok(None);
    };
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|err| format!("failed to install prometheus recorder: {err}"))?;

    tracing::info!(metrics_textfile = %path.display(), "prometheus metrics recorder enabled");
    Ok(Some(MetricsTextfile {
        path: path.to_path_buf(),
        handle,
    }))
}

#[cfg(not(feature = "prometheus"))]
pub fn init_metrics(textfile: Option<&Path>) -> Result<Option<MetricsTextfile>, String> {
    if textfile.is_some() {
        return Err("metrics export requires athwatch feature `prometheus`".to_string());
    }
    Ok(None)
}
