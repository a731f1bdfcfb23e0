mod report;

use kpiboard_common::error::{KpiboardError, KpiboardResult};
use kpiboard_common::types::ServiceInfo;
use kpiboard_config::{init_tracing, AppConfig};
use tokio::io::AsyncWriteExt;

use report::dataset::Dataset;
use report::responses::InsightReport;
use report::service::InsightService;

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };
    init_tracing(&config.log_level);

    if let Err(err) = run(config).await {
        tracing::error!(error = %err, "insight run failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> KpiboardResult<()> {
    let info = ServiceInfo::new("kpiboard-metrics");
    tracing::info!(service = %info.name, version = %info.version, "starting");

    let dataset = Dataset::load(&config.dataset_path).await?;
    dataset.validate()?;

    let service = InsightService::from_app_config(&config)?;
    let report = InsightReport::new(info, service.run(&dataset));
    tracing::info!(count = report.count, "insights generated");

    let body = serde_json::to_vec_pretty(&report)
        .map_err(|e| KpiboardError::Internal(format!("failed to encode report: {e}")))?;

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(&body)
        .await
        .map_err(|e| KpiboardError::Internal(format!("failed to write report: {e}")))?;
    stdout
        .write_all(b"\n")
        .await
        .map_err(|e| KpiboardError::Internal(format!("failed to write report: {e}")))?;
    stdout
        .flush()
        .await
        .map_err(|e| KpiboardError::Internal(format!("failed to write report: {e}")))?;

    tracing::info!("done");
    Ok(())
}
