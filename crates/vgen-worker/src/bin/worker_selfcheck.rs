use std::path::Path;

use vgen_providers::{Providers, ProvidersConfig};
use vgen_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with content_dir={}",
        config.content_dir.display()
    );
    ensure_content_dir(&config.content_dir).await?;
    ensure_ffmpeg()?;
    report_providers()?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_content_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok").await?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_ffmpeg() -> anyhow::Result<()> {
    let ffmpeg = vgen_media::check_ffmpeg()
        .map_err(|e| anyhow::anyhow!("ffmpeg not available: {}", e))?;
    let ffprobe = vgen_media::check_ffprobe()
        .map_err(|e| anyhow::anyhow!("ffprobe not available: {}", e))?;
    println!(
        "worker-selfcheck: ffmpeg={} ffprobe={}",
        ffmpeg.display(),
        ffprobe.display()
    );
    Ok(())
}

fn report_providers() -> anyhow::Result<()> {
    let providers = Providers::from_config(ProvidersConfig::from_env()?)?;
    for status in providers.status() {
        println!(
            "worker-selfcheck: {} -> {} ({})",
            status.kind, status.provider, status.mode
        );
    }
    Ok(())
}
