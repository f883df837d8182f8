use anyhow::{bail, Result};
use forecast_service::{config::AppConfig, observability};
use std::{env, path::Path};
use time::PrimitiveDateTime;
use wellpark_client::{domain::wire_time, WellparkClient};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        bail!("usage: upload_image <park_no> <image_path> <captured_at \"YYYY-MM-DD HH:MM:SS\">");
    }
    let park_no = &args[1];
    let image_path = &args[2];
    let captured_at = PrimitiveDateTime::parse(&args[3], wire_time::FORMAT)?;

    let cfg = AppConfig::load()?;
    let api = WellparkClient::new(&cfg.api.base_url);

    let bytes = tokio::fs::read(image_path).await?;
    let file_name = Path::new(image_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());

    let body = api.upload_image(park_no, captured_at, file_name, bytes).await?;
    tracing::info!(park_no = %park_no, response = %body, "image uploaded");

    Ok(())
}
