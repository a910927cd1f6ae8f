use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use receipt_kit::{
    api::{AppsScriptClient, CachedBackend},
    cache::ResponseCache,
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    imaging::{CropRegion, Dimensions, EncodedImage, PipelineSettings, ProcessOptions, process_receipt},
    observability::{LogFormat, init_logging},
};

#[derive(Parser)]
#[command(name = "receipt-kit")]
#[command(version)]
#[command(about = "Prepare receipt photos for upload and OCR extraction")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (created with defaults if missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Log level
    #[arg(short = 'v', long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize, optionally crop/grayscale, and re-encode a receipt photo
    Process {
        input: PathBuf,

        #[command(flatten)]
        edits: EditArgs,

        /// Where to write the JPEG (default: <input>.receipt.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the base64 payload instead of writing a file
        #[arg(long)]
        base64: bool,
    },
    /// Process a receipt photo and send it to the backend for OCR extraction
    Extract {
        input: PathBuf,

        #[command(flatten)]
        edits: EditArgs,
    },
}

#[derive(clap::Args)]
struct EditArgs {
    /// JPEG quality, 0.3 to 1.0
    #[arg(short, long)]
    quality: Option<f32>,

    /// Convert to grayscale before encoding
    #[arg(short, long)]
    grayscale: bool,

    /// Crop selection as X,Y,W,H in displayed pixels
    #[arg(long, value_parser = parse_crop, requires = "display")]
    crop: Option<CropRegion>,

    /// Size the image was displayed at when the crop was selected, as WxH
    #[arg(long, value_parser = parse_dimensions)]
    display: Option<Dimensions>,
}

impl EditArgs {
    fn to_options(&self) -> ProcessOptions {
        ProcessOptions {
            crop: self.crop.zip(self.display),
            grayscale: self.grayscale,
            quality: self.quality,
        }
    }
}

fn parse_crop(value: &str) -> Result<CropRegion, String> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid crop '{value}': {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] => Ok(CropRegion::new(*x, *y, *w, *h)),
        _ => Err(format!("crop must be X,Y,W,H, got '{value}'")),
    }
}

fn parse_dimensions(value: &str) -> Result<Dimensions, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("display size must be WxH, got '{value}'"))?;
    let width = w.trim().parse().map_err(|e| format!("invalid width '{w}': {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("invalid height '{h}': {e}"))?;
    Ok(Dimensions::new(width, height))
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("receipt.jpg")
}

async fn prepare(input: &Path, settings: PipelineSettings, edits: &EditArgs) -> Result<EncodedImage> {
    let source = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let options = edits.to_options();
    let result = tokio::task::spawn_blocking(move || process_receipt(source, settings, &options))
        .await
        .context("Image processing task failed")?;
    match result {
        Err(e) if e.is_validation() => bail!("{e}; check the --crop selection against --display"),
        other => Ok(other?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
    init_logging(&cli.log_level, format);

    info!("Starting receipt-kit v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);
    let settings = PipelineSettings::from(&config.imaging);

    match cli.command {
        Command::Process {
            input,
            edits,
            output,
            base64,
        } => {
            let encoded = prepare(&input, settings, &edits).await?;
            if base64 {
                println!("{}", encoded.to_base64());
            } else {
                let output = output.unwrap_or_else(|| default_output(&input));
                tokio::fs::write(&output, &encoded.bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                info!(
                    "Wrote {} ({}, {} bytes)",
                    output.display(),
                    encoded.dimensions,
                    encoded.len()
                );
            }
        }
        Command::Extract { input, edits } => {
            if config.api.endpoint.is_none() {
                bail!("api.endpoint must be configured (or set RECEIPT_KIT_API__ENDPOINT) to extract receipts");
            }
            let encoded = prepare(&input, settings, &edits).await?;
            let backend = CachedBackend::new(
                AppsScriptClient::new(&config.api)?,
                Arc::new(ResponseCache::from_config(&config.cache)),
            );

            let fields = backend.extract_receipt(&encoded.to_base64()).await?;
            if !fields.is_complete() {
                info!("OCR left some fields empty; fill them in manually before saving");
            }
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crop() {
        assert_eq!(parse_crop("10, 20,300,400").unwrap(), CropRegion::new(10, 20, 300, 400));
        assert!(parse_crop("10,20,300").is_err());
        assert!(parse_crop("a,b,c,d").is_err());
    }

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("600x300").unwrap(), Dimensions::new(600, 300));
        assert_eq!(parse_dimensions("600X300").unwrap(), Dimensions::new(600, 300));
        assert!(parse_dimensions("600").is_err());
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output(Path::new("/tmp/photo.png")),
            PathBuf::from("/tmp/photo.receipt.jpg")
        );
    }

    #[test]
    fn test_cli_parses_process_command() {
        let cli = Cli::try_parse_from([
            "receipt-kit",
            "process",
            "photo.jpg",
            "--grayscale",
            "--quality",
            "0.5",
            "--crop",
            "0,0,100,100",
            "--display",
            "600x400",
        ])
        .unwrap();
        match cli.command {
            Command::Process { edits, .. } => {
                let options = edits.to_options();
                assert!(options.grayscale);
                assert_eq!(options.quality, Some(0.5));
                assert_eq!(
                    options.crop,
                    Some((CropRegion::new(0, 0, 100, 100), Dimensions::new(600, 400)))
                );
            }
            Command::Extract { .. } => panic!("expected process"),
        }
    }

    #[test]
    fn test_config_defaults_to_local_file() {
        let cli = Cli::try_parse_from(["receipt-kit", "process", "photo.jpg"]).unwrap();
        assert_eq!(cli.config, DEFAULT_CONFIG_FILE);

        let cli =
            Cli::try_parse_from(["receipt-kit", "extract", "photo.jpg", "-c", "/etc/rk.toml"])
                .unwrap();
        assert_eq!(cli.config, "/etc/rk.toml");
    }

    #[tokio::test]
    async fn test_crop_outside_image_is_reported_with_hint() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("receipt.png");
        image::RgbaImage::from_pixel(300, 200, image::Rgba([240, 240, 240, 255]))
            .save(&input)
            .unwrap();

        let cli = Cli::try_parse_from([
            "receipt-kit",
            "process",
            input.to_str().unwrap(),
            "--crop",
            "400,0,50,50",
            "--display",
            "300x200",
        ])
        .unwrap();
        let Command::Process { edits, .. } = cli.command else {
            panic!("expected process");
        };
        let err = prepare(&input, PipelineSettings::default(), &edits)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--crop"));
    }

    #[test]
    fn test_crop_requires_display() {
        assert!(
            Cli::try_parse_from(["receipt-kit", "process", "photo.jpg", "--crop", "0,0,50,50"])
                .is_err()
        );
    }
}
