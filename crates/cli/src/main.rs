//! autopod entry point

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use autopod_config::Settings;
use autopod_content::plain_text_segments;
use autopod_pipeline::{AudioBuilder, EdgeTtsBackend};

/// Turn a text file into one narrated audio file.
#[derive(Parser, Debug)]
#[command(name = "autopod", version, about)]
struct Args {
    /// UTF-8 text file to narrate, read line by line
    #[arg(short, long)]
    input: PathBuf,

    /// Backend voice to narrate with
    #[arg(short, long)]
    voice: Option<String>,

    /// Copy the finished audio here (defaults to out.wav in the temp dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Working directory for per-segment artifacts
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Number of concurrent synthesis workers
    #[arg(long)]
    workers: Option<usize>,

    /// Optional TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(temp_dir) = args.temp_dir {
        settings.build.temp_dir = temp_dir;
    }
    if let Some(workers) = args.workers {
        settings.build.max_concurrent_generations = workers;
    }
    if let Some(voice) = args.voice {
        settings.tts.default_voice = voice;
    }
    settings.validate()?;

    tracing::info!(
        input = %args.input.display(),
        voice = %settings.tts.default_voice,
        workers = settings.build.max_concurrent_generations,
        "starting narration build"
    );

    let segments = plain_text_segments(args.input, settings.tts.default_voice.clone());
    let builder = AudioBuilder::new(settings, Arc::new(EdgeTtsBackend::default()));

    // Ctrl+C stops intake but keeps everything already synthesized.
    let cancel = builder.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, finishing in-flight segments");
            cancel.cancel();
        }
    });

    let built = builder.build(segments).await?;
    let final_path = match args.output {
        Some(output) => {
            std::fs::copy(&built, &output)?;
            output
        }
        None => built,
    };
    println!("{}", final_path.display());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("autopod=info,autopod_pipeline=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
