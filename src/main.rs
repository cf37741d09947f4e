// Standalone page snapshot CLI
//
// Renders a URL in Chromium and writes a single HTML file that carries its
// stylesheets and images with it.

mod cli;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::process::ExitCode;

use cli::Cli;
use kodegen_tools_standalone::utils::{default_output_path, ERROR_PREVIEW_LEN};
use kodegen_tools_standalone::{url_to_standalone_html, ChromeRenderer, SavedPage};

fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("chromiumoxide::handler", log::LevelFilter::Off)
        .filter_module("chromiumoxide::conn", log::LevelFilter::Off)
        .try_init()
        .context("Failed to initialize logger")?;

    use tracing_subscriber::layer::SubscriberExt;
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
                .add_directive("chromiumoxide::handler=off".parse()?)
                .add_directive("chromiumoxide::conn=off".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false));
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

fn print_summary(saved: &SavedPage) {
    let stats = &saved.stats;

    println!();
    println!("✅ Standalone HTML written: {}", saved.output_path.display());
    if let Some(dir) = &saved.assets_dir {
        println!("📁 Assets folder: {}", dir.display());
    }
    println!("   Stylesheets inlined: {}", stats.stylesheets_inlined);
    println!("   Images inlined:      {}", stats.images_inlined);
    println!("   CSS urls inlined:    {}", stats.css_urls_inlined);
    println!("   Assets downloaded:   {}", stats.assets_downloaded);
    println!("   Resources failed:    {}", stats.resources_failed);
    println!(
        "   Size: {:.1} KB -> {:.1} KB",
        stats.total_size_before as f64 / 1024.0,
        stats.total_size_after as f64 / 1024.0
    );

    if !saved.errors.is_empty() {
        println!();
        println!("⚠️  {} resources could not be processed:", saved.errors.len());
        for error in saved.errors.iter().take(ERROR_PREVIEW_LEN) {
            println!("   - {error}");
        }
        if saved.errors.len() > ERROR_PREVIEW_LEN {
            println!("   ... and {} more", saved.errors.len() - ERROR_PREVIEW_LEN);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = match &cli.output {
        Some(path) => path.clone(),
        None => default_output_path(&cli.url, Local::now())?,
    };
    let config = cli.to_config(&output)?;
    let renderer = ChromeRenderer::from_config(&config);

    let saved = url_to_standalone_html(&cli.url, Some(&output), &config, &renderer).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        print_summary(&saved);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Warning: {e:#}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
