use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use countdown_compositor::{
    clock::Moment,
    composition::Compositor,
    config::CountdownTemplate,
};

#[derive(Parser)]
#[command(
    name = "countdown-compositor",
    version,
    about = "Render countdown animations as animated GIFs",
    long_about = "Countdown-Compositor builds a countdown template from a JSON file, pre-renders \
                  the digit glyphs, and composites one frame per second of the remaining duration \
                  into an animated GIF."
)]
struct Cli {
    /// Countdown template JSON file
    #[arg(short, long, required_unless_present = "emit_template")]
    template: Option<PathBuf>,

    /// Output GIF file path
    #[arg(short, long, required_unless_present = "emit_template")]
    output: Option<PathBuf>,

    /// Days remaining at the first frame
    #[arg(long, default_value_t = 0)]
    days: u32,

    /// Hours remaining at the first frame
    #[arg(long, default_value_t = 0)]
    hours: u32,

    /// Minutes remaining at the first frame
    #[arg(long, default_value_t = 0)]
    minutes: u32,

    /// Seconds remaining at the first frame
    #[arg(long, default_value_t = 0)]
    seconds: u32,

    /// Number of frames to render
    #[arg(short, long, default_value_t = 1)]
    frames: u32,

    /// Print an example template JSON and exit
    #[arg(long)]
    emit_template: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    if cli.emit_template {
        println!(
            "{}",
            serde_json::to_string_pretty(&CountdownTemplate::sample())?
        );
        return Ok(());
    }

    let template_path = cli.template.context("--template is required")?;
    let output_path = cli.output.context("--output is required")?;

    info!("Starting Countdown-Compositor v{}", env!("CARGO_PKG_VERSION"));
    info!("Template: {:?}", template_path);
    info!("Output: {:?}", output_path);

    let template = CountdownTemplate::from_file(&template_path)?;
    let engine = Compositor::countdown(&template)?;

    let start = Moment::new(cli.days, cli.hours, cli.minutes, cli.seconds);
    let asset = engine.render(start, cli.frames)?;
    asset.write_to_file(&output_path)?;

    info!(
        "Rendered {} frames ({}x{}) to {:?}",
        asset.page_count(),
        asset.page_width(),
        asset.page_height(),
        output_path
    );
    Ok(())
}
