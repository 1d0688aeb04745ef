use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use frame_inspector::dom::serialize::to_html;
use frame_inspector::error::{read_to_string, Result};
use frame_inspector::{Document, PopoverConfig, PopoverManager, SelectionMessage, Viewport};

/// Run one frame-popover cycle against a saved page.
#[derive(Debug, Parser)]
#[command(name = "frame-inspector", version, about)]
struct Cli {
    /// HTML of the inspected page
    #[arg(long)]
    html: PathBuf,

    /// URL the page was loaded from (determines its origin)
    #[arg(long)]
    url: String,

    /// Panel message (JSON) selecting a frame
    #[arg(long)]
    message: PathBuf,

    /// Popover configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Expand the feature list after showing the tooltip
    #[arg(long)]
    expand_features: bool,

    /// Report the frame under this viewport point, as "x,y"
    #[arg(long, value_parser = parse_point)]
    hover: Option<(f32, f32)>,
}

fn parse_point(s: &str) -> std::result::Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PopoverConfig::load(path)?,
        None => PopoverConfig::default(),
    };
    let html = read_to_string(&cli.html)?;
    let message = SelectionMessage::from_json(&read_to_string(&cli.message)?)?;

    let mut document = Document::from_html(&html, &cli.url, Viewport::new(cli.width, cli.height));
    log::info!(
        "loaded {} ({} frames, origin {})",
        cli.url,
        document.frames().len(),
        document.origin()
    );

    let mut manager = PopoverManager::new(config);
    let Some(outcome) = manager.show(&mut document, &message) else {
        println!("no popover shown");
        return Ok(());
    };

    if cli.expand_features && manager.toggle_features(&mut document).is_none() {
        log::warn!("tooltip has no collapsible feature list");
    }

    println!("frame: {:?}", outcome.frame);
    println!("placement: {:?}", outcome.placement);
    if let Some(overlay) = &outcome.overlay {
        if let Some(node) = document.element_by_id(&overlay.id) {
            println!("{}", to_html(node));
        }
    }
    if let Some(node) = document.element_by_id(&outcome.tooltip_id) {
        println!("{}", to_html(node));
    }
    println!(
        "scroll: {},{}",
        document.viewport.scroll_x, document.viewport.scroll_y
    );

    if let Some((x, y)) = cli.hover {
        match manager.hover(&document, x, y) {
            Some(hover) => println!("{}", hover.to_json()?),
            None => println!("nothing hovered at {x},{y}"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("frame-inspector: {e}");
            ExitCode::FAILURE
        }
    }
}
