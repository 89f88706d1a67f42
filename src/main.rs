use std::path::PathBuf;

use clap::{Parser, Subcommand};
use perch::args::{parse_point, parse_rect, parse_size};
use perch::{PerchConfig, Session, logging, repl};
use perch_types::{Placement, Point, Rect, Size};
use tokio::task::LocalSet;

#[tokio::main]
async fn main() -> Result<(), String> {
    logging::init();

    let cli = Cli::parse();
    let config = PerchConfig::load(cli.config.as_deref()).map_err(|e| e.to_string())?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Resolve {
            target,
            size,
            place,
            spacing,
            viewport,
            scroll,
            auto,
        } => {
            let defaults = &config.defaults;
            let viewport = viewport.unwrap_or(Size::new(config.viewport.width, config.viewport.height));
            let scroll = scroll.unwrap_or_default();
            let viewport = Rect::new(scroll.y, scroll.x, viewport.width, viewport.height);

            let result = perch_core::resolve(
                &target,
                size,
                spacing.or(defaults.spacing).unwrap_or(0.0),
                place.unwrap_or(defaults.place),
                &viewport,
                auto || defaults.auto,
            );
            println!("{} {} {}", result.placement, result.top, result.left);
        }
        Commands::Repl => {
            let session = Session::new(&config).map_err(|e| e.to_string())?;
            LocalSet::new().run_until(repl::run(session)).await?;
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Tooltip placement engine")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one placement and print `placement top left`
    Resolve {
        /// Anchor box as TOP,LEFT,WIDTH,HEIGHT
        #[arg(long, value_parser = parse_rect, allow_hyphen_values = true)]
        target: Rect,

        /// Overlay size as WIDTH,HEIGHT
        #[arg(long, value_parser = parse_size)]
        size: Size,

        #[arg(short, long)]
        place: Option<Placement>,

        #[arg(short, long)]
        spacing: Option<f64>,

        /// Viewport size as WIDTH,HEIGHT
        #[arg(long, value_parser = parse_size)]
        viewport: Option<Size>,

        /// Viewport scroll offset as X,Y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        scroll: Option<Point>,

        /// Flip away from viewport edges
        #[arg(short, long)]
        auto: bool,
    },
    /// Interactive session against an in-memory document (default)
    Repl,
}
