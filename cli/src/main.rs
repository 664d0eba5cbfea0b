//! Terminal driver for the echosweep engine.
//!
//! Builds a board from a settings file and/or arguments, issues the requested
//! presses and prints every batch as it is delivered.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use echosweep_core::{Board, CellCount, Coord, FixedBombGenerator, Position};
use futures_util::future::join_all;

mod render;
mod settings;

use render::TextView;
use settings::Settings;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,

    /// TOML settings file with `[board]` and `[view]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    height: Option<Coord>,

    #[arg(long)]
    width: Option<Coord>,

    /// Number of random bomb draws
    #[arg(short, long)]
    bombs: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Place a bomb at ROW,COLUMN instead of drawing them randomly
    #[arg(long = "bomb", value_name = "ROW,COLUMN", value_parser = parse_position)]
    fixed_bombs: Vec<Position>,

    /// Press the cell at ROW,COLUMN
    #[arg(short, long = "press", value_name = "ROW,COLUMN", value_parser = parse_position)]
    presses: Vec<Position>,

    /// Press the cell under pixel X,Y
    #[arg(long = "pixel", value_name = "X,Y", value_parser = parse_pair::<u32>)]
    pixels: Vec<(u32, u32)>,

    /// Cell edge length in pixels, overrides the settings file
    #[arg(long)]
    cell_size: Option<u32>,

    /// Issue all presses at once instead of one after another
    #[arg(long)]
    concurrent: bool,
}

fn parse_pair<T: std::str::FromStr>(value: &str) -> Result<(T, T), String> {
    let (a, b) = value
        .split_once(',')
        .ok_or_else(|| format!("expected two comma separated values, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<T>()
            .map_err(|_| format!("invalid number `{part}`"))
    };
    Ok((parse(a)?, parse(b)?))
}

fn parse_position(value: &str) -> Result<Position, String> {
    parse_pair::<Coord>(value).map(Position::from)
}

impl Args {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let board = &mut settings.board;
        board.height = self.height.unwrap_or(board.height);
        board.width = self.width.unwrap_or(board.width);
        board.bombs = self.bombs.unwrap_or(board.bombs);
        board.seed = self.seed.or(board.seed);
        if let Some(cell_size) = self.cell_size {
            settings.view.cell_size = cell_size;
        }
        Ok(settings)
    }

    fn targets(&self, settings: &Settings) -> Vec<Position> {
        let pixels = self
            .pixels
            .iter()
            .map(|&(x, y)| settings.view.cell_at_pixel(x, y));
        self.presses.iter().copied().chain(pixels).collect()
    }
}

fn init_logging(verbose: &clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>) {
    use tracing_subscriber::EnvFilter;

    let level = verbose.log_level_filter().to_string().to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let settings = args.settings()?;
    let board = if args.fixed_bombs.is_empty() {
        Board::with_config(settings.board)
    } else {
        Board::with_generator(
            settings.board,
            FixedBombGenerator::new(args.fixed_bombs.iter().copied()),
        )
    }
    .context("building board")?;
    log::info!("{board:?}");

    let mut subscription = board.subscribe();
    let mut view = TextView::new((board.height(), board.width()));
    let printer = tokio::spawn(async move {
        while let Some(batch) = subscription.next_batch().await {
            println!("{}", render::summary(&batch));
            view.apply(&batch);
            print!("{view}");
        }
        view
    });

    let targets = args.targets(&settings);
    let results = if args.concurrent {
        join_all(
            targets
                .iter()
                .map(|target| board.press(target.row, target.column)),
        )
        .await
    } else {
        let mut results = Vec::with_capacity(targets.len());
        for target in &targets {
            results.push(board.press(target.row, target.column).await);
        }
        results
    };

    for (target, result) in targets.iter().zip(results) {
        if let Err(err) = result {
            log::warn!("press at {target} rejected: {err}");
        }
    }

    drop(board);
    let view = printer.await.context("printer task failed")?;
    println!("{} cells revealed", view.opened());
    Ok(())
}
