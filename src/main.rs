use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rpi_rankings::data_loader::{available_weeks, filter_season, filter_through_week, latest_season, latest_week};
use rpi_rankings::report::*;
use rpi_rankings::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Power rankings by Rating Percentage Index.
#[derive(Parser)]
struct Options {
    /// JSON file of tuning overrides. Flags below win over the file.
    #[clap(short, long, env = "RPI_CONFIG")]
    config: Option<PathBuf>,

    #[clap(long, env = "RPI_ALPHA_DECAY")]
    alpha_decay: Option<f64>,

    #[clap(long, env = "RPI_K")]
    k: Option<f64>,

    #[clap(long, env = "RPI_SMOOTHING_ALPHA")]
    smoothing_alpha: Option<f64>,

    #[clap(long, env = "RPI_SMOOTHING_BETA")]
    smoothing_beta: Option<f64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank every team as of one week (the latest by default).
    Rank {
        #[clap(flatten)]
        input: Input,

        #[clap(short, long)]
        week: Option<u32>,

        #[clap(flatten)]
        output: Output,
    },
    /// Rank every team at the end of each week of the season.
    History {
        #[clap(flatten)]
        input: Input,

        /// Only these teams, comma separated.
        #[clap(short, long, value_delimiter = ',')]
        teams: Vec<String>,

        /// Print the full ranking as it stood at the end of this week.
        #[clap(short, long, conflicts_with = "teams")]
        week: Option<u32>,

        #[clap(flatten)]
        output: Output,
    },
    /// List the weeks with results, most recent first.
    Weeks {
        #[clap(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Schedule file (.csv or .json).
    #[clap(short, long, env = "RPI_SCHEDULE")]
    schedule: PathBuf,

    /// Season to rank. Defaults to the latest in the schedule.
    #[clap(long)]
    season: Option<u32>,
}

#[derive(Args)]
struct Output {
    #[clap(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Write here instead of stdout. Ignored for table output.
    #[clap(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let opt = Options::parse();

    let ranking_context = ranking_context(&opt)?;
    tracing::debug!(?ranking_context, "using tuning");

    match opt.command {
        Command::Rank { input, week, output } => {
            let games = season_games(&input)?;
            let week = match week {
                Some(week) => week,
                None => latest_week(&games).ok_or(RankingError::EmptySchedule)?,
            };
            let played = filter_through_week(&games, week);
            if played.is_empty() {
                return Err(RankingError::UnknownWeek(week).into());
            }

            let ranked = gen_rankings(&played, week, &ranking_context)?.ranked();
            match output.format {
                Format::Table => output_report(week, &ranked),
                Format::Csv => write_rankings_csv(&ranked, writer(&output)?)?,
                Format::Json => write_json(&ranked, writer(&output)?)?,
            }
        }
        Command::History { input, teams, week, output } => {
            let games = season_games(&input)?;
            let history = gen_history(&games, &ranking_context)?;

            if let Some(week) = week {
                let weekly = history.week(week)?;
                match output.format {
                    Format::Table => output_report(week, &weekly.rankings),
                    Format::Csv => write_rankings_csv(&weekly.rankings, writer(&output)?)?,
                    Format::Json => write_json(weekly, writer(&output)?)?,
                }
                return Ok(());
            }

            let rows = history.rows(&teams);
            match output.format {
                Format::Table => output_history(&rows),
                Format::Csv => write_history_csv(&rows, writer(&output)?)?,
                Format::Json => write_json(&rows, writer(&output)?)?,
            }
        }
        Command::Weeks { input } => {
            let games = season_games(&input)?;
            for week in available_weeks(&games) {
                println!("{week}");
            }
        }
    }

    Ok(())
}

fn ranking_context(opt: &Options) -> anyhow::Result<RankingContext> {
    let mut ranking_context = match &opt.config {
        Some(path) => RankingContext::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RankingContext::default(),
    };

    if let Some(alpha_decay) = opt.alpha_decay { ranking_context.alpha_decay = alpha_decay; }
    if let Some(k) = opt.k { ranking_context.k = k; }
    if let Some(smoothing_alpha) = opt.smoothing_alpha { ranking_context.smoothing_alpha = smoothing_alpha; }
    if let Some(smoothing_beta) = opt.smoothing_beta { ranking_context.smoothing_beta = smoothing_beta; }

    ranking_context.validate()?;
    Ok(ranking_context)
}

fn season_games(input: &Input) -> anyhow::Result<Vec<Game>> {
    let games = load_schedule(&input.schedule)
        .with_context(|| format!("loading schedule {}", input.schedule.display()))?;

    let season = match input.season {
        Some(season) => season,
        None => latest_season(&games).ok_or(RankingError::EmptySchedule)?,
    };
    let games = filter_season(&games, season);
    if games.is_empty() {
        anyhow::bail!("no games for season {season}");
    }

    tracing::info!(season, games = games.len(), "ranking season");
    Ok(games)
}

fn writer(output: &Output) -> anyhow::Result<Box<dyn Write>> {
    Ok(match &output.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    })
}
