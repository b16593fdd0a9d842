//! Prode CLI
//!
//! Create a profile, fill in predictions and knockout picks, and score it
//! against a results file.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use prode_core::league::leaderboard_with;
#[cfg(feature = "cli")]
use prode_core::{record_pick, restore, ProdeConfig, ResultsFeed, UserProfile};
#[cfg(feature = "cli")]
use rand::SeedableRng;
#[cfg(feature = "cli")]
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "prode")]
#[command(about = "Tournament prediction game", long_about = None)]
struct Cli {
    /// Scoring preset (classic, participation, exact_only); overrides the config file
    #[arg(long, global = true)]
    preset: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Create a new profile
    New {
        /// Country, e.g. ARG
        #[arg(long)]
        country: String,

        #[arg(long)]
        name: Option<String>,

        /// Output profile JSON path
        #[arg(long)]
        out: PathBuf,

        /// Fill every group match with random predictions
        #[arg(long)]
        random: bool,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Set one group-stage prediction
    Predict {
        #[arg(long)]
        profile: PathBuf,

        #[arg(long = "match")]
        match_id: String,

        #[arg(long)]
        home: u8,

        #[arg(long)]
        away: u8,
    },

    /// Choose the team that fills a playoff placeholder
    Resolve {
        #[arg(long)]
        profile: PathBuf,

        /// Placeholder team id, e.g. eur_a
        #[arg(long)]
        placeholder: String,

        #[arg(long)]
        team: String,
    },

    /// Print group tables derived from the profile's predictions
    Standings {
        #[arg(long)]
        profile: PathBuf,
    },

    /// Print the knockout bracket with the profile's picks
    Bracket {
        #[arg(long)]
        profile: PathBuf,
    },

    /// Pick the winner of a knockout match
    Pick {
        #[arg(long)]
        profile: PathBuf,

        #[arg(long = "match")]
        match_id: String,

        #[arg(long)]
        team: String,
    },

    /// Score a profile against a results file
    Score {
        #[arg(long)]
        profile: PathBuf,

        #[arg(long)]
        results: PathBuf,
    },

    /// Generate random official results with the mock feed
    Simulate {
        /// Output results JSON path
        #[arg(long)]
        out: PathBuf,

        /// Overrides the configured seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of feed polls
        #[arg(long, default_value = "1")]
        rounds: u32,
    },

    /// Rank several profiles against a results file
    Leaderboard {
        #[arg(long)]
        results: PathBuf,

        profiles: Vec<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ProdeConfig::from_env()?;
    if let Some(name) = &cli.preset {
        let preset = ProdeConfig::preset(name).with_context(|| format!("Unknown preset: {}", name))?;
        config.scoring = preset.scoring;
    }
    let tournament = config.load_tournament()?;
    tracing::debug!(format = %tournament.format.name, scoring = ?config.scoring, "loaded tournament");

    match cli.command {
        Commands::New { country, name, out, random, seed } => {
            let mut rng = match seed {
                Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                None => ChaCha8Rng::from_entropy(),
            };
            let mut profile = UserProfile::new(&country, tournament.format.edition, &mut rng);
            profile.user_name = name;
            if random {
                profile.fill_random_predictions(&tournament.fixtures, &mut rng);
            }
            prode_cli::save_profile(&out, &profile)?;
            println!("Created {} -> {}", profile.user_id, out.display());
        }

        Commands::Predict { profile: path, match_id, home, away } => {
            let mut profile = prode_cli::load_profile(&path)?;
            if !tournament.fixtures.iter().any(|m| m.id == match_id) {
                anyhow::bail!("No group match with id {}", match_id);
            }
            profile.set_prediction(&match_id, home, away);
            prode_cli::save_profile(&path, &profile)?;
            println!("{}: {}-{}", match_id, home, away);
        }

        Commands::Resolve { profile: path, placeholder, team } => {
            let mut profile = prode_cli::load_profile(&path)?;
            profile.resolve_playoff(&tournament, &placeholder, &team)?;
            prode_cli::save_profile(&path, &profile)?;
            println!("{} -> {}", placeholder, tournament.registry.name_of(&team));
        }

        Commands::Standings { profile: path } => {
            let profile = prode_cli::load_profile(&path)?;
            let state = restore(&profile, &tournament)?;
            let missing = prode_core::missing_predictions(&state.fixtures, &profile.predictions);
            if !missing.is_empty() {
                println!("{} group matches still unpredicted\n", missing.len());
            }
            print!(
                "{}",
                prode_cli::render_standings(&state.standings, &tournament.registry, tournament.format.best_third_places)
            );
        }

        Commands::Bracket { profile: path } => {
            let profile = prode_cli::load_profile(&path)?;
            let state = restore(&profile, &tournament)?;
            print!("{}", prode_cli::render_bracket(&state.bracket, &tournament.registry, &profile.bracket));
            for stale in &state.stale_picks {
                println!("stale pick: {} -> {}", stale.match_id, stale.team_id);
            }
        }

        Commands::Pick { profile: path, match_id, team } => {
            let mut profile = prode_cli::load_profile(&path)?;
            let mut state = restore(&profile, &tournament)?;
            let advance = record_pick(&mut state.bracket, &mut profile.bracket, &match_id, &team)?;
            prode_cli::save_profile(&path, &profile)?;
            match advance {
                Some(a) => println!("{} advances to {} ({:?})", tournament.registry.name_of(&team), a.match_id, a.slot),
                None => println!("Champion: {}", tournament.registry.name_of(&team)),
            }
        }

        Commands::Score { profile: path, results } => {
            let profile = prode_cli::load_profile(&path)?;
            let mut results = prode_cli::load_results(&results)?;
            let state = restore(&profile, &tournament)?;
            let matches = prode_cli::apply_results(&state.fixtures, &mut results);
            print!("{}", prode_cli::render_scores(&profile, &matches, &config.scoring));
        }

        Commands::Simulate { out, seed, rounds } => {
            let mut feed_config = config.feed.clone();
            if let Some(seed) = seed {
                feed_config.seed = seed;
            }
            let mut feed = feed_config.build();
            let mut matches = tournament.fixtures.clone();
            for _ in 0..rounds {
                feed.poll(&mut matches);
            }
            let written = prode_cli::save_results(&out, &matches)?;
            println!("{} results written to {}", written, out.display());
        }

        Commands::Leaderboard { results, profiles } => {
            let mut results = prode_cli::load_results(&results)?;
            let matches = prode_cli::apply_results(&tournament.fixtures, &mut results);
            let profiles =
                profiles.iter().map(|p| prode_cli::load_profile(p)).collect::<Result<Vec<UserProfile>>>()?;
            for entry in leaderboard_with(&config.scoring, &profiles, &matches) {
                let name = entry.user_name.as_deref().unwrap_or(&entry.user_id);
                println!("{:>3}. {:<24} {:>4}", entry.rank, name, entry.points);
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("prode CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
