//! Arena CLI
//!
//! Register players, record matches and run tournaments against a JSON state file.

use anyhow::{bail, Context, Result};
use arena::{
    Arena, ArenaConfig, ArenaSnapshot, MatchOutcome, RewardIntent, RewardReason, RewardSink,
    RoundOutcome,
};
use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_STATE_FILE: &str = "arena_state.json";

fn print_usage() {
    println!("Arena ranking and tournament engine");
    println!();
    println!("Usage:");
    println!("  arena [--state FILE] [--config FILE] <command> [args]");
    println!();
    println!("Commands:");
    println!("  register <id>...             Register one or more players");
    println!("  profile <id>                 Show a player's profile");
    println!("  find <id>                    Find an opponent within the rating window");
    println!("  match <winner> <loser>       Record a match result");
    println!("  simulate <p1> <p2>           Simulate a rating-weighted battle");
    println!("  leaderboard [--top N]        Show the leaderboard");
    println!("  history [--last N]           Show recent matches");
    println!("  tournament <format> <id>...  Run a full simulated bracket");
    println!("  formats                      List tournament formats");
    println!();
    println!("Examples:");
    println!("  arena register alice bob carol dave");
    println!("  arena match alice bob");
    println!("  arena tournament daily_1v1 alice bob carol dave");
}

/// Global options stripped from the argument list
struct Options {
    state: PathBuf,
    config: Option<PathBuf>,
}

fn parse_options(args: &[String]) -> Result<(Options, Vec<String>)> {
    let mut options = Options {
        state: PathBuf::from(DEFAULT_STATE_FILE),
        config: None,
    };
    let mut rest = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--state" | "-s" => {
                let Some(value) = args.get(i + 1) else {
                    bail!("--state requires a file path");
                };
                options.state = PathBuf::from(value);
                i += 1;
            }
            "--config" | "-c" => {
                let Some(value) = args.get(i + 1) else {
                    bail!("--config requires a file path");
                };
                options.config = Some(PathBuf::from(value));
                i += 1;
            }
            other => rest.push(other.to_string()),
        }
        i += 1;
    }
    Ok((options, rest))
}

/// Value of `--name N` in a command's arguments
fn count_flag(args: &[String], names: &[&str], default: usize) -> usize {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Prints reward intents as they are granted
struct PrintRewards;

impl RewardSink for PrintRewards {
    fn grant(&self, intent: &RewardIntent) {
        let reason = match &intent.reason {
            RewardReason::Placement { place, .. } => format!("place {}", place),
            RewardReason::TierUp { tier } => format!("reached {}", tier),
        };
        let title = intent
            .reward
            .title
            .as_deref()
            .map(|t| format!(", title \"{}\"", t))
            .unwrap_or_default();
        println!(
            "  reward: {} gets {} gold, {} AP{} ({})",
            intent.player_id, intent.reward.gold, intent.reward.arena_points, title, reason
        );
    }
}

fn open_arena(options: &Options) -> Result<Arena> {
    let config = match &options.config {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ArenaConfig::default(),
    };
    let mut arena = Arena::new(config).with_rewards(PrintRewards);

    if options.state.exists() {
        let snapshot = ArenaSnapshot::load(&options.state)
            .with_context(|| format!("failed to load state {}", options.state.display()))?;
        arena.load_snapshot(snapshot);
    } else {
        info!(path = %options.state.display(), "no state file, starting fresh");
    }

    for summary in arena.expire_due(Utc::now()) {
        warn!(tournament = %summary.tournament_id, "tournament expired");
    }
    Ok(arena)
}

fn save_arena(arena: &Arena, options: &Options) -> Result<()> {
    arena
        .snapshot()
        .save(&options.state)
        .with_context(|| format!("failed to save state {}", options.state.display()))
}

fn run_register(arena: &mut Arena, args: &[String]) -> Result<()> {
    if args.is_empty() {
        bail!("register requires at least one player id");
    }
    for id in args {
        let profile = arena.register(id);
        println!(
            "{}: rating {} ({})",
            profile.player_id,
            profile.rating(),
            profile.tier()
        );
    }
    Ok(())
}

fn show_profile(arena: &Arena, args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        bail!("profile requires a player id");
    };
    let profile = arena.registry().require(id)?;

    println!("=== {} ===", profile.player_id);
    println!("Rating:      {} ({})", profile.rating(), profile.tier());
    println!("Peak tier:   {}", profile.peak_tier);
    if let Some(rank) = arena.rank_of(id) {
        println!("Rank:        #{} of {}", rank, arena.leaderboard().len());
    }
    println!(
        "Record:      {}-{} ({:.1}%)",
        profile.wins,
        profile.losses,
        profile.win_rate()
    );
    println!(
        "Streak:      {} (best {})",
        profile.win_streak, profile.best_win_streak
    );
    println!(
        "Tournaments: {} entered, {} won, {} top 3",
        profile.tournaments.participated, profile.tournaments.wins, profile.tournaments.top3
    );
    if !profile.titles.is_empty() {
        println!("Titles:      {}", profile.titles.join(", "));
    }
    Ok(())
}

fn run_find(arena: &mut Arena, args: &[String]) -> Result<()> {
    let Some(id) = args.first() else {
        bail!("find requires a player id");
    };
    match arena.find_match(id)? {
        Some(opponent) => println!(
            "{} vs {} (rating {})",
            id,
            opponent.player_id,
            opponent.rating()
        ),
        None => println!("No opponent within the rating window for {}", id),
    }
    Ok(())
}

fn run_match(arena: &mut Arena, args: &[String], simulate: bool) -> Result<()> {
    if args.len() < 2 {
        bail!("requires two player ids");
    }
    let record = if simulate {
        arena.simulate_battle(&args[0], &args[1])?
    } else {
        arena.record_match(MatchOutcome::new(&args[0], &args[1]))?
    };

    println!(
        "{} beats {}: {} ({:+}), {} ({:+})",
        record.winner,
        record.loser,
        record.winner_rating,
        record.delta.winner,
        record.loser_rating,
        record.delta.loser
    );
    Ok(())
}

fn show_history(arena: &Arena, args: &[String]) {
    let last = count_flag(args, &["--last", "-n"], 10);
    let matches = arena.history().matches();
    if matches.is_empty() {
        println!("No matches recorded yet.");
        return;
    }
    for record in matches.recent(last) {
        let source = record.tournament_id.as_deref().unwrap_or("ladder");
        println!(
            "{} {} beat {} ({:+}/{:+}) [{}]",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.winner,
            record.loser,
            record.delta.winner,
            record.delta.loser,
            source
        );
    }
}

fn show_formats(arena: &Arena) {
    for format in &arena.config().formats {
        println!(
            "{:<16} {:<24} {:>4} players, {} h",
            format.id,
            format.name,
            format.max_participants,
            format.duration_secs / 3600
        );
    }
}

fn run_tournament(arena: &mut Arena, args: &[String]) -> Result<()> {
    if args.len() < 3 {
        bail!("tournament requires a format and at least two player ids");
    }
    let format_id = &args[0];
    let tournament = arena.create_tournament(format_id)?;
    let tid = tournament.id;

    for id in &args[1..] {
        arena.register(id);
        arena.register_for_tournament(&tid, id)?;
    }
    let started = arena.start_tournament(&tid)?;
    println!(
        "=== {} ({} players) ===",
        started.format.name,
        started.participants.len()
    );

    loop {
        let Some(tournament) = arena.tournament(&tid) else {
            bail!("tournament {} disappeared", tid);
        };
        let round = tournament.current_round;
        println!();
        println!("--- Round {} ---", round);
        if let Some(bye) = tournament.bye_in_round(round) {
            println!("  {} advances on a bye", bye.player_id);
        }

        for pending in arena.pending_matches(&tid)? {
            let record = arena.simulate_tournament_match(&pending.match_id)?;
            println!(
                "  {} beats {} ({:+}, now {})",
                record.winner, record.loser, record.delta.winner, record.winner_rating
            );
        }

        match arena.advance_round(&tid)? {
            RoundOutcome::Advanced { .. } => continue,
            RoundOutcome::Completed(summary) => {
                println!();
                println!("=== Final Standings ===");
                for standing in &summary.standings {
                    println!("  {:>3}. {}", standing.place, standing.player_id);
                }
                if let Some(champion) = &summary.champion {
                    println!("Champion: {}", champion);
                }
                break;
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arena=info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let (options, args) = parse_options(&args)?;

    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        "formats" => {
            show_formats(&open_arena(&options)?);
            return Ok(());
        }
        _ => {}
    }

    let mut arena = open_arena(&options)?;
    match command.as_str() {
        "register" => run_register(&mut arena, rest)?,
        "profile" => show_profile(&arena, rest)?,
        "find" => run_find(&mut arena, rest)?,
        "match" => run_match(&mut arena, rest, false)?,
        "simulate" | "battle" => run_match(&mut arena, rest, true)?,
        "leaderboard" | "elo" => {
            let top = count_flag(rest, &["--top", "-n"], 20);
            if arena.leaderboard().is_empty() {
                println!("No players registered yet. Run `arena register` first!");
            } else {
                print!("{}", arena.leaderboard().render(top));
            }
        }
        "history" => show_history(&arena, rest),
        "tournament" => run_tournament(&mut arena, rest)?,
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            return Ok(());
        }
    }

    save_arena(&arena, &options)
}
