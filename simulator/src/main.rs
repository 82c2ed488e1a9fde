use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use paydraw_execution::{run_rng, summarize, DrawController, DrawSession};
use paydraw_simulator::{
    generate_tickets, load_config, outcome_json, session_json, ticket_source, write_tickets,
    FailureReport, SummaryReport, TextReport, TicketFormat,
};
use paydraw_types::NumberDomain;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lottery draws constrained to a payout band")]
struct Args {
    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw winning numbers for a ticket pool.
    Draw {
        /// YAML draw configuration.
        #[arg(long)]
        config: PathBuf,

        /// Sold tickets.
        #[arg(long)]
        tickets: PathBuf,

        /// Ticket file format (guessed from the extension when omitted).
        #[arg(long, value_enum)]
        format: Option<TicketFormat>,

        /// Seed for replayable draws (random when omitted).
        #[arg(long)]
        seed: Option<u64>,

        /// Number of draws; later draws avoid earlier ones when the similarity guard is on.
        #[arg(long, default_value_t = 1)]
        runs: u64,

        /// Print JSON instead of the text report.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Winners listed per text report.
        #[arg(long, default_value_t = 20)]
        max_winners: usize,
    },
    /// Write a random ticket pool.
    Generate {
        #[arg(long)]
        count: usize,

        #[arg(long)]
        arity: usize,

        #[arg(long, default_value_t = 1)]
        min: u16,

        #[arg(long)]
        max: u16,

        #[arg(long)]
        out: PathBuf,

        /// Output format (guessed from the extension when omitted).
        #[arg(long, value_enum)]
        format: Option<TicketFormat>,

        #[arg(long)]
        seed: Option<u64>,

        /// Never write the same set of numbers twice.
        #[arg(long, default_value_t = false)]
        unique: bool,
    },
}

fn init_tracing(level: LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_draw(
    config: PathBuf,
    tickets: PathBuf,
    format: Option<TicketFormat>,
    seed: Option<u64>,
    runs: u64,
    json: bool,
    max_winners: usize,
) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }
    let draw_config = load_config(&config)?;
    let format = format.unwrap_or_else(|| TicketFormat::from_path(&tickets));
    let source = ticket_source(&tickets, format);
    let controller = DrawController::load(draw_config, source.as_ref())
        .with_context(|| format!("Could not prepare draw for {}", tickets.display()))?;
    info!(
        tickets = controller.pool().len(),
        total_sales = controller.total_sales(),
        band_min = controller.band().min,
        band_max = controller.band().max,
        "ticket pool loaded"
    );

    let seed = seed.unwrap_or_else(rand::random);
    info!(seed, runs, "drawing");
    let mut session = DrawSession::new(controller);
    let results = session.run_many(runs, seed);
    let summary = summarize(&results);

    let settings = session.controller().config();
    if json {
        let rendered = match results.as_slice() {
            [Ok(outcome)] => outcome_json(outcome)?,
            _ => session_json(&results, &summary)?,
        };
        println!("{rendered}");
    } else {
        for (run, result) in results.iter().enumerate() {
            if runs > 1 {
                println!("== run {} ==", run + 1);
            }
            match result {
                Ok(outcome) => print!(
                    "{}",
                    TextReport {
                        outcome,
                        tiers: &settings.tiers,
                        domain: settings.domain,
                        max_winners,
                    }
                ),
                Err(error) => print!(
                    "{}",
                    FailureReport {
                        error,
                        domain: settings.domain,
                    }
                ),
            }
        }
        if runs > 1 {
            print!("{}", SummaryReport(&summary));
        }
    }

    if summary.failed > 0 {
        warn!(failed = summary.failed, runs, "some draws found no payout inside the band");
    }
    if summary.accepted == 0 {
        bail!("no draw landed inside the payout band (seed {seed})");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    count: usize,
    arity: usize,
    min: u16,
    max: u16,
    out: PathBuf,
    format: Option<TicketFormat>,
    seed: Option<u64>,
    unique: bool,
) -> Result<()> {
    let domain = NumberDomain::new(min, max);
    let seed = seed.unwrap_or_else(rand::random);
    let tickets = generate_tickets(&mut run_rng(seed, 0), count, arity, domain, unique)
        .context("Could not generate tickets")?;
    let format = format.unwrap_or_else(|| TicketFormat::from_path(&out));
    write_tickets(&out, &tickets, format, domain)?;
    info!(count, arity, %domain, seed, path = %out.display(), "tickets written");
    Ok(())
}

fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    init_tracing(args.log_level);

    match args.command {
        Command::Draw {
            config,
            tickets,
            format,
            seed,
            runs,
            json,
            max_winners,
        } => run_draw(config, tickets, format, seed, runs, json, max_winners),
        Command::Generate {
            count,
            arity,
            min,
            max,
            out,
            format,
            seed,
            unique,
        } => run_generate(count, arity, min, max, out, format, seed, unique),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_draw_command() {
        let args = Args::parse_from([
            "paydraw",
            "draw",
            "--config",
            "draw.yaml",
            "--tickets",
            "tickets.txt",
            "--format",
            "tokens",
            "--seed",
            "7",
            "--runs",
            "3",
            "--json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.log_level, LevelFilter::DEBUG);
        match args.command {
            Command::Draw {
                format,
                seed,
                runs,
                json,
                max_winners,
                ..
            } => {
                assert_eq!(format, Some(TicketFormat::Tokens));
                assert_eq!(seed, Some(7));
                assert_eq!(runs, 3);
                assert!(json);
                assert_eq!(max_winners, 20);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_generate_command_with_defaults() {
        let args = Args::parse_from([
            "paydraw", "generate", "--count", "100", "--arity", "5", "--max", "99", "--out",
            "tickets.json",
        ]);
        assert_eq!(args.log_level, LevelFilter::INFO);
        match args.command {
            Command::Generate {
                count,
                min,
                max,
                unique,
                format,
                ..
            } => {
                assert_eq!(count, 100);
                assert_eq!((min, max), (1, 99));
                assert!(!unique);
                assert_eq!(format, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn generate_then_draw_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let tickets = dir.path().join("tickets.txt");
        run_generate(200, 5, 1, 40, tickets.clone(), None, Some(3), true).unwrap();

        let config = dir.path().join("draw.yaml");
        std::fs::write(
            &config,
            "ticket_price: 2\nticket_arity: 5\nnumber_domain: { min: 1, max: 40 }\n\
             prize_tiers:\n  - { match_count: 3, prize: { multiplier: 10 } }\n  - { match_count: 2, prize: { multiplier: 1 } }\n\
             min_payout_percent: 0.3\nmax_payout_percent: 0.6\nadjust_multipliers: true\n",
        )
        .unwrap();
        run_draw(config, tickets, None, Some(9), 2, true, 5).unwrap();
    }

    #[test]
    fn exhausted_json_draw_fails() {
        let dir = tempfile::tempdir().unwrap();
        let tickets = dir.path().join("tickets.txt");
        std::fs::write(&tickets, "01 02 03 04 05\n06 07 08 09 10\n").unwrap();

        let config = dir.path().join("draw.yaml");
        std::fs::write(
            &config,
            "ticket_price: 5\nticket_arity: 5\nnumber_domain: { min: 1, max: 10 }\n\
             prize_tiers:\n  - { match_count: 3, prize: { fixed: 10 } }\n\
             min_payout_percent: 0.1\nmax_payout_percent: 0.2\nmax_attempts: 3\n\
             ticket_match_ceiling: 1\n",
        )
        .unwrap();
        let err = run_draw(config, tickets, None, Some(4), 1, true, 5).unwrap_err();
        assert!(err.to_string().contains("no draw landed inside the payout band"));
    }
}
