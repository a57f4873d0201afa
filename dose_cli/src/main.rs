use clap::{Parser, Subcommand};
use dose_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dosetrack")]
#[command(about = "Medication adherence tracker with care stars and streaks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act on this day (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    date: Option<CalendarDay>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the doses due today and their status (default)
    Today,

    /// Log doses as taken, by list number or id
    Take {
        /// List numbers or dose ids from `today`
        #[arg(required_unless_present = "all")]
        doses: Vec<String>,

        /// Log every dose still outstanding
        #[arg(long, conflicts_with = "doses")]
        all: bool,
    },

    /// Show care stars and streak
    Stats,

    /// Preview upcoming doses
    Schedule {
        /// Number of days to show
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Erase all logged doses, stars and streak
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    dose_core::logging::init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let day = cli.date.unwrap_or_else(CalendarDay::today);
    tracing::debug!("Using data dir {:?} for {}", data_dir, day);

    let mut tracker = Tracker::open(data_dir, &config);

    match cli.command {
        Some(Commands::Today) | None => cmd_today(&tracker, day),
        Some(Commands::Take { doses, all }) => cmd_take(&mut tracker, day, &doses, all),
        Some(Commands::Stats) => cmd_stats(&tracker),
        Some(Commands::Schedule { days }) => cmd_schedule(&tracker, day, days),
        Some(Commands::Reset { yes }) => cmd_reset(&mut tracker, yes),
    }
}

fn cmd_today(tracker: &Tracker<FileStore>, day: CalendarDay) -> Result<()> {
    let view = tracker.day_view(day)?;
    let progress = tracker.progress()?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", day.human());
    println!("╰─────────────────────────────────────────╯");
    println!();

    for (number, entry) in view.entries.iter().enumerate() {
        let obligation = &entry.obligation;
        let status = if entry.taken { "Logged" } else { "Not logged yet" };
        println!(
            "  {}. {:<8} {}  ({})",
            number + 1,
            obligation.time_of_day,
            obligation.label(),
            obligation.cadence_note
        );
        println!("     {}  [{}]", obligation.id, status);
    }

    println!();
    println!("  {}", status_message(&view.status));
    println!();
    display_progress(&progress);
    Ok(())
}

fn cmd_take(
    tracker: &mut Tracker<FileStore>,
    day: CalendarDay,
    doses: &[String],
    all: bool,
) -> Result<()> {
    let logged = if all {
        tracker.on_all_doses_logged(day)?
    } else {
        // Reject the whole batch before logging anything
        for reference in doses {
            tracker.resolve_dose(day, reference)?;
        }
        let mut logged = Vec::with_capacity(doses.len());
        for reference in doses {
            logged.push(tracker.on_dose_logged(day, reference)?);
        }
        logged
    };

    if logged.is_empty() {
        println!("Nothing left to log for {}.", day);
    }

    for dose in &logged {
        let obligation = &dose.obligation;
        match &dose.outcome {
            MarkOutcome::AlreadyLogged => {
                println!(
                    "  Already logged: {} ({})",
                    obligation.label(),
                    obligation.time_of_day
                );
            }
            MarkOutcome::Logged(update) => {
                println!(
                    "✓ Logged {} ({})  +1 Care Star",
                    obligation.label(),
                    obligation.time_of_day
                );
                if update.day_completed {
                    println!();
                    println!("★ Full day complete. You showed up for yourself today.");
                    println!("  Streak: {} day(s)", update.progress.current_streak);
                }
            }
        }
    }

    let view = tracker.day_view(day)?;
    println!();
    println!("  {}", status_message(&view.status));
    Ok(())
}

fn cmd_stats(tracker: &Tracker<FileStore>) -> Result<()> {
    let progress = tracker.progress()?;
    display_progress(&progress);
    match progress.last_full_day {
        Some(last) => println!("  Last full day: {}", last.human()),
        None => println!("  Last full day: never"),
    }
    Ok(())
}

fn cmd_schedule(tracker: &Tracker<FileStore>, from: CalendarDay, days: u32) -> Result<()> {
    for (day, obligations) in tracker.completions().regimen().obligations_between(from, days) {
        println!("{}", day.human());
        if obligations.is_empty() {
            println!("  (nothing due)");
        }
        for obligation in obligations {
            println!(
                "  {:<8} {}  ({})",
                obligation.time_of_day,
                obligation.label(),
                obligation.cadence_note
            );
        }
        println!();
    }
    Ok(())
}

fn cmd_reset(tracker: &mut Tracker<FileStore>, yes: bool) -> Result<()> {
    if !yes && !confirm_reset()? {
        println!("Reset cancelled.");
        return Ok(());
    }

    tracker.on_reset_requested()?;
    println!("✓ All stars, streaks and logged doses have been reset.");
    Ok(())
}

fn display_progress(progress: &ProgressState) {
    println!("  Care Stars: {}", progress.total_points);
    println!("  Streak: {} day(s)", progress.current_streak);
}

fn status_message(status: &DayStatus) -> String {
    match *status {
        DayStatus::NothingDue => {
            "No doses scheduled today. Keep following your doctor's advice.".into()
        }
        DayStatus::NotStarted { .. } => {
            "No doses logged yet today. Start with just one, that's already a win.".into()
        }
        DayStatus::InProgress { done, total } => {
            format!("You've logged {} of {} today. Every single one matters.", done, total)
        }
        DayStatus::Complete { .. } => "You completed all of today's doses.".into(),
    }
}

fn confirm_reset() -> Result<bool> {
    println!("This will reset ALL stars, streak, and logged dose history.");
    println!("Use this only if you really want to start over.");
    print!("Continue? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
