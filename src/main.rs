//! revisit CLI - spaced review scheduling for a folder of notes.

use chrono::{Local, Utc};
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use revisit::config::CONFIG_FILE;
use revisit::content::is_safe_id;
use revisit::dates::format_due;
use revisit::storage::REVISIT_DIR;
use revisit::{
    ContentResolver, JsonFileBackend, ListFilter, Outcome, ReviewStore, SortKey, StoreConfig, TrackedItem,
    VaultResolver, migrate, stats,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod cli;

use cli::{Cli, Command};

type VaultStore = ReviewStore<JsonFileBackend, VaultResolver>;

/// Overdue notes listed above the week calendar before collapsing the rest.
const OVERDUE_PREVIEW: usize = 5;

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("revisit")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("revisit.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_vault_dir(cli: &Cli) -> PathBuf {
    cli.dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(cli: &Cli, vault: &Path) -> Result<StoreConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| vault.join(REVISIT_DIR).join(CONFIG_FILE));
    StoreConfig::load(&path)
}

fn open_store(vault: &Path, config: StoreConfig) -> VaultStore {
    ReviewStore::new(config, JsonFileBackend::for_vault(vault), VaultResolver::new(vault))
}

/// Turn a user-supplied path into a vault-relative id.
fn note_id(vault: &Path, path: &str) -> Result<String> {
    let p = Path::new(path);
    let rel = p.strip_prefix(vault).unwrap_or(p);
    let id = rel.to_string_lossy().replace('\\', "/").trim_start_matches("./").to_string();
    if !is_safe_id(&id) {
        eyre::bail!("Path is outside the notes folder: {}", path);
    }
    Ok(id)
}

fn format_difficulty(difficulty: u8) -> ColoredString {
    let label = format!("D{}", difficulty);
    match difficulty {
        1 | 2 => label.green(),
        3 => label.yellow(),
        _ => label.red(),
    }
}

fn format_when(item: &TrackedItem) -> ColoredString {
    let now = Utc::now();
    let label = format_due(item.next_review, now);
    if item.is_due(now) { label.red() } else { label.normal() }
}

fn print_item_line(item: &TrackedItem) {
    println!(
        "  {} {} {} {}",
        format_difficulty(item.difficulty),
        item.title,
        item.id.cyan(),
        format_when(item)
    );
}

fn heat_char(level: u8) -> &'static str {
    match level {
        0 => "·",
        1 => "░",
        2 => "▒",
        3 => "▓",
        _ => "█",
    }
}

async fn remind(vault: PathBuf, config: StoreConfig, every: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(every);
    let mut last_due: Option<usize> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Reopen each time so edits from other commands are picked up
                let mut store = open_store(&vault, config.clone());
                let due = store.items_to_review().len();
                if last_due != Some(due) {
                    info!("{} notes due", due);
                    if due > 0 {
                        println!("{} {} note(s) to review", "→".blue(), due);
                    }
                    last_due = Some(due);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Reminder loop interrupted");
                break;
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let vault = get_vault_dir(&cli);
    let config = load_config(&cli, &vault).context("Failed to load config")?;

    match cli.command {
        Command::Add { path, interval } => {
            let mut store = open_store(&vault, config);
            let id = note_id(&vault, &path)?;
            if !store.resolver().exists(&id) {
                eyre::bail!("Note not found: {}", vault.join(&id).display());
            }

            let days = interval.unwrap_or_else(|| i64::from(store.config().default_interval));
            store.add_item(&id, days);

            let item = store.get(&id).ok_or_else(|| eyre::eyre!("Note vanished while adding: {}", id))?;
            println!(
                "{} Added: {} (first review {})",
                "✓".green(),
                item.title,
                format_due(item.next_review, Utc::now()).to_lowercase()
            );
        }

        Command::Review { path, outcome } => {
            let outcome: Outcome = outcome.parse()?;
            let mut store = open_store(&vault, config);
            let id = note_id(&vault, &path)?;

            if !store.review_item(&id, outcome) {
                eprintln!("{} Not tracked or note missing: {}", "✗".red(), id);
                std::process::exit(1);
            }

            if let Some(item) = store.get(&id) {
                println!(
                    "{} {} {}: next {} (interval {}d, streak {})",
                    "✓".green(),
                    outcome,
                    item.title,
                    format_due(item.next_review, Utc::now()).to_lowercase(),
                    item.interval,
                    item.streak_count
                );
            }

            let left = store.items_to_review().len();
            if left > 0 {
                println!("{} {} note(s) left to review", "→".blue(), left);
            } else {
                println!("{}", "All caught up".dimmed());
            }
        }

        Command::Remove { path } => {
            let mut store = open_store(&vault, config);
            let id = note_id(&vault, &path)?;
            if store.remove_item(&id) {
                println!("{} Removed: {}", "✓".green(), id.cyan());
            } else {
                println!("{} {} was not tracked", "✓".green(), id.cyan());
            }
        }

        Command::Show { path } => {
            let store = open_store(&vault, config);
            let id = note_id(&vault, &path)?;

            match store.get(&id) {
                Some(item) => {
                    println!("{}: {}", "ID".bold(), item.id.cyan());
                    println!("{}: {}", "Title".bold(), item.title);
                    println!("{}: {}", "Next review".bold(), format_when(&item));
                    println!("{}: {}d", "Interval".bold(), item.interval);
                    println!("{}: {}", "Difficulty".bold(), format_difficulty(item.difficulty));
                    println!("{}: {}", "Reviews".bold(), item.review_count);
                    println!("{}: {}", "Streak".bold(), item.streak_count);
                    println!("{}: {}", "Added".bold(), item.date_added);
                    println!("{}: {}", "Last reviewed".bold(), item.last_reviewed);
                }
                None => {
                    eprintln!("{} Not tracked: {}", "✗".red(), id);
                    std::process::exit(1);
                }
            }
        }

        Command::List { sort, search, overdue } => {
            let sort: SortKey = sort.parse()?;
            let mut store = open_store(&vault, config);
            let all = store.all_items();
            let summary = stats::summary(&all, &Local::now());

            let mut filter = ListFilter::new().sort(sort).overdue_only(overdue);
            if let Some(term) = search {
                filter = filter.search(term);
            }
            let items = filter.apply(all, Utc::now());

            if items.is_empty() {
                println!("{}", "No notes found".dimmed());
            } else {
                println!(
                    "{} tracked, {} overdue, {} due today, avg difficulty {:.1}",
                    summary.total, summary.overdue, summary.due_today, summary.average_difficulty
                );
                for item in &items {
                    print_item_line(item);
                }
            }
        }

        Command::Due { max } => {
            let config = match max {
                Some(n) => config.max_items_per_batch(n),
                None => config,
            };
            let mut store = open_store(&vault, config);
            let items = store.items_to_review();

            if items.is_empty() {
                println!("{}", "Nothing due".dimmed());
            } else {
                println!("{} {} note(s) to review:", "→".blue(), items.len());
                for item in &items {
                    print_item_line(item);
                }
            }
        }

        Command::Stats => {
            let mut store = open_store(&vault, config);
            let items = store.all_items();
            let now = Local::now();

            let summary = stats::summary(&items, &now);
            let activity = stats::activity(&items, &now);
            let maturity = stats::maturity(&items);

            println!("{}: {}", "Tracked".bold(), summary.total);
            println!("{}: {}", "Overdue".bold(), summary.overdue);
            println!("{}: {}", "Due today".bold(), summary.due_today);
            println!("{}: {:.1}", "Avg difficulty".bold(), summary.average_difficulty);
            println!("{}: {}%", "Success rate".bold(), stats::success_rate(&items));
            println!("{}: {}", "Total reviews".bold(), activity.total_reviews);
            println!("{}: {}", "Reviewed (30d)".bold(), activity.recent_reviews);
            println!(
                "{}: {} days (best {})",
                "Streak".bold(),
                activity.current_streak,
                activity.longest_streak
            );
            println!(
                "{}: new {} ({}%), learning {} ({}%), mature {} ({}%)",
                "Maturity".bold(),
                maturity.new.count,
                maturity.new.percent,
                maturity.learning.count,
                maturity.learning.percent,
                maturity.mature.count,
                maturity.mature.percent
            );
        }

        Command::Forecast { days } => {
            let mut store = open_store(&vault, config);
            let items = store.all_items();

            for day in stats::forecast(&items, &Local::now(), days) {
                let bar = "■".repeat(day.count);
                println!("  {} {:>3} {}", day.date.format("%a %d %b"), day.count, bar.blue());
            }
        }

        Command::Calendar { offset } => {
            let mut store = open_store(&vault, config);
            let items = store.all_items();
            let now = Local::now();

            let late = stats::overdue_before_today(&items, &now);
            if !late.is_empty() {
                println!("{} {} overdue:", "!".red(), late.len());
                for item in late.iter().take(OVERDUE_PREVIEW) {
                    print_item_line(item);
                }
                if late.len() > OVERDUE_PREVIEW {
                    println!("  {}", format!("+{} more", late.len() - OVERDUE_PREVIEW).dimmed());
                }
            }

            let today = now.date_naive();
            for day in stats::week_calendar(&items, &now, offset) {
                let label = day.date.format("%a %d %b").to_string();
                let label = if day.date == today { label.bold().blue() } else { label.bold() };
                println!("{} {}", label, format!("({})", day.items.len()).dimmed());
                for item in &day.items {
                    println!("  {} {} {}", format_difficulty(item.difficulty), item.title, item.id.cyan());
                }
            }
        }

        Command::Heatmap { weeks } => {
            let mut store = open_store(&vault, config);
            let items = store.all_items();
            let grid = stats::heatmap(&items, &Local::now(), weeks);

            for (row, label) in ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"].iter().enumerate() {
                let cells: String = grid
                    .iter()
                    .filter_map(|week| week.get(row))
                    .map(|cell| heat_char(cell.level))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("  {} {}", label.dimmed(), cells.green());
            }
        }

        Command::AtRisk { limit } => {
            let mut store = open_store(&vault, config);
            let items = store.all_items();
            let risky = stats::at_risk(&items, limit);

            if risky.is_empty() {
                println!("{}", "No notes at risk".dimmed());
            } else {
                for item in risky {
                    let broken = if item.streak_count == 0 && item.review_count > 0 {
                        " streak broken".red().to_string()
                    } else {
                        String::new()
                    };
                    println!(
                        "  {} {} {}{}",
                        format_difficulty(item.difficulty),
                        item.title,
                        item.id.cyan(),
                        broken
                    );
                }
            }
        }

        Command::Export { output } => {
            let store = open_store(&vault, config);
            let json = store.export_snapshot()?;
            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{} Exported to {}", "✓".green(), path.display());
                }
                None => println!("{}", json),
            }
        }

        Command::Import { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let mut store = open_store(&vault, config);
            store.import_snapshot(&text).context("Import failed")?;
            println!(
                "{} Imported {} note(s)",
                "✓".green(),
                store.collection().len()
            );
        }

        Command::Migrate { legacy, frontmatter } => {
            if legacy.is_none() && !frontmatter {
                eyre::bail!("Nothing to migrate: pass --legacy <file> and/or --frontmatter");
            }

            let mut store = open_store(&vault, config);
            let mut added = 0;

            if let Some(path) = legacy {
                let collection = migrate::from_legacy_file(&path)?;
                added += store.merge_missing(collection.notes);
            }
            if frontmatter {
                let records = migrate::from_frontmatter(&vault, Utc::now())?;
                added += store.merge_missing(records);
            }

            println!("{} Migrated {} note(s)", "✓".green(), added);
        }

        Command::Remind { every } => {
            if !config.notification_enabled {
                println!("{}", "Reminders are disabled in config".dimmed());
                return Ok(());
            }

            println!("{} Watching {} (Ctrl-C to stop)", "→".blue(), vault.display());
            let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
            rt.block_on(remind(vault, config, Duration::from_secs(every.max(1))))?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
