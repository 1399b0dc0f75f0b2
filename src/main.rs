use chrono::{Local, NaiveDate};
use clap::Parser;
use ranking_engine::{
    args::{Args, Command},
    database::{
        db::DbClient,
        db_structs::{ClubStanding, Page, RankingSnapshot}
    },
    error::RankingError,
    model::{
        backfill::BackfillRange,
        ranking_engine::{EngineConfig, RankingEngine},
        structures::discipline::Discipline
    }
};
use std::process::ExitCode;
use strum::IntoEnumIterator;
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine, the environment may already be set
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level);

    match args.command {
        Command::Status => {
            match args.connection_string.as_deref() {
                Some(connection_string) => status(connection_string).await,
                None => println!("Database: not configured (set CONNECTION_STRING)")
            }
            ExitCode::SUCCESS
        }
        command => {
            let Some(connection_string) = args.connection_string.as_deref() else {
                error!("[ERROR] CONNECTION_STRING environment variable must be set (or pass --connection-string)");
                return ExitCode::FAILURE;
            };

            let Some(client) = connect(connection_string).await else {
                return ExitCode::FAILURE;
            };

            match run(command, client).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("[ERROR] {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn init_tracing(log_level: &str) {
    let indicatif_layer = IndicatifLayer::new();
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .try_init();
}

async fn connect(connection_string: &str) -> Option<DbClient> {
    match DbClient::connect(connection_string).await {
        Ok(client) => Some(client),
        Err(e) => {
            error!("[ERROR] Failed to connect to database: {}", e);
            error!("[ERROR] Application cannot start without a valid database connection");
            None
        }
    }
}

async fn run(command: Command, client: DbClient) -> Result<(), RankingError> {
    let today = Local::now().date_naive();

    match command {
        Command::Refresh {
            as_of,
            retention_months
        } => {
            let mut engine = RankingEngine::new(client, EngineConfig { retention_months });
            let summary = engine.refresh(as_of.unwrap_or(today)).await?;

            info!(
                "Refresh of {} complete: {} riders skipped, {} expired rider rows and {} expired club rows deleted",
                summary.snapshot_date,
                summary.rider_errors(),
                summary.deleted.ranking_snapshots,
                summary.deleted.club_ranking_snapshots
            );
        }
        Command::Backfill { from, to, skip_existing } => {
            let to = to.unwrap_or(today);
            let range = BackfillRange {
                from: from.unwrap_or(BackfillRange::lookback(to).from),
                to
            };

            let mut engine = RankingEngine::new(client, EngineConfig::default());
            let summary = engine.backfill(range, skip_existing).await?;

            println!("Event dates:        {}", summary.event_dates);
            println!("Snapshots written:  {}", summary.snapshots_written);
            println!("Rows written:       {}", summary.rows_written);
            println!("Snapshots skipped:  {}", summary.snapshots_skipped);
            println!("Snapshots failed:   {}", summary.snapshot_errors);
            println!("Riders skipped:     {}", summary.rider_errors);
        }
        Command::Standings {
            discipline,
            page,
            per_page,
            clubs,
            json
        } => {
            if clubs {
                let standings = client.get_club_standings(discipline, page, per_page).await?;
                print_club_standings(discipline, &standings, json);
            } else {
                let standings = client.get_standings(discipline, page, per_page).await?;
                print_standings(discipline, &standings, json);
            }
        }
        Command::InitSchema => client.create_snapshot_tables().await?,
        // Handled without a RankingEngine, see `status`
        Command::Status => {}
    }

    Ok(())
}

/// Reports problems as text. Never fails.
async fn status(connection_string: &str) {
    let client = match DbClient::connect(connection_string).await {
        Ok(client) => client,
        Err(e) => {
            println!("Database: unreachable ({})", e);
            return;
        }
    };

    println!("Database: connected");
    println!();
    println!("{:<24} {:<8} {:>10}", "TABLE", "PRESENT", "ROWS");

    let statuses = client.table_statuses().await;
    for table in &statuses {
        let rows = table
            .row_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<8} {:>10}",
            table.name,
            if table.present { "yes" } else { "MISSING" },
            rows
        );
    }

    let snapshots_present = statuses
        .iter()
        .any(|t| t.name == "ranking_snapshots" && t.present);
    if !snapshots_present {
        println!();
        println!("Snapshot tables are missing, run `ranking-engine init-schema`");
        return;
    }

    println!();
    println!("{:<10} {:<12}", "DISCIPLINE", "LATEST");
    for discipline in Discipline::iter() {
        let latest = match client.get_latest_snapshot_date(discipline).await {
            Ok(Some(date)) => date.to_string(),
            Ok(None) => "never".to_string(),
            Err(e) => format!("unknown ({})", e)
        };
        println!("{:<10} {:<12}", discipline, latest);
    }
}

fn print_header(discipline: Discipline, snapshot_date: Option<NaiveDate>, page: i64, total_pages: i64) -> bool {
    let Some(snapshot_date) = snapshot_date else {
        println!("No {} snapshot has been computed yet", discipline);
        return false;
    };

    println!("{} standings as of {} (page {} of {})", discipline, snapshot_date, page, total_pages);
    true
}

fn format_change(change: Option<i32>) -> String {
    match change {
        None => "new".to_string(),
        Some(0) => "=".to_string(),
        Some(c) if c > 0 => format!("+{}", c),
        Some(c) => c.to_string()
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("[ERROR] Failed to serialize standings: {}", e)
    }
}

fn print_standings(discipline: Discipline, standings: &Page<RankingSnapshot>, json: bool) {
    if json {
        print_json(standings);
        return;
    }

    if !print_header(discipline, standings.snapshot_date, standings.page, standings.total_pages()) {
        return;
    }

    println!(
        "{:>5} {:>8} {:>10} {:>10} {:>10} {:>7} {:>6}",
        "POS", "RIDER", "TOTAL", "LAST 12", "13-24", "EVENTS", "CHANGE"
    );
    for row in &standings.items {
        println!(
            "{:>5} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>7} {:>6}",
            row.ranking_position,
            row.rider_id,
            row.total_ranking_points,
            row.points_last_12_months,
            row.points_months_13_24,
            row.events_count,
            format_change(row.position_change)
        );
    }
}

fn print_club_standings(discipline: Discipline, standings: &Page<ClubStanding>, json: bool) {
    if json {
        print_json(standings);
        return;
    }

    if !print_header(discipline, standings.snapshot_date, standings.page, standings.total_pages()) {
        return;
    }

    println!(
        "{:>5} {:<28} {:>10} {:>7} {:>7} {:>6}",
        "POS", "CLUB", "TOTAL", "RIDERS", "EVENTS", "CHANGE"
    );
    for row in &standings.items {
        let club = &row.snapshot;
        let name = row
            .club_name
            .clone()
            .unwrap_or_else(|| format!("#{}", club.club_id));
        println!(
            "{:>5} {:<28} {:>10.2} {:>7} {:>7} {:>6}",
            club.ranking_position,
            name,
            club.total_ranking_points,
            club.riders_count,
            club.events_count,
            format_change(club.position_change)
        );
    }
}
