//! matchstats CLI
//!
//! Command-line interface for player match statistics:
//! - Run any of the named statistics for a player
//! - Print the composed pipeline instead of running it (`--explain`)
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use matchstats::config::{Config, LoggingConfig, StoreBackend, StoreConfig};
use matchstats::stats::{GroupedResult, StatsQuery, StatsService};
use matchstats::store::{MatchStore, MemoryStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "matchstats")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Player statistics from per-match performance records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Match records file (JSON array or JSON lines); selects the memory store
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Print the composed pipeline without running it
    #[arg(long, global = true)]
    pub explain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Most played champions
    Champions {
        /// Player id
        puuid: String,
        /// Number of champions (default: query.default_limit)
        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Results per champion class
    Classes {
        /// Player id
        puuid: String,
    },

    /// Full per-champion breakdown
    Complete {
        /// Player id
        puuid: String,
        /// Restrict to one queue (gamemode code)
        #[arg(short, long)]
        queue: Option<i64>,
    },

    /// Results per game mode
    Gamemodes {
        /// Player id
        puuid: String,
    },

    /// Totals over all matches
    Global {
        /// Player id
        puuid: String,
    },

    /// Results per lane
    Roles {
        /// Player id
        puuid: String,
    },

    /// Most frequent teammates
    Mates {
        /// Player id
        puuid: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (puuid, query) = match &cli.command {
        Commands::Config { output } => return write_default_config(output.as_deref()),
        Commands::Champions { puuid, limit } => {
            (puuid, StatsQuery::ChampionStats { limit: *limit })
        }
        Commands::Classes { puuid } => (puuid, StatsQuery::ChampionClassStats),
        Commands::Complete { puuid, queue } => {
            (puuid, StatsQuery::ChampionCompleteStats { queue: *queue })
        }
        Commands::Gamemodes { puuid } => (puuid, StatsQuery::GamemodeStats),
        Commands::Global { puuid } => (puuid, StatsQuery::GlobalStats),
        Commands::Roles { puuid } => (puuid, StatsQuery::RoleStats),
        Commands::Mates { puuid } => (puuid, StatsQuery::Mates),
    };

    // The configured subscriber needs the config, so loading logs through a
    // stderr-only one that shows warnings unless RUST_LOG says otherwise
    let bootstrap = bootstrap_subscriber(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matchstats=warn")),
        std::io::stderr,
    );
    let mut config = tracing::subscriber::with_default(bootstrap, || match &cli.config {
        Some(path) => Config::load_with_env(path),
        None => Ok(Config::load_default()),
    })?;
    if let Some(data) = &cli.data {
        config.store.backend = StoreBackend::Memory;
        config.store.data_file = data.to_string_lossy().to_string();
    }
    init_logging(&config.logging)?;

    if cli.explain {
        let pipeline = query.pipeline(puuid, config.query.default_limit)?;
        println!("{}", serde_json::to_string_pretty(&pipeline)?);
        return Ok(());
    }

    let store = open_store(&config.store).await?;
    let service = StatsService::new(store).with_default_limit(config.query.default_limit);
    let rows = service.run(puuid, query).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => print_csv(&rows)?,
        OutputFormat::Table => print_table(&rows),
    }

    Ok(())
}

fn bootstrap_subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}

fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("matchstats={}", logging.level)));

    // Logs go to stderr (or a file) so stdout stays machine readable
    let writer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    match logging.format.as_str() {
        "json" => builder.json().init(),
        _ => builder.init(),
    }
    Ok(())
}

async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn MatchStore>> {
    match config.backend {
        StoreBackend::Memory => {
            let path = expand_home(&config.data_file);
            let store = MemoryStore::open(&path)
                .await
                .with_context(|| format!("Failed to load match records from {:?}", path))?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "mongodb")]
        StoreBackend::Mongodb => {
            let store = matchstats::store::MongoStore::connect(
                &config.mongodb_uri,
                &config.database,
                &config.collection,
            )
            .await
            .context("Failed to connect to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb"))]
        StoreBackend::Mongodb => {
            anyhow::bail!("MongoDB store requested but matchstats was built without the `mongodb` feature")
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let content = matchstats::config::generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write config to {:?}", path))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Column names in first-seen order across all rows, plus a win rate column
fn columns(rows: &[GroupedResult]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.to_document().keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns.push("winrate".to_string());
    columns
}

fn cells(row: &GroupedResult, columns: &[String]) -> Vec<String> {
    let doc = row.to_document();
    columns
        .iter()
        .map(|column| match column.as_str() {
            "winrate" => row
                .win_rate()
                .map(|r| format!("{:.1}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            key => doc.get(key).map(format_cell).unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| format!("{:.2}", f))
            .unwrap_or_else(|| n.to_string()),
        Value::Object(map) => match map.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

fn print_table(rows: &[GroupedResult]) {
    if rows.is_empty() {
        println!("No matching records");
        return;
    }

    let columns = columns(rows);
    let table: Vec<Vec<String>> = rows.iter().map(|row| cells(row, &columns)).collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            table
                .iter()
                .map(|cells| cells[i].len())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", line(&columns));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1)));
    for cells in &table {
        println!("{}", line(cells));
    }
}

fn print_csv(rows: &[GroupedResult]) -> anyhow::Result<()> {
    let columns = columns(rows);
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(cells(row, &columns))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Clone)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_loading_warnings_are_visible() {
        let buffer = LogBuffer(Arc::new(Mutex::new(Vec::new())));
        let writer = buffer.clone();
        let subscriber =
            bootstrap_subscriber(EnvFilter::new("matchstats=warn"), move || writer.clone());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\ndefault_limit = 3").unwrap();
        let path = file.path().to_path_buf();

        let config = tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "matchstats::config", "Ignoring MATCHSTATS_DEFAULT_LIMIT");
            tracing::info!(target: "matchstats::config", "Loaded config");
            Config::load(&path)
        })
        .unwrap();
        assert_eq!(config.query.default_limit, 3);

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Ignoring MATCHSTATS_DEFAULT_LIMIT"), "logs: {}", logs);
        assert!(!logs.contains("Loaded config"), "logs: {}", logs);
    }

    #[test]
    fn test_cli_parses_query_flags() {
        let cli = Cli::parse_from([
            "matchstats", "champions", "p1", "--limit", "3", "--format", "csv", "--explain",
        ]);
        assert!(cli.explain);
        assert_eq!(cli.format, OutputFormat::Csv);
        assert!(matches!(
            cli.command,
            Commands::Champions { ref puuid, limit: Some(3) } if puuid == "p1"
        ));
    }
}
