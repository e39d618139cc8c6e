mod args;
mod error;
mod render;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use datagrid::DataTable;
use datagrid::column::Column;
use datagrid::column::ColumnSchema;
use datagrid::model::Row;
use datagrid::query::Direction;
use datagrid::query::OrderBy;
use datagrid::settings::TableConfig;
use datagrid::source::InMemoryRowSource;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::args::Args;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    if let Err(e) = init_logger(&args) {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
    match run(args).await {
        Ok(output) => print!("{output}"),
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn init_logger(args: &Args) -> Result<(), CliError> {
    let result = match &args.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| CliError::io(path, e))?;
            WriteLogger::init(args.log_level, Config::default(), file)
        }
        None => TermLogger::init(
            args.log_level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    };
    result.map_err(|e| CliError::Logger(e.to_string()))
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))
}

/// Every field of the first row as a column, in name order.
fn infer_columns(rows: &[Row]) -> Vec<ColumnSchema> {
    let mut names: Vec<&String> = rows
        .first()
        .map(|row| row.fields().keys().collect())
        .unwrap_or_default();
    names.sort();
    names.into_iter().map(ColumnSchema::new).collect()
}

async fn run(args: Args) -> Result<String, CliError> {
    let rows: Vec<Row> = serde_json::from_str(&read(&args.rows)?)?;
    let mut config = match &args.config {
        Some(path) => TableConfig::from_json(&read(path)?)?,
        None => TableConfig {
            columns: infer_columns(&rows),
            ..TableConfig::default()
        },
    };
    config.settings.client_side = !args.remote;
    if let Some(per_page) = args.per_page {
        config.settings.per_page = per_page;
    }
    log::info!(
        "Loaded {} rows, {} columns",
        rows.len(),
        config.columns.len()
    );

    let columns = Column::from_schemas(config.columns, &config.settings)?;
    let mut table = DataTable::new(config.settings, columns)?;
    if args.remote {
        table = table.with_source(Arc::new(InMemoryRowSource::new(rows)));
    } else {
        table.set_rows(rows);
    }

    for filter in args.filters {
        table.set_filter(&filter.column, filter.value, filter.mode, filter.value_to)?;
    }
    if args.global.is_some() {
        table.set_global_filter(args.global);
    }
    if !args.sorts.is_empty() {
        let mut order = OrderBy::new();
        for sort in &args.sorts {
            let data_type = table
                .column(&sort.column)
                .and_then(|c| c.data_type());
            order = match sort.direction {
                Direction::Asc => order.then_asc(&sort.column, data_type),
                Direction::Desc => order.then_desc(&sort.column, data_type),
            };
        }
        table.set_order(order)?;
    }

    // The page can only be clamped once the server reported the total.
    table.sync_remote().await?;
    table.set_page(args.page);
    table.sync_remote().await?;

    Ok(render::render(&table))
}
