//! Command-line arguments

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use datagrid::model::Value;
use datagrid::query::Direction;
use datagrid::query::MatchMode;
use simplelog::LevelFilter;

use crate::error::CliError;

/// Load rows into a data grid, filter, sort and page them, and print the
/// visible page.
#[derive(Debug, Parser)]
#[command(name = "datagrid")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Table definition (JSON with `settings` and `columns`).
    ///
    /// Without it every field of the first row becomes a text column.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Rows to load (JSON array of objects).
    #[arg(short, long)]
    pub rows: PathBuf,

    /// Column filter as `column:mode:value[:to]`, e.g. `age:gt:10` or
    /// `age:between:10:20`. `in` takes comma separated values.
    #[arg(short, long = "filter")]
    pub filters: Vec<FilterArg>,

    /// Sort key as `column[:asc|desc]`; repeat for secondary keys.
    #[arg(short, long = "sort")]
    pub sorts: Vec<SortArg>,

    /// Text searched in every visible column.
    #[arg(short, long)]
    pub global: Option<String>,

    /// Page to show (1-based).
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page; -1 shows every row.
    #[arg(long, allow_hyphen_values = true)]
    pub per_page: Option<i64>,

    /// Serve the rows through an in-memory row source, as a backend would.
    #[arg(long)]
    pub remote: bool,

    /// Log level (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// A parsed `--filter` value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterArg {
    pub column: String,
    pub mode: MatchMode,
    pub value: Value,
    pub value_to: Option<Value>,
}

impl FromStr for FilterArg {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(4, ':');
        let (Some(column), Some(mode), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CliError::InvalidArg(format!(
                "filter '{s}' is not column:mode:value"
            )));
        };
        let mode: MatchMode = mode.parse()?;
        let value = if mode == MatchMode::In {
            Value::List(value.split(',').map(parse_value).collect())
        } else {
            parse_value(value)
        };
        Ok(Self {
            column: column.to_string(),
            mode,
            value,
            value_to: parts.next().map(parse_value),
        })
    }
}

/// A parsed `--sort` value.
#[derive(Debug, Clone, PartialEq)]
pub struct SortArg {
    pub column: String,
    pub direction: Direction,
}

impl FromStr for SortArg {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match s.rsplit_once(':') {
            Some((column, "asc")) => (column, Direction::Asc),
            Some((column, "desc")) => (column, Direction::Desc),
            Some((_, other)) => {
                return Err(CliError::InvalidArg(format!(
                    "sort direction '{other}' is not asc or desc"
                )));
            }
            None => (s, Direction::Asc),
        };
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }
}

/// Reads a JSON scalar, falling back to plain text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let filter: FilterArg = "age:between:10:20".parse().unwrap();
        assert_eq!(filter.mode, MatchMode::Between);
        assert_eq!(filter.value, Value::Int(10));
        assert_eq!(filter.value_to, Some(Value::Int(20)));

        let filter: FilterArg = "name:contains:an".parse().unwrap();
        assert_eq!(filter.value, Value::from("an"));

        let filter: FilterArg = "id:in:1,2".parse().unwrap();
        assert_eq!(filter.value, Value::List(vec![Value::Int(1), Value::Int(2)]));

        assert!("age".parse::<FilterArg>().is_err());
        assert!("age:near:1".parse::<FilterArg>().is_err());
    }

    #[test]
    fn test_parse_sort() {
        let sort: SortArg = "age:desc".parse().unwrap();
        assert_eq!(sort.direction, Direction::Desc);
        let sort: SortArg = "name".parse().unwrap();
        assert_eq!((sort.column.as_str(), sort.direction), ("name", Direction::Asc));
        assert!("age:up".parse::<SortArg>().is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
