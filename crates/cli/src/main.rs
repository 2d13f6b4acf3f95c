use crate::{
    commands::{ColumnSpec, SourceArgs},
    error::CliError,
};
use clap::Parser;
use commands::Commands;
use connectors::{
    adapter::{ReaderKind, open_reader},
    import::{count_rows, drive},
    reader::TabularReader,
};
use model::{core::data_type::DataType, records::row::RowData};
use std::{convert::Infallible, ops::ControlFlow};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "tabread", version = "0.1.0", about = "Tabular source reader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), CliError> {
    // Logs go to stderr so JSON on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            source,
            columns,
            limit,
            output,
        } => {
            let rows = inspect(&source, &columns, limit)?;
            output::emit(&rows, output.as_deref())?;
        }
        Commands::Count { source } => {
            let mut reader = build_reader(&source)?;
            let rows = count_rows(reader.as_mut(), &source.conn_str, source.hint())?;
            println!("{rows}");
        }
        Commands::Columns { source } => {
            let names = columns(&source)?;
            output::print_json(&names)?;
        }
    }

    Ok(())
}

fn build_reader(source: &SourceArgs) -> Result<Box<dyn TabularReader + Send>, CliError> {
    let kind = ReaderKind::resolve(source.format.as_deref(), &source.conn_str)?;
    let settings = source.reader_settings()?;
    info!("Reading '{}' as {}", source.hint(), kind);
    Ok(open_reader(kind, settings)?)
}

fn inspect(
    source: &SourceArgs,
    specs: &[ColumnSpec],
    limit: Option<u64>,
) -> Result<Vec<RowData>, CliError> {
    let mut reader = build_reader(source)?;
    let requested: Option<Vec<(String, DataType)>> = (!specs.is_empty()).then(|| {
        specs
            .iter()
            .map(|spec| (spec.name.clone(), spec.data_type))
            .collect()
    });

    let mut rows = Vec::new();
    let mut all_columns: Option<Vec<(String, DataType)>> = None;

    drive(reader.as_mut(), &source.conn_str, source.hint(), |r| {
        let columns = match &requested {
            Some(columns) => columns,
            None => &*all_columns.get_or_insert_with(|| {
                r.columns()
                    .iter()
                    .map(|name| (name.clone(), DataType::String))
                    .collect()
            }),
        };
        rows.push(r.snapshot(columns));

        let done = limit.is_some_and(|limit| rows.len() as u64 >= limit);
        Ok::<_, Infallible>(if done {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        })
    })?;

    Ok(rows)
}

/// Header names, or the synthetic names of the first record when the source
/// has no header row.
fn columns(source: &SourceArgs) -> Result<Vec<String>, CliError> {
    let mut reader = build_reader(source)?;
    reader.initialize();

    let result = read_column_names(reader.as_mut(), source);
    reader.close();
    result
}

fn read_column_names(
    reader: &mut (dyn TabularReader + Send),
    source: &SourceArgs,
) -> Result<Vec<String>, CliError> {
    reader.read(&source.conn_str, source.hint())?;
    if reader.columns().is_empty() {
        reader.read_record()?;
    }
    Ok(reader.columns().to_vec())
}
