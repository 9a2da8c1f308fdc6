use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::info;

use crate::api::HttpBackend;
use crate::catalog::Record;
use crate::cli::context::Context;
use crate::cli::utils::{output_empty_collection, output_success, prompt_yes_no, render_table};
use crate::cli::OutputFormat;
use crate::crud::{CrudModule, DeleteOutcome};
use crate::export::{self, ExportFormat};

#[derive(Subcommand)]
pub enum RecordCommands {
    #[command(about = "List records, optionally filtered by a search term")]
    List {
        #[arg(help = "Resource slug")]
        resource: String,
        #[arg(long, short, help = "Case-insensitive search across every field")]
        search: Option<String>,
    },

    #[command(about = "Show a single record")]
    Show {
        #[arg(help = "Resource slug")]
        resource: String,
        #[arg(help = "Record id")]
        id: String,
    },

    #[command(about = "Create a record from field=value pairs or JSON on stdin")]
    Create {
        #[arg(help = "Resource slug")]
        resource: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field assignment, repeatable")]
        assignments: Vec<String>,
        #[arg(long, help = "Read a JSON object from stdin")]
        stdin: bool,
    },

    #[command(about = "Edit a record; unspecified fields keep their current values")]
    Update {
        #[arg(help = "Resource slug")]
        resource: String,
        #[arg(help = "Record id")]
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", help = "Field assignment, repeatable")]
        assignments: Vec<String>,
        #[arg(long, help = "Read a JSON object from stdin")]
        stdin: bool,
    },

    #[command(about = "Delete a record after confirmation")]
    Delete {
        #[arg(help = "Resource slug")]
        resource: String,
        #[arg(help = "Record id")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Export the (filtered) list to a file")]
    Export {
        #[arg(help = "Resource slug")]
        resource: String,
        #[arg(help = "Output file")]
        output: PathBuf,
        #[arg(long, short, help = "Only export records matching this term")]
        search: Option<String>,
        #[arg(long, value_enum, help = "File format (defaults to the file extension, then csv)")]
        format: Option<ExportFormat>,
    },
}

pub async fn handle(cmd: RecordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;

    match cmd {
        RecordCommands::List { resource, search } => {
            let mut module = ctx.module(&resource)?;
            module.load().await?;
            let records = module.filtered(search.as_deref().unwrap_or(""));

            if records.is_empty() {
                return output_empty_collection(&output_format, "records", "No records found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "records": records }))?);
                }
                OutputFormat::Text => {
                    print!("{}", render_table(module.resource(), &records, ctx.offset()));
                    println!("\n{} of {} records", records.len(), module.records().len());
                }
            }
            Ok(())
        }

        RecordCommands::Show { resource, id } => {
            let mut module = ctx.module(&resource)?;
            module.load().await?;
            let record = module
                .record(&id)
                .ok_or_else(|| anyhow!("No {} record with id '{}'", module.resource().name, id))?;

            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
                OutputFormat::Text => {
                    println!("ID: {}", id);
                    for field in module.resource().fields {
                        let cell = export::display_cell(record, field.name, field.kind, ctx.offset());
                        println!("{}: {}", field.label, cell);
                    }
                }
            }
            Ok(())
        }

        RecordCommands::Create { resource, assignments, stdin } => {
            let mut module = ctx.module(&resource)?;
            let input = if stdin { Some(read_stdin_object()?) } else { None };

            let offset = ctx.offset();
            let draft = module.open_create()?;
            if let Some(object) = &input {
                draft.apply_json(object, offset);
            }
            draft.apply_assignments(assignments.iter().map(String::as_str))?;

            module.submit().await?;
            info!("Created {} record", resource);
            output_success(
                &output_format,
                &format!("{} record created", module.resource().name),
                Some(json!({ "count": module.records().len() })),
            )
        }

        RecordCommands::Update { resource, id, assignments, stdin } => {
            let mut module = ctx.module(&resource)?;
            let input = if stdin { Some(read_stdin_object()?) } else { None };
            module.load().await?;

            let offset = ctx.offset();
            let draft = module.open_edit(&id)?;
            if let Some(object) = &input {
                draft.apply_json(object, offset);
            }
            draft.apply_assignments(assignments.iter().map(String::as_str))?;

            module.submit().await?;
            output_success(
                &output_format,
                &format!("{} record {} updated", module.resource().name, id),
                None,
            )
        }

        RecordCommands::Delete { resource, id, yes } => {
            let mut module = ctx.module(&resource)?;
            module.load().await?;

            let mut confirmer = |message: &str| yes || prompt_yes_no(message);
            match module.request_delete(&id, &mut confirmer).await? {
                DeleteOutcome::Deleted => output_success(
                    &output_format,
                    &format!("{} record {} deleted", module.resource().name, id),
                    None,
                ),
                DeleteOutcome::Declined => {
                    output_success(&output_format, "Delete cancelled", Some(json!({ "deleted": false })))
                }
            }
        }

        RecordCommands::Export { resource, output, search, format } => {
            let mut module = ctx.module(&resource)?;
            module.load().await?;
            let format = format.unwrap_or_else(|| format_for(&output));
            let written = export_to(&module, &output, search.as_deref().unwrap_or(""), format, &ctx)?;

            output_success(
                &output_format,
                &format!("Exported {} records to {}", written, output.display()),
                Some(json!({ "count": written, "format": format.extension() })),
            )
        }
    }
}

fn format_for(path: &Path) -> ExportFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => ExportFormat::Pdf,
        _ => ExportFormat::Csv,
    }
}

fn export_to(
    module: &CrudModule<HttpBackend>,
    output: &Path,
    term: &str,
    format: ExportFormat,
    ctx: &Context,
) -> anyhow::Result<usize> {
    let records = module.filtered(term);
    let file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    Ok(export::write(format, BufWriter::new(file), module.resource(), &records, ctx.offset())?)
}

fn read_stdin_object() -> anyhow::Result<Record> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    parse_object(&input)
}

fn parse_object(input: &str) -> anyhow::Result<Record> {
    match serde_json::from_str::<Value>(input).context("Invalid JSON on stdin")? {
        Value::Object(object) => Ok(object),
        _ => Err(anyhow!("Expected a JSON object on stdin")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(format_for(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(format_for(Path::new("out.JSON")), ExportFormat::Json);
        assert_eq!(format_for(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(format_for(Path::new("report.pdf")), ExportFormat::Pdf);
        assert_eq!(format_for(Path::new("out")), ExportFormat::Csv);
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        assert!(parse_object(r#"{"name": "Ravi"}"#).is_ok());
        assert!(parse_object("[1, 2]").is_err());
        assert!(parse_object("not json").is_err());
    }
}
