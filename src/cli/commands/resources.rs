use serde_json::json;

use crate::catalog::{self, FieldKind};
use crate::cli::context::resolve_resource;
use crate::cli::OutputFormat;

fn kind_name(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::Number => "number".to_string(),
        FieldKind::Date => "date".to_string(),
        FieldKind::Image => "image".to_string(),
        FieldKind::Select(options) => format!("one of: {}", options.join(" / ")),
    }
}

pub async fn handle(resource: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    match resource {
        None => match output_format {
            OutputFormat::Json => {
                let list: Vec<_> = catalog::all()
                    .iter()
                    .map(|r| json!({ "slug": r.slug, "name": r.name, "path": r.path }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json!({ "resources": list }))?);
            }
            OutputFormat::Text => {
                let width = catalog::all().iter().map(|r| r.slug.len()).max().unwrap_or(0);
                for r in catalog::all() {
                    println!("{:<width$}  {}", r.slug, r.name, width = width);
                }
            }
        },
        Some(slug) => {
            let resource = resolve_resource(&slug)?;
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(resource)?);
                }
                OutputFormat::Text => {
                    println!("{} ({})", resource.name, resource.path);
                    for field in resource.fields {
                        println!(
                            "  {}{:<22} {:<20} {}",
                            if field.required { "*" } else { " " },
                            field.name,
                            field.label,
                            kind_name(field.kind)
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
