use serde_json::json;

use crate::catalog;
use crate::cli::context::Context;
use crate::cli::OutputFormat;
use crate::dashboard;
use crate::guard::DASHBOARD_PATH;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    ctx.require(DASHBOARD_PATH)?;

    let backend = ctx.backend()?;
    let counts = dashboard::summarize(&backend, catalog::all()).await;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "resources": counts }))?);
        }
        OutputFormat::Text => {
            let width = counts.iter().map(|c| c.name.len()).max().unwrap_or(0);
            for count in &counts {
                match (count.count, &count.error) {
                    (Some(n), _) => println!("{:<width$}  {}", count.name, n, width = width),
                    (None, Some(e)) => println!("{:<width$}  error: {}", count.name, e, width = width),
                    (None, None) => println!("{:<width$}  -", count.name, width = width),
                }
            }
        }
    }
    Ok(())
}
