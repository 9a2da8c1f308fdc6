use serde_json::json;

use crate::cli::context::Context;
use crate::cli::OutputFormat;
use crate::guard::{self, Navigation, Route};

fn describe(route: &Route) -> String {
    match route {
        Route::Login => "login".to_string(),
        Route::Dashboard => "dashboard".to_string(),
        Route::Resource(resource) => resource.name.to_string(),
        Route::Other(path) => path.clone(),
    }
}

pub async fn handle(path: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;
    let navigation = guard::resolve(&path, &ctx.session);

    match output_format {
        OutputFormat::Json => {
            let body = match &navigation {
                Navigation::Allow(route) => json!({ "outcome": "allow", "page": describe(route) }),
                Navigation::Redirect { to, from } => json!({ "outcome": "redirect", "to": to, "from": from }),
                Navigation::NotFound(path) => json!({ "outcome": "not_found", "path": path }),
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => match &navigation {
            Navigation::Allow(route) => println!("Open: {}", describe(route)),
            Navigation::Redirect { to, .. } => println!("Redirect: {}", to),
            Navigation::NotFound(path) => println!("Not found: {}", path),
        },
    }

    Ok(())
}
