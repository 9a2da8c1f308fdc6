use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use serde_json::json;

use crate::catalog::FieldKind;
use crate::cli::context::Context;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::upload::ImageUploader;

#[derive(Args)]
pub struct UploadArgs {
    #[arg(help = "Image file to upload")]
    pub file: PathBuf,

    #[arg(
        long,
        value_name = "RESOURCE:ID:FIELD",
        help = "Store the uploaded URL in an image field of an existing record"
    )]
    pub into: Option<String>,
}

/// Target of `--into`, e.g. `customers:64f0c2:photoUrl`
#[derive(Debug, PartialEq)]
struct Target {
    resource: String,
    id: String,
    field: String,
}

fn parse_target(value: &str) -> anyhow::Result<Target> {
    let mut parts = value.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(resource), Some(id), Some(field))
            if !resource.is_empty() && !id.is_empty() && !field.is_empty() =>
        {
            Ok(Target {
                resource: resource.to_string(),
                id: id.to_string(),
                field: field.to_string(),
            })
        }
        _ => Err(anyhow!("Expected RESOURCE:ID:FIELD, got '{}'", value)),
    }
}

pub async fn handle(args: UploadArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load()?;

    let target = args.into.as_deref().map(parse_target).transpose()?;
    let mut module = match &target {
        Some(t) => {
            let module = ctx.module(&t.resource)?;
            let field = module
                .resource()
                .field(&t.field)
                .ok_or_else(|| anyhow!("{} has no field '{}'", module.resource().name, t.field))?;
            if field.kind != FieldKind::Image {
                return Err(anyhow!("Field '{}' is not an image field", t.field));
            }
            Some(module)
        }
        None => None,
    };

    let uploader = ImageUploader::from_config(ctx.config)?;
    let url = uploader.upload_file(&args.file).await?;

    if let (Some(module), Some(target)) = (module.as_mut(), &target) {
        module.load().await?;
        module.open_edit(&target.id)?.set(&target.field, url.as_str())?;
        module.submit().await?;
    }

    output_success(
        &output_format,
        &format!("Uploaded {}", args.file.display()),
        Some(json!({ "url": url })),
    )?;
    if let OutputFormat::Text = output_format {
        println!("{}", url);
    }
    Ok(())
}
