use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::debug;

use md2slides::{
    application::{assemble::assemble_with_specs, error::AppError},
    config::{BatchArgs, Settings},
    domain::{ids::SequentialIds, slides::MutationOp},
    infra::error::InfraError,
};

/// The body `presentations.batchUpdate` would receive.
#[derive(Serialize)]
struct BatchPreview<'a> {
    requests: &'a [MutationOp],
}

pub async fn print_batch(settings: &Settings, args: &BatchArgs) -> Result<(), AppError> {
    let markdown = read_input(args.input.as_deref()).await?;

    let mut ids = match args.id_prefix.as_deref() {
        Some(prefix) => SequentialIds::new(prefix)?,
        None => SequentialIds::random(),
    };
    let assembled = assemble_with_specs(&markdown, &settings.slides.delimiter, &mut ids);
    debug!(
        slides = assembled.slide_count(),
        requests = assembled.ops.len(),
        id_prefix = ids.prefix(),
        "assembled batch"
    );

    let body = serde_json::to_string_pretty(&BatchPreview {
        requests: &assembled.ops,
    })
    .map_err(|err| AppError::unexpected(format!("failed to serialize batch: {err}")))?;
    println!("{body}");

    Ok(())
}

async fn read_input(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .map_err(|err| AppError::from(InfraError::from(err))),
        _ => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .map_err(|err| AppError::from(InfraError::from(err)))?;
            Ok(buffer)
        }
    }
}
