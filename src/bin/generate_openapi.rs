//! Dumps the JSON document served at `/api-docs/openapi.json`, so API
//! clients can be generated without starting the dashboard.
//!
//! `generate_openapi` prints to stdout; `generate_openapi --output docs/openapi.json`
//! writes the file instead.

use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
};

use agrochain_dashboard::api::handlers::ApiDoc;
use anyhow::{Context, Result};
use utoipa::OpenApi;

/// Value following `--output`, if any.
fn output_path(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--output")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn main() -> Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .context("serialising the dashboard OpenAPI document")?;

    let args: Vec<String> = env::args().skip(1).collect();
    match output_path(&args) {
        Some(path) => {
            fs::write(&path, &document)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("AgroChain API document written to {}", path.display());
        }
        None => io::stdout()
            .write_all(document.as_bytes())
            .context("writing the OpenAPI document to stdout")?,
    }
    Ok(())
}
