use std::env;
use std::sync::Arc;

use anyhow::Context;
use brandsearch::brands::{build, load_catalog_lines, CatalogRegistry, TrustPolicy};
use brandsearch::{HttpIndexClient, SearchConfig, SearchService};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut catalog_path: Option<String> = None;
    let mut config_path: Option<String> = None;
    let mut index_url: Option<String> = None;
    let mut classify_only = false;
    let mut words: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" | "-c" => {
                if i + 1 < args.len() {
                    catalog_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--index-url" => {
                if i + 1 < args.len() {
                    index_url = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--classify-only" => classify_only = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => words.push(other.to_string()),
        }
        i += 1;
    }

    let query = words.join(" ");
    if query.trim().is_empty() {
        print_help();
        std::process::exit(2);
    }

    let mut config = match config_path.as_deref() {
        Some(path) => SearchConfig::load(Some(path))?,
        None => SearchConfig::from_env(),
    };
    if let Some(path) = catalog_path {
        config.catalog_path = path;
    }
    if let Some(url) = index_url {
        config.index_url = url.trim_end_matches('/').to_string();
    }
    config.validate()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,brandsearch={}", config.log_level))),
        )
        .init();

    let lines = load_catalog_lines(&config.catalog_path, config.catalog_source_url.as_deref())
        .await
        .with_context(|| format!("loading catalog {}", config.catalog_path))?;
    let catalog = build(&lines, &TrustPolicy::from_config(&config));
    info!("Catalog ready: {} brands", catalog.len());
    let registry = Arc::new(CatalogRegistry::new(catalog));

    let index = Arc::new(HttpIndexClient::from_config(&config)?);
    let service = SearchService::new(config, registry, index);

    if classify_only {
        let (classification, plan) = service.plan(&query);
        let output = serde_json::json!({
            "classification": classification,
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let response = service.search(&query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn print_help() {
    println!("brandsearch - brand-aware product search");
    println!();
    println!("USAGE:");
    println!("    brandsearch [OPTIONS] QUERY...");
    println!();
    println!("OPTIONS:");
    println!("    -c, --catalog <PATH>   Manufacturer list, one label per line");
    println!("        --config <PATH>    Config file (TOML/JSON), BRANDSEARCH_* env overrides");
    println!("        --index-url <URL>  Search index base URL");
    println!("        --classify-only    Print classification and plan without searching");
    println!("    -h, --help             Print this help");
}
