mod catalog;
mod fetch;
mod lookup;
mod parser;
mod report;
mod search;
mod settings;
mod suppliers;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use catalog::{Catalog, UrlBuilder};
use fetch::{HttpFetcher, PageFetcher, RenderedFetcher};
use lookup::{Lookup, ReagentQuery};
use search::WebSearch;
use settings::Settings;

#[derive(Parser)]
#[command(name = "reagent_quote", about = "Look up reagent prices across life-science suppliers")]
struct Cli {
    /// Debug-level logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every supplier for a reagent and print prices
    Search {
        /// Reagent name, e.g. "Taq DNA polymerase"
        #[arg(long)]
        name: Option<String>,
        /// Vendor catalog number, e.g. M0273S
        #[arg(long = "catalog")]
        catalog_number: Option<String>,
        /// Supplier directory (.csv or .xlsx)
        #[arg(short, long)]
        suppliers: Option<PathBuf>,
        /// Only suppliers whose name contains this text
        #[arg(short, long)]
        company: Option<String>,
        /// Max suppliers to query
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Delay between suppliers in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Skip the rendered (JavaScript) fallback
        #[arg(long)]
        no_render: bool,
        /// Skip the broad web search when no supplier has a link
        #[arg(long)]
        no_broad: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Wider table columns
        #[arg(short, long)]
        wide: bool,
    },
    /// List suppliers loaded from the directory file
    Suppliers {
        /// Supplier directory (.csv or .xlsx)
        #[arg(short, long)]
        suppliers: Option<PathBuf>,
    },
    /// List the vendor catalogue
    Catalog {
        /// Only vendors with no row in the supplier directory
        #[arg(long)]
        missing: bool,
        /// Supplier directory (.csv or .xlsx)
        #[arg(short, long)]
        suppliers: Option<PathBuf>,
    },
    /// Classify a saved page (HTML or text file, "-" for stdin)
    Classify {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let t0 = Instant::now();
    let result = run(cli.command).await;

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    result
}

/// Settings plus the catalogue with any configured vendors in front.
fn load_settings() -> Result<(Settings, Catalog)> {
    let mut settings = Settings::load()?;
    let catalog = Catalog::with_extra(std::mem::take(&mut settings.catalog));
    Ok((settings, catalog))
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Search {
            name,
            catalog_number,
            suppliers: directory,
            company,
            limit,
            delay_ms,
            no_render,
            no_broad,
            json,
            wide,
        } => {
            let query = ReagentQuery::new(name, catalog_number)?;
            let (mut settings, catalog) = load_settings()?;
            if let Some(path) = directory {
                settings.suppliers_path = path;
            }
            if let Some(ms) = delay_ms {
                settings.delay_ms = ms;
            }
            if no_render {
                settings.render_fallback = false;
            }
            if no_broad {
                settings.broad_search = false;
            }

            let mut records = suppliers::load(
                &settings.suppliers_path,
                settings.sheet_name.as_deref(),
                &catalog,
            )?;
            if let Some(filter) = company {
                let filter = filter.to_lowercase();
                records.retain(|r| r.name.to_lowercase().contains(&filter));
            }
            if let Some(n) = limit {
                records.truncate(n);
            }
            if records.is_empty() {
                println!("No suppliers to search.");
                return Ok(());
            }

            let primary = HttpFetcher::new(&settings)?;
            let rendered = build_rendered(&settings)?;
            let lookup = Lookup {
                primary: &primary,
                fallback: rendered.as_ref().map(|r| r as &dyn PageFetcher),
                search: WebSearch::new(&settings.search_url),
                delay: settings.delay(),
                broad_search: settings.broad_search,
                progress: !json,
            };

            let report = lookup.run(&query, &records).await;
            if json {
                report::print_json(&report)
            } else {
                report::print_table(&report, wide);
                Ok(())
            }
        }
        Commands::Suppliers { suppliers: directory } => {
            let (settings, catalog) = load_settings()?;
            let path = directory.unwrap_or(settings.suppliers_path);
            let records = suppliers::load(&path, settings.sheet_name.as_deref(), &catalog)?;

            println!(
                "{:>3} | {:<32} | {:<32} | {:<11} | {:<32}",
                "#", "Company", "Homepage", "Lookup", "Contact Email"
            );
            println!("{}", "-".repeat(122));
            for (i, r) in records.iter().enumerate() {
                let kind = match r.locator {
                    UrlBuilder::Template(_) => "template",
                    UrlBuilder::SiteSearch => "site search",
                };
                println!(
                    "{:>3} | {:<32} | {:<32} | {:<11} | {:<32}",
                    i + 1,
                    report::truncate(&r.name, 32),
                    report::truncate(&r.homepage, 32),
                    kind,
                    report::truncate(&r.email, 32),
                );
            }
            println!("\n{} suppliers", records.len());
            Ok(())
        }
        Commands::Catalog { missing, suppliers: directory } => {
            let (settings, catalog) = load_settings()?;
            if missing {
                let path = directory.unwrap_or(settings.suppliers_path);
                let records = suppliers::load(&path, settings.sheet_name.as_deref(), &catalog)?;
                let gaps = suppliers::uncovered(&records, &catalog);
                for name in &gaps {
                    println!("  {}", name);
                }
                println!("\n{} catalogue vendors not in {:?}", gaps.len(), path);
            } else {
                for e in catalog.entries() {
                    let how = match &e.url {
                        UrlBuilder::Template(t) => t.as_str(),
                        UrlBuilder::SiteSearch => "(site search)",
                    };
                    println!("{:<28} {}", e.name, how);
                }
                println!("\n{} vendors", catalog.entries().len());
            }
            Ok(())
        }
        Commands::Classify { path } => {
            let raw = read_input(&path)?;
            let facts = if raw.contains('<') {
                parser::process_html(&raw)
            } else {
                parser::extract::extract_all(&raw)
            };
            println!("Price/Status: {}", facts.status);
            println!("Email:        {}", facts.email.as_deref().unwrap_or("-"));
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn build_rendered(settings: &Settings) -> Result<Option<RenderedFetcher>> {
    if !settings.render_fallback {
        return Ok(None);
    }
    match settings.render_key() {
        Some(key) => Ok(Some(RenderedFetcher::new(key)?)),
        None => {
            warn!("No SPIDER_API_KEY set, rendered fallback disabled");
            Ok(None)
        }
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
