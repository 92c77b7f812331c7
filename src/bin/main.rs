//! Carbon Portal Metadata Harvesting CLI
//!
//! Command-line tool for inspecting kinds, rendering queries, harvesting
//! flat dataset metadata and checking the registry against the live ontology.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cpmeta_harvest::vocab::compact_iri;
use cpmeta_harvest::{
    compose, harvest, to_json_string, DriftCheck, EntityQuery, ExecutorTypeLookup, Filters,
    Flattener, HarvestOptions, KindRegistry, MetaError, ResultGrouper, SparqlEndpoint,
    DEFAULT_ENDPOINT, METADATA_PREFIX,
};

#[derive(Parser)]
#[command(name = "cpmeta-harvest")]
#[command(about = "Harvest Carbon Portal metadata into flat dataset attribute sets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    runtime: RuntimeArgs,
}

#[derive(Args)]
struct RuntimeArgs {
    /// SPARQL endpoint
    #[arg(long, global = true, env = "CPMETA_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// HTTP timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Prefix of identities that may be dereferenced
    #[arg(long, global = true, default_value = METADATA_PREFIX)]
    metadata_prefix: String,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered kinds
    Kinds,
    /// Print the query built for a kind
    Query(QueryArgs),
    /// Harvest flat metadata records for every entity of a kind
    Harvest(HarvestArgs),
    /// Compare the registry with the live ontology
    Drift(OutputArgs),
}

#[derive(Args)]
struct FilterArgs {
    /// Restrict to one entity; repeat for several
    #[arg(long, value_name = "IRI")]
    identity: Vec<String>,

    /// Earliest submission end time
    #[arg(long, value_name = "DATE")]
    date_from: Option<String>,

    /// Latest submission end time
    #[arg(long, value_name = "DATE")]
    date_until: Option<String>,

    /// Data object spec IRI or local name; repeat for several
    #[arg(long, value_name = "SPEC")]
    product_type: Vec<String>,

    /// Only objects with no newer version
    #[arg(long)]
    last_version_only: bool,

    /// Maximum number of result rows
    #[arg(long)]
    limit: Option<i64>,

    /// JSON file with filters; flags override its values
    #[arg(long, value_name = "FILE")]
    filters: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct QueryArgs {
    /// Kind name
    kind: String,

    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(Args)]
struct HarvestArgs {
    /// Kind name
    kind: String,

    #[command(flatten)]
    filters: FilterArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Skip root entities whose references cannot be resolved
    #[arg(long)]
    skip_unresolvable: bool,
}

/// One value as a string, several as an array
fn one_or_many(values: Vec<String>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.into_iter().next().map(Value::String),
        _ => Some(Value::from(values)),
    }
}

/// Merge the filters file with the command-line flags
fn load_filters(args: FilterArgs) -> Result<Filters, MetaError> {
    let from_file = match &args.filters {
        Some(path) => {
            if !path.is_file() {
                return Err(MetaError::InvalidPath(path.clone()));
            }
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        }
        None => Filters::new(),
    };

    let flags = Filters {
        identity: one_or_many(args.identity),
        date_from: args.date_from.map(Value::String),
        date_until: args.date_until.map(Value::String),
        product_type: one_or_many(args.product_type),
        last_version_only: args.last_version_only.then_some(Value::Bool(true)),
        limit: args.limit.map(Value::from),
    };

    Ok(from_file.overridden_by(flags))
}

fn endpoint(runtime: &RuntimeArgs) -> Result<SparqlEndpoint, MetaError> {
    SparqlEndpoint::new(runtime.endpoint.clone(), runtime.timeout.map(Duration::from_secs))
}

/// Write output to file or stdout
fn write_output(content: &str, output: Option<&PathBuf>) -> Result<(), MetaError> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn run_kinds() -> Result<(), MetaError> {
    let registry = KindRegistry::builtin()?;
    registry.validate()?;

    for kind in registry.iter() {
        let attributes = compose(&registry, kind)?;
        println!(
            "{:<26} {:<18} {:<28} {:>3} attributes{}",
            kind.name,
            kind.parent.unwrap_or("-"),
            compact_iri(kind.canonical_type),
            attributes.len(),
            if kind.leaf_product { " (leaf product)" } else { "" }
        );
    }
    Ok(())
}

fn run_query(args: QueryArgs) -> Result<(), MetaError> {
    let registry = KindRegistry::builtin()?;
    let filters = load_filters(args.filters)?;
    let entity = EntityQuery::new(&registry, &args.kind, filters)?;
    print!("{}", entity.query()?);
    Ok(())
}

fn run_harvest(runtime: &RuntimeArgs, args: HarvestArgs) -> Result<(), MetaError> {
    let registry = KindRegistry::builtin()?;
    registry.validate()?;
    let filters = load_filters(args.filters)?;

    let endpoint = endpoint(runtime)?;
    let types = ExecutorTypeLookup::new(&endpoint, &registry);
    let options = HarvestOptions {
        skip_unresolvable: args.skip_unresolvable,
        grouper: ResultGrouper::new(runtime.metadata_prefix.clone()),
        flattener: Flattener::default(),
    };

    let result = harvest(&registry, &endpoint, &types, &args.kind, filters, &options)?;

    tracing::info!(
        "Harvested {} of {} roots ({} skipped, {} on-demand fetches)",
        result.stats.flattened,
        result.stats.roots,
        result.stats.skipped,
        result.stats.on_demand_fetches
    );

    let output = to_json_string(&result, args.output.pretty)?;
    write_output(&output, args.output.output.as_ref())
}

fn run_drift(runtime: &RuntimeArgs, args: OutputArgs) -> Result<(), MetaError> {
    let registry = KindRegistry::builtin()?;
    let endpoint = endpoint(runtime)?;
    let report = DriftCheck::against_live(&registry, &endpoint)?.diff();

    if !report.is_clean() {
        tracing::warn!("The registry disagrees with the live ontology");
    }

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    write_output(&output, args.output.as_ref())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.runtime.verbose);

    let result = match cli.command {
        Commands::Kinds => run_kinds(),
        Commands::Query(args) => run_query(args),
        Commands::Harvest(args) => run_harvest(&cli.runtime, args),
        Commands::Drift(args) => run_drift(&cli.runtime, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
