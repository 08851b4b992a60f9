/* Binary for instantiating schema-described types from name=value parameters and printing JSON */

use anyhow::Context;
use clap::Parser;
use instantiator::{
    Instantiator, InstantiatorConfig, Parameter, Parameters, Schema, Target, Value,
};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "instantiate")]
#[command(about = "Build a schema-described object from name=value parameters as JSON")]
struct Args {
    /* YAML schema declaring records, enums and interfaces */
    #[arg(short, long, required = true)]
    schema: PathBuf,

    /* Type expression to instantiate, e.g. `Person` or `list<Person>` */
    #[arg(short = 't', long = "type", required = true)]
    type_expr: String,

    /* Name the target is bound to; every parameter starts with it */
    #[arg(short, long, required = true)]
    name: String,

    /* File with one name=value per line; stdin when omitted */
    #[arg(short, long)]
    params: Option<PathBuf>,

    /* Deepest nesting the instantiator will follow */
    #[arg(long)]
    max_depth: Option<usize>,

    /* Pretty print JSON output */
    #[arg(long)]
    pretty: bool,

    /* Show only values (no type information) */
    #[arg(short = 'v', long)]
    values_only: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    /* Resolve the schema into a registry */
    let registry = Schema::load(&args.schema)
        .and_then(|schema| schema.build())
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;
    let desc = registry
        .resolve(&args.type_expr)
        .with_context(|| format!("unknown type '{}'", args.type_expr))?;
    let target: Target = Target::try_with_type(desc, args.name.clone())?;

    /* Read parameters */
    let text = match &args.params {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let parameters = parse_parameters(&text)?;

    /* Instantiate */
    let mut config = InstantiatorConfig::default();
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    let instantiator = Instantiator::with_config(config);
    let instance = instantiator
        .instantiate_erased(&target, &parameters)
        .map_err(|e| anyhow::anyhow!("Failed to instantiate '{}': {}", args.type_expr, e))?;
    let value = Value::from_instance(target.type_desc(), instance)?;

    /* Serialize to JSON */
    let json = if args.values_only {
        value.to_json()
    } else {
        value.to_typed_json()
    };
    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", serde_json::to_string(&json)?);
    }

    Ok(())
}

/* One parameter per line; blank lines and `#` comments are skipped */
fn parse_parameters(text: &str) -> anyhow::Result<Parameters> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            line.parse::<Parameter>()
                .with_context(|| format!("line {}: '{}'", index + 1, line))
        })
        .collect()
}
