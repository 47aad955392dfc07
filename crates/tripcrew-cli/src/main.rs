//! TripCrew - multi-agent travel planning CLI
//!
//! The `tripcrew` command turns a set of trip preferences into a city
//! shortlist, destination insights, a day-by-day itinerary and a budget.
//!
//! ## Commands
//!
//! - `plan`: run the four-role crew and print the plan
//! - `preview`: print the assembled roles and tasks without calling the model
//! - `options`: list accepted values for each trip preference

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info, Level};

use tripcrew_core::config::{DEFAULT_MODEL, MODEL_VAR, TEMPERATURE_VAR};
use tripcrew_core::inputs::{DEFAULT_DURATION_DAYS, MAX_DURATION_DAYS, MIN_DURATION_DAYS};
use tripcrew_core::render::{failure_notice, COMPLETION_NOTICE};
use tripcrew_core::{
    render_batch_md, render_plan_md, BudgetBracket, ExecutionResult, GeminiClient,
    InferenceConfig, Interest, PlanOutcome, Season, SequentialEngine, TravelType, TripCrew,
    TripInputs, METRICS,
};

/// Credential used by `preview`, which never reaches the inference API.
const PREVIEW_API_KEY: &str = "preview";

#[derive(Parser)]
#[command(name = "tripcrew")]
#[command(author = "TripCrew Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AI travel planner: four agents plan your next trip", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the crew and print the travel plan
    Plan {
        #[command(flatten)]
        trip: TripArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Output format for the plan
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Also dump the raw execution result as JSON
        #[arg(long)]
        debug_output: bool,
    },

    /// Show the roles and tasks that would be submitted, without running them
    Preview {
        #[command(flatten)]
        trip: TripArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Output format for the preview
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },

    /// List the accepted values for each trip preference
    Options,
}

/// Trip preferences shared by `plan` and `preview`.
#[derive(Args, Debug, Clone)]
struct TripArgs {
    /// Destination city for research, itinerary and budget
    #[arg(long)]
    city: String,

    /// Type of travel
    #[arg(long, default_value_t = TravelType::default())]
    travel_type: TravelType,

    /// Interest to plan around (repeatable)
    #[arg(long = "interest", value_name = "INTEREST")]
    interests: Vec<Interest>,

    /// Season of travel
    #[arg(long, default_value_t = Season::default())]
    season: Season,

    /// Trip length in days
    #[arg(long, default_value_t = DEFAULT_DURATION_DAYS)]
    duration: u8,

    /// Budget bracket, e.g. '$1000-$2000' or 'luxury'
    #[arg(long, default_value_t = BudgetBracket::default())]
    budget: BudgetBracket,
}

impl TripArgs {
    fn into_inputs(self) -> TripInputs {
        TripInputs {
            travel_type: self.travel_type,
            interests: self.interests.into_iter().collect(),
            season: self.season,
            duration: self.duration,
            budget: self.budget,
            city: self.city,
        }
    }
}

/// Per-invocation overrides of the environment-derived model settings.
#[derive(Args, Debug, Clone, Default)]
struct ModelArgs {
    /// Model identifier
    #[arg(long, env = MODEL_VAR)]
    model: Option<String>,

    /// Sampling temperature in [0, 2]
    #[arg(long, env = TEMPERATURE_VAR)]
    temperature: Option<f32>,
}

impl ModelArgs {
    fn apply(&self, mut config: InferenceConfig) -> InferenceConfig {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Serialize)]
struct PlanReport<'a> {
    inputs: &'a TripInputs,
    #[serde(flatten)]
    outcome: &'a PlanOutcome,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tripcrew_core::init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Plan {
            trip,
            model,
            format,
            debug_output,
        } => cmd_plan(trip, &model, format, debug_output).await,
        Commands::Preview {
            trip,
            model,
            format,
        } => cmd_preview(trip, &model, format),
        Commands::Options => {
            cmd_options();
            Ok(())
        }
    }
}

async fn cmd_plan(
    trip: TripArgs,
    model: &ModelArgs,
    format: OutputFormat,
    debug_output: bool,
) -> Result<()> {
    let inputs = trip.into_inputs();
    let config = model.apply(
        InferenceConfig::from_env().context("Failed to load inference configuration")?,
    );
    let crew = TripCrew::new(inputs, config.clone()).context("Invalid trip request")?;
    let engine = SequentialEngine::new(
        GeminiClient::from_config(&config).context("Failed to build inference client")?,
    );

    info!(city = %crew.inputs().city, model = %config.model, "Planning trip");

    let planned = crew.plan(&engine).await;
    METRICS.flush();

    match planned {
        Ok((result, outcome)) => {
            if debug_output {
                print_debug_output(&result)?;
            }
            print_outcome(crew.inputs(), &outcome, format)
        }
        Err(e) => {
            let outcome = PlanOutcome::failed(&e);
            print_outcome(crew.inputs(), &outcome, format)?;
            Err(e).context("Trip planning failed")
        }
    }
}

fn cmd_preview(trip: TripArgs, model: &ModelArgs, format: OutputFormat) -> Result<()> {
    let config = match InferenceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %e, "No usable inference configuration, previewing with defaults");
            InferenceConfig::new(DEFAULT_MODEL, PREVIEW_API_KEY)
        }
    };
    let crew = TripCrew::new(trip.into_inputs(), model.apply(config))
        .context("Invalid trip request")?;
    let batch = crew.assemble().context("Failed to assemble crew")?;

    match format {
        OutputFormat::Markdown => print!("{}", render_batch_md(&batch)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&batch)?),
    }
    Ok(())
}

fn cmd_options() {
    let labels = |items: Vec<&str>| items.join(", ");
    println!(
        "travel types: {}",
        labels(TravelType::ALL.iter().map(|t| t.label()).collect())
    );
    println!(
        "interests:    {}",
        labels(Interest::ALL.iter().map(|i| i.label()).collect())
    );
    println!(
        "seasons:      {}",
        labels(Season::ALL.iter().map(|s| s.label()).collect())
    );
    println!(
        "budgets:      {}",
        labels(BudgetBracket::ALL.iter().map(|b| b.label()).collect())
    );
    println!("duration:     {MIN_DURATION_DAYS}-{MAX_DURATION_DAYS} days (default {DEFAULT_DURATION_DAYS})");
}

fn print_outcome(inputs: &TripInputs, outcome: &PlanOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Markdown => print!("{}", render_plan_md(inputs, outcome)),
        OutputFormat::Json => {
            let report = PlanReport { inputs, outcome };
            println!("{}", serde_json::to_string_pretty(&report)?);
            match outcome {
                PlanOutcome::Failed { reason } => eprintln!("{}", failure_notice(reason)),
                _ => eprintln!("{COMPLETION_NOTICE}"),
            }
        }
    }
    Ok(())
}

fn print_debug_output(result: &ExecutionResult) -> Result<()> {
    let json =
        serde_json::to_string_pretty(result).context("Failed to serialize execution result")?;
    eprintln!("Debug: raw execution result");
    eprintln!("{json}");
    Ok(())
}
