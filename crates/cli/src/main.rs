use anyhow::{Context as AnyhowContext, Result};
use archview_graph::traverse;
use archview_graph::{ClassifiedGraph, GraphBuilder, GraphBuilderConfig, Severity};
use archview_model::{ArchitectureModel, Changeset};
use archview_view::{
    FocusSpec, GridLayout, LayoutAlgorithm, ScenarioPreset, TransformOptions, ViewLevel,
    ViewTransformer,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::CliConfig;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

mod config;

#[derive(Parser)]
#[command(name = "archview")]
#[command(about = "C4 classification and views for layered architecture models", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults to ./archview.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the classified graph and print it as JSON
    Build(BuildArgs),

    /// Print the structural validation report; exits non-zero on errors
    Validate(ValidateArgs),

    /// Project, lay out and print one view
    View(ViewArgs),

    /// Print the upstream or downstream closure of a node
    Trace(TraceArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Architecture model (JSON)
    model: PathBuf,

    /// Changeset (JSON) to overlay on the built graph
    #[arg(long)]
    changeset: Option<PathBuf>,
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    input: ModelArgs,

    /// Skip structural validation
    #[arg(long)]
    no_validate: bool,
}

#[derive(Args)]
struct ValidateArgs {
    /// Architecture model (JSON)
    model: PathBuf,
}

#[derive(Args)]
struct ViewArgs {
    #[command(flatten)]
    input: ModelArgs,

    /// Full transform request (JSON); view flags are ignored when given
    #[arg(long)]
    request: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LevelArg::Context)]
    level: LevelArg,

    /// Selected container id
    #[arg(long)]
    container: Option<String>,

    /// Selected component id
    #[arg(long)]
    component: Option<String>,

    /// Layout algorithm (default from config)
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Active container types (repeatable); all when omitted
    #[arg(long = "container-type")]
    container_types: Vec<String>,

    /// Active technologies (repeatable); all when omitted
    #[arg(long = "technology")]
    technologies: Vec<String>,

    /// Show deployment nodes for visible containers
    #[arg(long)]
    deployment: bool,

    /// Dim everything outside this node's neighbourhood
    #[arg(long)]
    focus: Option<String>,

    #[arg(long, value_enum)]
    scenario: Option<ScenarioArg>,

    /// Only elements carrying a changeset status
    #[arg(long)]
    changes_only: bool,

    /// Semantic zoom scale (default from config)
    #[arg(long)]
    zoom: Option<f64>,
}

#[derive(Args)]
struct TraceArgs {
    #[command(flatten)]
    input: ModelArgs,

    /// Node to trace from
    #[arg(long)]
    node: String,

    #[arg(long, value_enum, default_value_t = DirectionArg::Downstream)]
    direction: DirectionArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    Context,
    Container,
    Component,
}

impl LevelArg {
    fn as_domain(self) -> ViewLevel {
        match self {
            LevelArg::Context => ViewLevel::Context,
            LevelArg::Container => ViewLevel::Container,
            LevelArg::Component => ViewLevel::Component,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Hierarchical,
    Force,
    Orthogonal,
    Manual,
}

impl LayoutArg {
    fn as_domain(self) -> LayoutAlgorithm {
        match self {
            LayoutArg::Hierarchical => LayoutAlgorithm::Hierarchical,
            LayoutArg::Force => LayoutAlgorithm::Force,
            LayoutArg::Orthogonal => LayoutAlgorithm::Orthogonal,
            LayoutArg::Manual => LayoutAlgorithm::Manual,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    DataFlow,
    Deployment,
    ExternalIntegrations,
    Changes,
}

impl ScenarioArg {
    fn as_domain(self) -> ScenarioPreset {
        match self {
            ScenarioArg::DataFlow => ScenarioPreset::DataFlow,
            ScenarioArg::Deployment => ScenarioPreset::Deployment,
            ScenarioArg::ExternalIntegrations => ScenarioPreset::ExternalIntegrations,
            ScenarioArg::Changes => ScenarioPreset::Changes,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum DirectionArg {
    Upstream,
    Downstream,
    Both,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateOutput<'a> {
    valid: bool,
    has_cycles: bool,
    validation_errors: &'a [archview_graph::ValidationError],
    warnings: &'a [archview_graph::ParseWarning],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceOutput {
    origin: String,
    direction: DirectionArg,
    nodes: BTreeSet<String>,
    edges: BTreeSet<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build(args) => run_build(args, &config)?,
        Commands::Validate(args) => run_validate(args, &config)?,
        Commands::View(args) => run_view(args, &config).await?,
        Commands::Trace(args) => run_trace(args, &config)?,
    }

    Ok(())
}

fn load_graph(input: &ModelArgs, builder: &GraphBuilderConfig) -> Result<ClassifiedGraph> {
    let model = load_model(&input.model)?;
    let graph = GraphBuilder::new(builder.clone())?.build(&model);

    let Some(path) = &input.changeset else {
        return Ok(graph);
    };
    let changeset = Changeset::from_path(path)
        .with_context(|| format!("Failed to load changeset {}", path.display()))?;
    Ok(graph.with_changeset(&changeset))
}

fn load_model(path: &Path) -> Result<ArchitectureModel> {
    ArchitectureModel::from_path(path)
        .with_context(|| format!("Failed to load model {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_build(args: BuildArgs, config: &CliConfig) -> Result<()> {
    let mut builder = config.builder.clone();
    if args.no_validate {
        builder.validate_structure = false;
    }
    let graph = load_graph(&args.input, &builder)?;
    print_json(&graph)
}

fn run_validate(args: ValidateArgs, config: &CliConfig) -> Result<()> {
    let builder = GraphBuilderConfig {
        validate_structure: true,
        ..config.builder.clone()
    };
    let model = load_model(&args.model)?;
    let graph = GraphBuilder::new(builder)?.build(&model);
    let metadata = graph.metadata();

    let valid = !metadata
        .validation_errors
        .iter()
        .any(|e| e.severity == Severity::Error);
    print_json(&ValidateOutput {
        valid,
        has_cycles: metadata.has_cycles,
        validation_errors: &metadata.validation_errors,
        warnings: &metadata.warnings,
    })?;

    if !valid {
        std::process::exit(1);
    }
    Ok(())
}

fn view_options(args: &ViewArgs, config: &CliConfig) -> Result<TransformOptions> {
    if let Some(path) = &args.request {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request {}", path.display()))?;
        return TransformOptions::from_json_str(&raw)
            .with_context(|| format!("Invalid transform request {}", path.display()));
    }

    let container_types = (!args.container_types.is_empty()).then(|| {
        args.container_types
            .iter()
            .map(|raw| archview_graph::inference::parse_container_type(raw))
            .collect::<HashSet<_>>()
    });
    let technologies = (!args.technologies.is_empty())
        .then(|| args.technologies.iter().cloned().collect::<HashSet<_>>());

    Ok(TransformOptions {
        view_level: args.level.as_domain(),
        selected_container_id: args.container.clone(),
        selected_component_id: args.component.clone(),
        layout: args
            .layout
            .map(LayoutArg::as_domain)
            .unwrap_or(config.view.layout),
        container_types,
        technologies,
        show_deployment: args.deployment,
        focus: args.focus.clone().map(|node_id| FocusSpec {
            enabled: true,
            node_id,
        }),
        scenario: args.scenario.map(ScenarioArg::as_domain),
        changeset_only: args.changes_only,
        zoom_scale: args.zoom.unwrap_or(config.view.zoom_scale),
        ..Default::default()
    })
}

async fn run_view(args: ViewArgs, config: &CliConfig) -> Result<()> {
    let graph = load_graph(&args.input, &config.builder)?;
    let transformer = ViewTransformer::new(view_options(&args, config)?)?;
    let result = transformer.transform(&graph, &GridLayout::default()).await?;
    print_json(&result)
}

fn run_trace(args: TraceArgs, config: &CliConfig) -> Result<()> {
    let graph = load_graph(&args.input, &config.builder)?;
    graph.require_node(&args.node)?;

    let nodes = match args.direction {
        DirectionArg::Upstream => traverse::trace_upstream(&graph, &args.node),
        DirectionArg::Downstream => traverse::trace_downstream(&graph, &args.node),
        DirectionArg::Both => {
            let mut ids = traverse::trace_upstream(&graph, &args.node);
            ids.extend(traverse::trace_downstream(&graph, &args.node));
            ids
        }
    };
    let edges = traverse::highlighted_edges(&graph, &nodes);

    print_json(&TraceOutput {
        origin: args.node,
        direction: args.direction,
        nodes: nodes.into_iter().collect(),
        edges: edges.into_iter().collect(),
    })
}
