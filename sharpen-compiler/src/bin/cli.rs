//! Sharpen compiler CLI

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sharpen_compiler::config::DEFAULT_CACHE_DIR;
use sharpen_compiler::{CompilationMode, CompilationPipeline, CompilerConfig, DiagnosticSeverity};
use sharpen_symbols::BuiltinsProvider;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "sharpen")]
#[command(about = "Compiles resolved programs into C# source against .NET metadata")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile resolved program files
    Compile(CompileArgs),

    /// Resolve one foreign binary and print its metadata as JSON
    Resolve(ResolveArgs),

    /// List the built-in classes
    Builtins,

    /// Create default configuration file
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "sharpen.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file path
        path: PathBuf,
    },
}

#[derive(Args)]
struct CompileArgs {
    /// Resolved program files (JSON)
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Module name
    #[arg(short, long)]
    module: Option<String>,

    /// Foreign binary to load metadata from (repeatable)
    #[arg(long = "binary-path")]
    binary_paths: Vec<PathBuf>,

    /// Target-runtime reference-assembly home
    #[arg(long)]
    runtime_home: Option<PathBuf>,

    /// Metadata resolver executable
    #[arg(long)]
    resolver: Option<PathBuf>,

    /// Directory for cached resolver replies
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Always run the resolver, ignoring cached replies
    #[arg(long)]
    no_cache: bool,

    /// Do not actualize against the built-in declarations
    #[arg(long)]
    no_stdlib: bool,

    /// Do not load foreign runtime metadata
    #[arg(long)]
    no_runtime_support: bool,

    /// Compile the standard library itself
    #[arg(long)]
    stdlib_mode: bool,

    /// Also write IR and output-tree dumps
    #[arg(long)]
    dumps: bool,
}

#[derive(Args)]
struct ResolveArgs {
    /// Binary to resolve
    target: PathBuf,

    /// Metadata resolver executable
    #[arg(long)]
    resolver: PathBuf,

    /// Other binaries on the search path (repeatable)
    #[arg(long = "binary-path")]
    binary_paths: Vec<PathBuf>,

    /// Directory for cached resolver replies
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    #[arg(long)]
    no_cache: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Compile(args) => handle_compile(args, cli.config),
        Commands::Resolve(args) => handle_resolve(args),
        Commands::Builtins => handle_builtins(),
        Commands::InitConfig { output } => handle_init_config(output),
        Commands::ValidateConfig { path } => handle_validate_config(path),
    }
}

fn handle_compile(args: CompileArgs, config_path: Option<PathBuf>) -> Result<()> {
    // Load configuration
    let mut config = match config_path {
        Some(path) => CompilerConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => CompilerConfig::default(),
    };

    // Override with CLI arguments
    config.merge(CompilerConfig {
        module_name: args.module.unwrap_or_else(|| CompilerConfig::default().module_name),
        inputs: args.inputs,
        destination: args.destination.unwrap_or_else(|| CompilerConfig::default().destination),
        binary_paths: args.binary_paths,
        runtime_home: args.runtime_home,
        resolver: args.resolver,
        cache_dir: args.cache_dir,
        use_cache: !args.no_cache,
        no_stdlib: args.no_stdlib,
        no_runtime_support: args.no_runtime_support,
        mode: if args.stdlib_mode {
            CompilationMode::Stdlib
        } else {
            CompilationMode::Program
        },
        emit_dumps: args.dumps,
    });

    info!(
        "Compiling {} input(s) into {}",
        config.inputs.len(),
        config.destination.display()
    );

    let mut pipeline = CompilationPipeline::new(config);
    let result = pipeline.compile().context("compilation aborted")?;

    for diagnostic in &result.diagnostics {
        match diagnostic.severity {
            DiagnosticSeverity::Error => error!("{}", diagnostic),
            DiagnosticSeverity::Warning => warn!("{}", diagnostic),
            DiagnosticSeverity::Info => info!("{}", diagnostic),
        }
    }

    if result.has_errors() {
        bail!("compilation failed");
    }

    info!("Compilation successful!");
    info!("  Symbols time: {:?}", result.metadata.symbols_time);
    info!("  Lowering time: {:?}", result.metadata.lowering_time);
    info!("  Code generation time: {:?}", result.metadata.codegen_time);
    info!("  Total time: {:?}", result.metadata.total_time);
    info!("  Generated {} files", result.metadata.generated_files);
    Ok(())
}

fn handle_resolve(args: ResolveArgs) -> Result<()> {
    let mut binary_paths = args.binary_paths;
    if !binary_paths.contains(&args.target) {
        binary_paths.push(args.target.clone());
    }
    let assembly = sharpen_metadata::resolve(
        &args.resolver,
        &binary_paths,
        &args.target,
        &args.cache_dir,
        !args.no_cache,
    )
    .with_context(|| format!("resolving {}", args.target.display()))?;

    println!("{}", serde_json::to_string_pretty(&assembly)?);
    Ok(())
}

fn handle_builtins() -> Result<()> {
    let builtins = BuiltinsProvider::new().context("building the built-in declarations")?;
    let graph = builtins.graph();

    println!("Built-in classes:");
    for class in graph.classes() {
        println!("  {:?} {}", class.kind, class.id);
    }
    println!("{} classes, {} functions", graph.class_count(), graph.function_count());
    Ok(())
}

fn handle_init_config(output: PathBuf) -> Result<()> {
    info!("Creating configuration file at {}", output.display());

    CompilerConfig::default()
        .to_file(&output)
        .with_context(|| format!("writing {}", output.display()))?;

    info!("Configuration file created successfully!");
    Ok(())
}

fn handle_validate_config(path: PathBuf) -> Result<()> {
    info!("Validating configuration file {}", path.display());

    let config = CompilerConfig::from_file(&path)?;
    config.validate()?;

    info!("Configuration file is valid!");
    info!("  Module: {}", config.module_name);
    info!("  Mode: {:?}", config.mode);
    info!("  Foreign binaries: {}", config.binary_paths.len());
    Ok(())
}
