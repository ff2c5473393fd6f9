use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use ctgen_core::config::{self, CONFIG_FILE_NAME, Language, LanguageConfig, ProjectConfig};
use ctgen_core::generator::{CompositionStrategy, GenerationOptions, TestGenerator};
use ctgen_core::ir::TestSuite;
use ctgen_core::parse::{self, ParsedSpec};
use ctgen_core::{GenerateError, GeneratedFile, GeneratedOutput};
use ctgen_factory::LanguageGeneratorFactory;

#[derive(Parser)]
#[command(name = "ctgen", about = "Contract-test generator for OpenAPI 3.x specs", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a contract-test project from an OpenAPI spec
    Generate(GenerateArgs),

    /// Print the synthesized test suite without rendering a backend
    Inspect {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,

        /// Seed for reproducible mock data
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List language backends and their capabilities
    Languages,

    /// Initialize a new ctgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Flags for `generate`; each one overrides `.ctgen.yaml`.
#[derive(Args, Default)]
struct GenerateArgs {
    /// Path to the OpenAPI spec file (YAML or JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory the project is written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target language (javascript, java, csharp, python, go)
    #[arg(short, long)]
    language: Option<String>,

    /// Test framework, e.g. jest, junit5, xunit, pytest
    #[arg(long)]
    framework: Option<String>,

    /// Package manager, e.g. npm, gradle, poetry
    #[arg(long)]
    package_manager: Option<String>,

    /// Emit provider verification instead of consumer tests
    #[arg(long)]
    provider: bool,

    /// Seed for reproducible mock data
    #[arg(long)]
    seed: Option<u64>,

    /// Run oneOf/anyOf cases once per branch
    #[arg(long)]
    per_branch: bool,

    /// Fail on malformed operations instead of skipping them
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(&args, Path::new(CONFIG_FILE_NAME)),

        Commands::Inspect { input, format, seed } => cmd_inspect(&input, format, seed),

        Commands::Languages => cmd_languages(),

        Commands::Init { force } => cmd_init(Path::new(CONFIG_FILE_NAME), force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "ctgen", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn try_load_config(path: &Path) -> Result<Option<ProjectConfig>> {
    config::load_config(path).map_err(|e| anyhow::anyhow!(e))
}

fn load_spec(path: &Path) -> Result<ParsedSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let spec = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(spec)
}

/// Layer command-line flags over the file config. Switching language resets
/// the language-specific defaults but keeps `advancedConfig`.
fn apply_overrides(mut cfg: ProjectConfig, args: &GenerateArgs) -> Result<ProjectConfig> {
    if let Some(key) = &args.language {
        let language = Language::from_key(key).ok_or_else(|| GenerateError::UnsupportedLanguage {
            language: key.clone(),
            valid: Language::ALL.iter().map(|l| l.as_str().to_string()).collect(),
        })?;
        if language != cfg.language.language {
            let advanced = cfg.language.advanced_config.take();
            cfg.language = LanguageConfig::for_language(language);
            cfg.language.advanced_config = advanced;
        }
    }
    if let Some(framework) = &args.framework {
        cfg.language.framework = framework.clone();
    }
    if let Some(package_manager) = &args.package_manager {
        cfg.language.package_manager = package_manager.clone();
    }
    if let Some(input) = &args.input {
        cfg.input = input.display().to_string();
    }
    if let Some(output) = &args.output {
        cfg.output = output.display().to_string();
    }
    let generation = &mut cfg.generation;
    generation.provider_mode |= args.provider;
    generation.strict |= args.strict;
    if args.seed.is_some() {
        generation.seed = args.seed;
    }
    if args.per_branch {
        generation.composition = CompositionStrategy::PerBranch;
    }
    Ok(cfg)
}

fn build_suite(spec_path: &Path, options: GenerationOptions) -> Result<TestSuite> {
    let spec = load_spec(spec_path)?;
    let suite = TestGenerator::new(options)
        .generate(&spec)
        .with_context(|| format!("failed to synthesize tests for {}", spec_path.display()))?;
    for warning in &suite.metadata.warnings {
        log::warn!("{warning}");
    }
    Ok(suite)
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

/// The "generated, do not edit" README with the backend's setup steps.
fn readme_content(suite: &TestSuite, output: &GeneratedOutput) -> String {
    let mut readme = format!(
        "# {} contract tests\n\n\
         Generated by ctgen for {} {} ({} mode). Changes are overwritten the next time\n\
         `ctgen generate` runs; edit `{CONFIG_FILE_NAME}` instead.\n\n## Setup\n\n",
        suite.metadata.title, output.configuration.language, output.configuration.framework, output.configuration.mode
    );
    for (i, step) in output.setup_instructions.iter().enumerate() {
        readme.push_str(&format!("{}. `{step}`\n", i + 1));
    }
    readme
}

fn generate(cfg: &ProjectConfig) -> Result<(TestSuite, GeneratedOutput)> {
    let suite = build_suite(Path::new(&cfg.input), cfg.generation.clone())?;
    let output = LanguageGeneratorFactory::new()
        .generate_tests(&suite, &cfg.language)
        .with_context(|| format!("failed to generate {} tests", cfg.language.language))?;

    let output_dir = PathBuf::from(&cfg.output);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    write_files(&output_dir, &output.files)?;

    let readme_path = output_dir.join("README.md");
    fs::write(&readme_path, readme_content(&suite, &output))
        .with_context(|| format!("failed to write {}", readme_path.display()))?;
    eprintln!("  wrote {}", readme_path.display());
    Ok((suite, output))
}

fn cmd_generate(args: &GenerateArgs, config_path: &Path) -> Result<()> {
    let cfg = apply_overrides(try_load_config(config_path)?.unwrap_or_default(), args)?;
    eprintln!(
        "Generating {} ({}) tests from {} → {}",
        cfg.language.language, cfg.language.framework, cfg.input, cfg.output
    );
    let (suite, output) = generate(&cfg)?;

    eprintln!(
        "Generated {} files for {} test cases in {}",
        output.files.len() + 1, // +1 for README
        suite.tests.len(),
        cfg.output
    );
    eprintln!("\nNext steps:");
    for step in &output.setup_instructions {
        eprintln!("  {step}");
    }
    Ok(())
}

fn cmd_inspect(input: &Path, format: InspectFormat, seed: Option<u64>) -> Result<()> {
    let suite = build_suite(
        input,
        GenerationOptions {
            seed,
            ..GenerationOptions::default()
        },
    )?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&suite)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&suite)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn language_listing(factory: &LanguageGeneratorFactory) -> Result<Vec<String>> {
    factory
        .supported_languages()
        .iter()
        .map(|key| {
            let backend = factory.create_generator(key)?;
            Ok(format!(
                "{key}\n  frameworks:       {}\n  package managers: {}\n  features:         {}",
                backend.supported_frameworks().join(", "),
                backend.supported_package_managers().join(", "),
                backend.features().enabled().join(", ")
            ))
        })
        .collect()
}

fn cmd_languages() -> Result<()> {
    for entry in language_listing(&LanguageGeneratorFactory::new())? {
        println!("{entry}");
    }
    Ok(())
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
