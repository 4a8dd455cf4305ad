use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use srg_config::{init_tracing, ChainConfig, LayerConfig, LoggingConfig};
use srg_format::MappingsFormat;
use srg_mappings::{chain, check_consistency, ImmutableMappings, Mappings, RenamingMappings};
use srg_types::{is_valid_identifier, FieldId, MethodId, TypeRef};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "srg", version, about = "SRG mappings CLI (chain, invert, convert, lookup, check)")]
struct Cli {
    /// Log level or `EnvFilter` directives; merged with `RUST_LOG`
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose mapping files and package rules into one mapping
    Chain(ChainArgs),
    /// Swap original and renamed names
    Invert(InvertArgs),
    /// Rewrite a mappings file in another format
    Convert(ConvertArgs),
    /// Resolve a single class, field or method
    Lookup(LookupArgs),
    /// Validate renamed names and member consistency
    Check(CheckArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Mappings file
    file: PathBuf,
    /// Input format (inferred from the file extension by default)
    #[arg(long)]
    input_format: Option<MappingsFormat>,
}

#[derive(Args)]
struct OutputArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format (inferred from the output extension, else `srg`)
    #[arg(long)]
    format: Option<MappingsFormat>,
}

#[derive(Args)]
struct ChainArgs {
    /// Mappings files, applied in order after any config layers
    files: Vec<PathBuf>,
    /// Chain file (TOML) listing layers, logging and output
    #[arg(long)]
    config: Option<PathBuf>,
    /// Input format for FILES (inferred from each extension by default)
    #[arg(long)]
    input_format: Option<MappingsFormat>,
    /// Move classes of package FROM into TO after every file; `""` is the default package
    #[arg(long = "package", value_name = "FROM=TO", value_parser = parse_package_rule)]
    packages: Vec<(String, String)>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct InvertArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ConvertArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Target format
    #[arg(long)]
    to: MappingsFormat,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct LookupArgs {
    #[command(flatten)]
    input: InputArgs,
    #[command(subcommand)]
    symbol: Symbol,
    /// Emit JSON suitable for CI
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Symbol {
    /// A class internal name, e.g. `net/minecraft/server/World`
    Class { name: String },
    /// A field as `owner/name`
    Field { name: String },
    /// A method as `owner/name` plus its descriptor
    Method { name: String, descriptor: String },
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.command {
        Command::Chain(args) => args
            .config
            .as_deref()
            .map(ChainConfig::load_from_path)
            .transpose()?,
        _ => None,
    };

    let mut logging = config
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(LoggingConfig::default);
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    init_tracing(&logging);

    match cli.command {
        Command::Chain(args) => {
            run_chain(args, config)?;
            Ok(0)
        }
        Command::Invert(args) => {
            let mappings = load_input(&args.input)?;
            write_output(
                &mappings.invert(),
                args.output.output.as_deref(),
                args.output.format,
            )?;
            Ok(0)
        }
        Command::Convert(args) => {
            let mappings = load_input(&args.input)?;
            write_output(&mappings, args.output.as_deref(), Some(args.to))?;
            Ok(0)
        }
        Command::Lookup(args) => {
            let mappings = load_input(&args.input)?;
            let result = lookup(&mappings, &args.symbol)?;
            print_output(&result, args.json)?;
            Ok(0)
        }
        Command::Check(args) => {
            let mappings = load_input(&args.input)?;
            let report = check(&mappings);
            let exit = if report.problems.is_empty() { 0 } else { 1 };
            print_output(&report, args.json)?;
            Ok(exit)
        }
    }
}

fn run_chain(args: ChainArgs, config: Option<ChainConfig>) -> Result<()> {
    let mut layers: Vec<Box<dyn Mappings>> = Vec::new();
    let mut output_path = args.output.output;
    let mut output_format = args.output.format;

    if let Some(config) = config {
        for layer in &config.layers {
            match layer {
                LayerConfig::File(file) => {
                    let mappings = load_mappings(&file.path, Some(file.format()?))?;
                    layers.push(Box::new(if file.invert {
                        mappings.invert()
                    } else {
                        mappings
                    }));
                }
                LayerConfig::Packages(rule) => {
                    layers.push(Box::new(RenamingMappings::packages(&rule.packages)));
                }
            }
        }
        if output_path.is_none() {
            output_path = config.output.path.clone();
        }
        if output_format.is_none() {
            output_format = config.output.format;
        }
    }

    for path in &args.files {
        layers.push(Box::new(load_mappings(path, args.input_format)?));
    }
    if !args.packages.is_empty() {
        layers.push(Box::new(RenamingMappings::packages(args.packages)));
    }
    if layers.is_empty() {
        bail!("nothing to chain; pass mappings files or --config");
    }

    let refs: Vec<&dyn Mappings> = layers.iter().map(|layer| &**layer).collect();
    let chained = chain(refs).context("failed to chain mappings")?;
    write_output(&chained, output_path.as_deref(), output_format)
}

fn parse_package_rule(rule: &str) -> std::result::Result<(String, String), String> {
    let (from, to) = rule
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO, got `{rule}`"))?;
    Ok((from.trim().to_owned(), to.trim().to_owned()))
}

fn load_input(input: &InputArgs) -> Result<ImmutableMappings> {
    load_mappings(&input.file, input.input_format)
}

fn load_mappings(path: &Path, format: Option<MappingsFormat>) -> Result<ImmutableMappings> {
    let format = match format {
        Some(format) => format,
        None => MappingsFormat::from_extension(path).with_context(|| {
            format!(
                "can't infer the mappings format of {}; pass --input-format",
                path.display()
            )
        })?,
    };
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mappings = format
        .parse_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::debug!(
        target: "srg.cli",
        path = %path.display(),
        %format,
        classes = mappings.class_count(),
        fields = mappings.field_count(),
        methods = mappings.method_count(),
        "loaded mappings"
    );
    Ok(mappings)
}

fn write_output(
    mappings: &dyn Mappings,
    path: Option<&Path>,
    format: Option<MappingsFormat>,
) -> Result<()> {
    let format = format
        .or_else(|| path.and_then(MappingsFormat::from_extension))
        .unwrap_or_default();
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            format
                .write_io(mappings, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => format.write_io(mappings, io::stdout().lock())?,
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct LookupResult {
    kind: &'static str,
    original: String,
    renamed: String,
}

fn lookup(mappings: &dyn Mappings, symbol: &Symbol) -> Result<LookupResult> {
    let result = match symbol {
        Symbol::Class { name } => {
            let ty = TypeRef::from_internal_name(name)?;
            LookupResult {
                kind: "class",
                original: ty.internal_name(),
                renamed: mappings.resolve_type(&ty).internal_name(),
            }
        }
        Symbol::Field { name } => {
            let field = FieldId::from_internal_name(name)?;
            LookupResult {
                kind: "field",
                original: field.to_string(),
                renamed: mappings.resolve_field(&field).to_string(),
            }
        }
        Symbol::Method { name, descriptor } => {
            let method = MethodId::from_internal_name(name, descriptor)?;
            LookupResult {
                kind: "method",
                original: method.to_string(),
                renamed: mappings.resolve_method(&method).to_string(),
            }
        }
    };
    Ok(result)
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    classes: usize,
    fields: usize,
    methods: usize,
    problems: Vec<Problem>,
}

#[derive(Debug, Serialize)]
struct Problem {
    kind: &'static str,
    original: String,
    renamed: String,
    message: String,
}

fn check(mappings: &dyn Mappings) -> CheckReport {
    let mut report = CheckReport::default();

    mappings.for_each_class(&mut |original, renamed| {
        report.classes += 1;
        if !renamed.as_str().split('/').all(is_valid_identifier) {
            report.problems.push(Problem {
                kind: "class",
                original: original.to_string(),
                renamed: renamed.to_string(),
                message: "renamed class is not a valid Java name".to_owned(),
            });
        }
    });
    mappings.for_each_field(&mut |original, renamed| {
        report.fields += 1;
        if !is_valid_identifier(&renamed.name) {
            report.problems.push(Problem {
                kind: "field",
                original: original.to_string(),
                renamed: renamed.to_string(),
                message: "renamed field is not a valid Java identifier".to_owned(),
            });
        }
    });
    mappings.for_each_method(&mut |original, renamed| {
        report.methods += 1;
        let special = matches!(renamed.name.as_str(), "<init>" | "<clinit>");
        if !special && !is_valid_identifier(&renamed.name) {
            report.problems.push(Problem {
                kind: "method",
                original: original.to_string(),
                renamed: renamed.to_string(),
                message: "renamed method is not a valid Java identifier".to_owned(),
            });
        }
    });

    if let Err(err) = check_consistency(mappings) {
        report.problems.push(Problem {
            kind: "consistency",
            original: String::new(),
            renamed: String::new(),
            message: err.to_string(),
        });
    }
    report
}

fn print_output<T: Serialize + 'static>(value: &T, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(value)?;
        println!("{out}");
    } else {
        let any = value as &dyn std::any::Any;
        if let Some(result) = any.downcast_ref::<LookupResult>() {
            println!("{}", result.renamed);
        } else if let Some(report) = any.downcast_ref::<CheckReport>() {
            for problem in &report.problems {
                if problem.original.is_empty() {
                    println!("{}: {}", problem.kind, problem.message);
                } else {
                    println!(
                        "{}: {} -> {}: {}",
                        problem.kind, problem.original, problem.renamed, problem.message
                    );
                }
            }
            println!(
                "checked: {} classes, {} fields, {} methods; {} problems",
                report.classes,
                report.fields,
                report.methods,
                report.problems.len()
            );
        } else {
            let out = serde_json::to_string_pretty(value)?;
            println!("{out}");
        }
    }
    Ok(())
}
