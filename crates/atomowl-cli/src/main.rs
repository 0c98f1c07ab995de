//! atomowl CLI
//!
//! Command-line interface for:
//! - translating an OWL ontology (RDF/XML or functional syntax) into Atomese
//!   logic statements (`translate`)
//! - dry runs that only report which catalogue shapes an ontology hits (`shapes`)
//! - inspecting the namespace prefixes a document declares (`namespaces`)

use anyhow::{anyhow, Context, Result};
use atomowl_dsl::sexpr::{render_statements_json, write_statements};
use atomowl_ingest_owl::config::{Dialect, IsAAliasPolicy, ObsoletePolicy, PlainSubclassLink};
use atomowl_ingest_owl::namespaces::extract_namespaces_from_path;
use atomowl_ingest_owl::{AuxTables, Translation, TranslationReport, Translator, TranslatorConfig};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "atomowl")]
#[command(author, version, about = "atomowl: OWL class expressions to Atomese logic")]
struct Cli {
    /// Log debug detail (shape fall-through, obsolete classes) to stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate an ontology into Atomese statements.
    Translate {
        #[command(flatten)]
        input: InputArgs,

        /// Output path (stdout when omitted).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format: `scheme` (S-expressions) or `json` (one object per line).
        #[arg(long, default_value = "scheme")]
        format: String,

        /// Write the run report as JSON.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Dry run: print the shape and skip histogram without writing statements.
    Shapes {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Print the namespace prefixes declared by a document.
    Namespaces {
        /// Ontology or property file (RDF/XML).
        input: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Ontology to translate.
    #[arg(long)]
    ontology: PathBuf,

    /// Relation ontology (annotation + object property labels).
    #[arg(long)]
    ro: Option<PathBuf>,

    /// Upper ontology (annotation property labels).
    #[arg(long)]
    iao: Option<PathBuf>,

    /// Tab-separated id map (`source<TAB>target<TAB>...<TAB>kind`).
    #[arg(long)]
    id_map: Option<PathBuf>,

    /// Translator configuration (JSON); flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// `auto`, `rdf-xml` or `functional`.
    #[arg(long)]
    dialect: Option<String>,

    /// Translate obsolete classes instead of skipping them.
    #[arg(long)]
    include_obsolete: bool,

    /// Also follow `is_a` rows of the id map.
    #[arg(long)]
    use_is_a: bool,

    /// Emit InheritanceLink instead of SubsetLink for plain named parents.
    #[arg(long)]
    inheritance_for_plain: bool,

    /// Emit MemberLink statements for `oboInOwl:inSubset`.
    #[arg(long)]
    emit_subsets: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Translate {
            input,
            out,
            format,
            report,
        } => cmd_translate(&input, out.as_deref(), &format, report.as_deref()),
        Commands::Shapes { input } => cmd_shapes(&input),
        Commands::Namespaces { input } => cmd_namespaces(&input),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

// ============================================================================
// Configuration
// ============================================================================

fn parse_dialect(text: &str) -> Result<Dialect> {
    match text {
        "auto" => Ok(Dialect::Auto),
        "rdf-xml" | "rdf_xml" | "rdfxml" | "xml" => Ok(Dialect::RdfXml),
        "functional" | "ofn" => Ok(Dialect::Functional),
        other => Err(anyhow!(
            "unknown dialect `{other}` (expected auto, rdf-xml or functional)"
        )),
    }
}

fn load_config(input: &InputArgs) -> Result<TranslatorConfig> {
    let mut config = match &input.config {
        Some(path) => TranslatorConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TranslatorConfig::default(),
    };
    if let Some(dialect) = &input.dialect {
        config.dialect = parse_dialect(dialect)?;
    }
    if input.include_obsolete {
        config.obsolete = ObsoletePolicy::Include;
    }
    if input.use_is_a {
        config.is_a_aliases = IsAAliasPolicy::Apply;
    }
    if input.inheritance_for_plain {
        config.plain_subclass_link = PlainSubclassLink::Inheritance;
    }
    if input.emit_subsets {
        config.emit_subset_membership = true;
    }
    Ok(config)
}

fn run(input: &InputArgs) -> Result<Translation> {
    let config = load_config(input)?;
    let tables = AuxTables::load(
        input.ro.as_deref(),
        input.iao.as_deref(),
        input.id_map.as_deref(),
    )
    .context("failed to load auxiliary tables")?;
    let translator = Translator::new(tables, config).context("invalid id map")?;
    translator
        .translate_path(&input.ontology)
        .with_context(|| format!("failed to translate {}", input.ontology.display()))
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_translate(
    input: &InputArgs,
    out: Option<&Path>,
    format: &str,
    report_path: Option<&Path>,
) -> Result<()> {
    if !matches!(format, "scheme" | "json") {
        return Err(anyhow!("unknown format `{format}` (expected scheme or json)"));
    }
    eprintln!(
        "{} {}",
        "Translating".green().bold(),
        input.ontology.display()
    );

    let translation = run(input)?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_output(BufWriter::new(file), &translation, format)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  {} {}", "→".cyan(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_output(stdout.lock(), &translation, format).context("failed to write stdout")?;
        }
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&translation.report)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  {} {}", "→".cyan(), path.display());
    }

    print_summary(&translation.report);
    Ok(())
}

fn write_output<W: Write>(mut writer: W, translation: &Translation, format: &str) -> Result<()> {
    match format {
        "json" => {
            writer.write_all(render_statements_json(&translation.statements)?.as_bytes())?;
            writer.flush()?;
        }
        _ => {
            write_statements(&mut writer, &translation.statements)?;
        }
    }
    Ok(())
}

fn cmd_shapes(input: &InputArgs) -> Result<()> {
    let translation = run(input)?;
    let report = &translation.report;

    println!("{}", "shapes".bold());
    for (shape, count) in &report.shapes {
        println!("  {:<20} {}", shape, count);
    }
    if !report.skipped.is_empty() {
        println!("{}", "skipped".bold());
        for (reason, count) in &report.skipped {
            println!("  {:<20} {}", reason, count);
        }
    }
    if !report.unsupported_constructs.is_empty() {
        println!("{}", "unsupported".bold());
        for (construct, count) in &report.unsupported_constructs {
            println!("  {:<20} {}", construct, count);
        }
    }
    print_summary(report);
    Ok(())
}

fn cmd_namespaces(input: &Path) -> Result<()> {
    let namespaces = extract_namespaces_from_path(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    for (prefix, uri) in namespaces.iter() {
        let prefix = if prefix.is_empty() { "(default)" } else { prefix };
        println!("{:<16} {}", prefix.cyan(), uri);
    }
    eprintln!(
        "  {} {} prefixes",
        "→".yellow(),
        namespaces.len()
    );
    Ok(())
}

fn print_summary(report: &TranslationReport) {
    eprintln!(
        "  {} {} classes ({} obsolete skipped), {} statements",
        "→".yellow(),
        report.classes_seen,
        report.obsolete_skipped,
        report.statements
    );
    let skipped = report.skipped_axioms();
    let line = format!(
        "{} of {} axioms translated, {} skipped",
        report.translated_axioms(),
        report.axioms_seen,
        skipped
    );
    if skipped > 0 {
        eprintln!("  {} {}", "→".yellow(), line.yellow());
    } else {
        eprintln!("  {} {}", "→".yellow(), line);
    }
    eprintln!("  {} {}", "→".yellow(), report.digest.dimmed());
}
