use adoc_tidy::config::{self, ConvertConfig};
use adoc_tidy::logging;
use adoc_tidy::tree::read_document;
use adoc_tidy::{
    atomic_write, ConversionPlan, Document, ReconcileJob, ReconcileOptions, Rewriter, PIPELINE,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "adoc-tidy")]
#[command(about = "Kramdoc-to-Antora AsciiDoc converter and docstring reconciler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Kramdoc document tree into Antora-ready AsciiDoc
    Convert {
        /// Configuration file (built-in configuration if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dry run - read the sources and report matches without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Rewrite old-format docstring bindings using a new-format reference
    Reconcile {
        /// Configuration file (built-in configuration if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the new-format document
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Directory holding the old-format document
        #[arg(long)]
        target: Option<PathBuf>,

        /// Document file name, looked up in both directories
        #[arg(short, long)]
        file: Option<String>,

        /// Where the converted document is written
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Also write the diagnostics as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the rewrite rules in application order
    Rules {
        /// Configuration file (built-in configuration if not specified)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            config,
            dry_run,
            diff,
        } => cmd_convert(config, dry_run, diff),

        Commands::Reconcile {
            config,
            reference,
            target,
            file,
            output_dir,
            report,
        } => cmd_reconcile(config, reference, target, file, output_dir, report),

        Commands::Rules { config } => cmd_rules(config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ConvertConfig> {
    Ok(config::load(path.as_deref())?)
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Helper: Show unified diff between original and converted content
fn display_diff(file: &Path, original: &str, converted: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (converted)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, converted);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
}

fn cmd_convert(config_path: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    // 1. Configuration and run log
    let config = load_config(config_path)?;
    let settings = &config.convert;
    let log_path = logging::init_file_logging(&settings.log_dir)?;
    let rewriter = Rewriter::new(&config)?;

    tracing::info!("Source path: {}", absolute(&settings.source_path).display());
    tracing::info!("Output path: {}", absolute(&settings.output_folder).display());

    // 2. Select folders and documents
    let plan = ConversionPlan::build(settings)?;
    if plan.is_empty() {
        tracing::warn!(
            "No folders found in source folder with names from: {:?}",
            settings.folders
        );
        println!(
            "{}",
            format!(
                "No folders found in {} with names from {:?}",
                settings.source_path.display(),
                settings.folders
            )
            .yellow()
        );
        return Ok(());
    }

    println!("Source: {}", settings.source_path.display());
    println!("Output: {}", settings.output_folder.display());
    println!();

    // 3. Mirror the tree
    if dry_run {
        println!("{}", "[DRY RUN - nothing will be written]".cyan());
    } else {
        plan.materialize(settings.clean_output)?;
    }

    // 4. Rewrite every document
    let mut total_converted = 0;
    let mut total_changed = 0;
    let mut total_matches = 0;

    for planned in &plan.documents {
        let read_from = if dry_run {
            &planned.source
        } else {
            &planned.output
        };
        let original = read_document(read_from)?;

        tracing::info!("File: {}", planned.output.display());
        let outcome = rewriter.rewrite(&Document::new(planned.path.clone(), original.as_str()));
        total_converted += 1;
        total_matches += outcome.counts.total();

        if outcome.text == original {
            println!("{} {}: unchanged", "⊙".yellow(), planned.path);
            continue;
        }

        if !dry_run {
            atomic_write(&planned.output, outcome.text.as_bytes())
                .with_context(|| format!("failed to write {}", planned.output.display()))?;
        }
        total_changed += 1;

        let verb = if dry_run { "Would convert" } else { "Converted" };
        println!(
            "{} {}: {} ({} matches)",
            "✓".green(),
            planned.path,
            verb,
            outcome.counts.total()
        );

        if show_diff {
            display_diff(&planned.output, &original, &outcome.text);
        }
    }

    tracing::info!("Files converted total: {}", total_converted);

    // 5. Summary
    println!();
    println!("{}", "Summary:".bold());
    println!("  {} documents", format!("{}", total_converted).green());
    println!("  {} changed", format!("{}", total_changed).green());
    println!("  {} rule matches", format!("{}", total_matches).cyan());
    println!("{}", format!("Log: {}", log_path.display()).dimmed());
    println!();
    println!("Files converted total: {}", total_converted);
    println!("Conversion finished");

    Ok(())
}

fn cmd_reconcile(
    config_path: Option<PathBuf>,
    reference: Option<PathBuf>,
    target: Option<PathBuf>,
    file: Option<String>,
    output_dir: PathBuf,
    report: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let settings = &config.reconcile;
    logging::init_console_logging()?;

    // CLI flags win over the configuration.
    let reference_dir = reference
        .or_else(|| settings.reference_dir.clone())
        .context("no reference directory: pass --reference or set reconcile.reference_dir")?;
    let target_dir = target
        .or_else(|| settings.target_dir.clone())
        .context("no target directory: pass --target or set reconcile.target_dir")?;
    let file_name = file
        .or_else(|| settings.file_name.clone())
        .context("no document name: pass --file or set reconcile.file_name")?;

    let job = ReconcileJob::new(
        &reference_dir,
        &target_dir,
        &file_name,
        &output_dir,
        &settings.output_prefix,
    );
    let result = job.run(&ReconcileOptions::from(settings))?;
    let diagnostics = &result.diagnostics;
    diagnostics.log_summary();

    for collision in &diagnostics.collisions {
        println!(
            "{} Duplicate leading line {:?}: {} replaced by {}",
            "⊙".yellow(),
            collision.leading_line,
            collision.replaced_binding,
            collision.binding
        );
    }
    for item in &diagnostics.unresolved {
        match &item.suggestion {
            Some(suggestion) => println!(
                "{} line {}: {} (closest: {})",
                "✗".red(),
                item.line,
                item.text,
                suggestion
            ),
            None => println!("{} line {}: {}", "✗".red(), item.line, item.text),
        }
    }
    for item in &diagnostics.review {
        println!("{} line {}: {}", "⊘".cyan(), item.line, item.text);
    }

    if let Some(report_path) = report {
        let json = serde_json::to_string_pretty(diagnostics)?;
        atomic_write(&report_path, json.as_bytes())
            .with_context(|| format!("failed to write {}", report_path.display()))?;
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} bindings added",
        format!("{}", diagnostics.bindings_added()).green()
    );
    println!(
        "  {} unresolved",
        format!("{}", diagnostics.unresolved.len()).red()
    );
    println!(
        "  {} to review",
        format!("{}", diagnostics.review.len()).cyan()
    );
    println!(
        "  {} placeholders left",
        format!("{}", diagnostics.placeholders.unresolved).yellow()
    );
    println!("Result: {}", job.output.display());

    Ok(())
}

fn cmd_rules(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    println!("{}", "Rewrite pipeline".bold());
    for (position, rule) in PIPELINE.iter().enumerate() {
        println!(
            "  {:>2}. {} {}",
            position + 1,
            rule.label(),
            format!("[{}]", rule.scope()).dimmed()
        );
    }

    println!();
    println!("{}", "Overrides".bold());
    if config.overrides.is_empty() {
        println!("{}", "  No overrides configured".yellow());
    }
    for item in &config.overrides {
        let scope = if item.documents.is_empty() {
            "all documents".to_string()
        } else {
            item.documents.join(", ")
        };
        println!("  - {} {}", item.label, format!("[{}]", scope).dimmed());
    }

    Ok(())
}
