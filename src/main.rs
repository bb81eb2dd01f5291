use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use recql::{files, frontmatter, query, DefaultMatcher, Error, Expr};
use serde_yaml::Value as YamlValue;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "recql", about = "Filter records with a field:value query language")]
struct Cli {
    #[arg(long, env = "RECQL_DIR", help = "Directory of markdown files with YAML frontmatter")]
    dir: Option<PathBuf>,

    #[arg(long, help = "Read markdown file paths from stdin")]
    stdin: bool,

    #[arg(
        long,
        conflicts_with = "stdin",
        help = "YAML file holding a sequence of records"
    )]
    records: Option<PathBuf>,

    #[arg(long, value_enum, help = "Print the parsed query and exit")]
    explain: Option<Explain>,

    #[arg(long, env = "RECQL_LOG", default_value = "warn", help = "Log filter directives")]
    log: String,

    #[arg(help = "Query, e.g. status:active and priority > 2")]
    query: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum Explain {
    /// Canonical prefix form
    Prefix,
    /// Fully parenthesized query syntax
    Query,
    /// Syntax tree as YAML
    Yaml,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::from(0),
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool, Error> {
    let expr = query::parse("query", &cli.query)?;

    if let Some(format) = cli.explain {
        print!("{}", explain(&expr, format)?);
        return Ok(true);
    }

    if let Some(path) = &cli.records {
        return run_records_mode(&expr, path);
    }

    let files = if cli.stdin {
        files::read_paths_from_stdin()
    } else if let Some(dir) = &cli.dir {
        files::collect_markdown_files(dir)
    } else {
        return Err(Error::NoRecordSource);
    };

    Ok(run_files_mode(&expr, &files, cli.dir.as_deref()))
}

fn explain(expr: &Expr, format: Explain) -> Result<String, Error> {
    match format {
        Explain::Prefix => Ok(format!("{}\n", expr)),
        Explain::Query => Ok(format!("{}\n", expr.to_query())),
        Explain::Yaml => serde_yaml::to_string(expr).map_err(Error::Render),
    }
}

fn run_files_mode(expr: &Expr, files: &[PathBuf], base: Option<&Path>) -> bool {
    let frontmatters: Vec<(&PathBuf, YamlValue)> = files
        .iter()
        .filter_map(|path| Some((path, frontmatter::parse_frontmatter(path)?)))
        .collect();
    debug!(files = files.len(), records = frontmatters.len(), "loaded frontmatter");

    let mut found = 0usize;
    for (path, fm) in &frontmatters {
        if expr.matches(fm, &DefaultMatcher) {
            found += 1;
            let display_path = base
                .and_then(|base| path.strip_prefix(base).ok())
                .unwrap_or(path.as_path())
                .display();
            println!("{}", display_path);
        }
    }

    info!(matched = found, "query finished");
    found > 0
}

fn run_records_mode(expr: &Expr, path: &Path) -> Result<bool, Error> {
    let records = files::load_records(path)?;
    let matched = expr.filter(&records, &DefaultMatcher);
    info!(records = records.len(), matched = matched.len(), "query finished");

    if matched.is_empty() {
        return Ok(false);
    }

    let yaml = serde_yaml::to_string(&matched).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    print!("{}", yaml);
    Ok(true)
}
