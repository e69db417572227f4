#![allow(missing_docs)]
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use oasplit_core::checklist::{Checklist, ChecklistOptions};
use oasplit_core::partition::{DEFAULT_CATEGORY, DEFAULT_DELIMITER};
use oasplit_core::split::{DocumentSplitExt, OutputFormat, SplitByCategory};
use oasplit_core::{Diagnostics, Document, ToYaml};
use tracing::{Level, info, warn};

const USAGE: &str = "\
Usage: oasplit <command> <input> [options]

Commands:
  split <input>        One document per primary tag
      -o, --output <dir>         output directory (default: .)
      --format <json|yaml>       output format (default: json)
      --delimiter <char>         tag delimiter (default: |)
      --default-category <name>  category of untagged operations (default: Untagged)
      --no-flatten-parameters    keep parameter references
      --diagnostics <file>       write the recorded diagnostics as JSON
  dereference <input>  Inline every reference of the document
      -o, --output <file>        output file (default: stdout)
      --diagnostics <file>       write the recorded diagnostics as JSON
  checklist <input>    Markdown review checklist
      --base-url <url>           link operations to an interactive viewer
      --delimiter <char>         tag delimiter (default: |)
      --default-category <name>  label of untagged operations (default: Untagged)
      -o, --output <file>        output file (default: stdout)

Options:
  -v, --verbose        debug logs
  -q, --quiet          errors only
";

fn main() -> Result<()> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        io::stdout().write_all(USAGE.as_bytes())?;
        return Ok(());
    }

    let level = if pargs.contains(["-v", "--verbose"]) {
        Level::DEBUG
    } else if pargs.contains(["-q", "--quiet"]) {
        Level::ERROR
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let command = Command::parse(&mut pargs).context("parsing arguments")?;
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        warn!(?remaining, "Warning: unused arguments left");
    }

    command.run()
}

/// Label options shared by `split` and `checklist`.
#[derive(Debug, Clone, PartialEq)]
struct Labels {
    delimiter: char,
    default_category: String,
}

impl Labels {
    fn parse(pargs: &mut pico_args::Arguments) -> Result<Self> {
        let delimiter = pargs
            .opt_value_from_str("--delimiter")
            .context("parsing delimiter argument")?;
        let default_category = pargs
            .opt_value_from_str("--default-category")
            .context("parsing default category argument")?;
        Ok(Self {
            delimiter: delimiter.unwrap_or(DEFAULT_DELIMITER),
            default_category: default_category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        })
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Split {
        input: PathBuf,
        output: PathBuf,
        format: OutputFormat,
        labels: Labels,
        flatten_parameters: bool,
        diagnostics: Option<PathBuf>,
    },
    Dereference {
        input: PathBuf,
        output: Option<PathBuf>,
        diagnostics: Option<PathBuf>,
    },
    Checklist {
        input: PathBuf,
        base_url: Option<String>,
        labels: Labels,
        output: Option<PathBuf>,
    },
}

impl Command {
    fn parse(pargs: &mut pico_args::Arguments) -> Result<Self> {
        let Some(name) = pargs.subcommand().context("parsing command")? else {
            bail!("missing command\n\n{USAGE}");
        };

        let command = match name.as_str() {
            "split" => {
                let output: Option<PathBuf> = pargs
                    .opt_value_from_str(["-o", "--output"])
                    .context("parsing output argument")?;
                let format = pargs
                    .opt_value_from_fn("--format", parse_format)
                    .context("parsing format argument")?;
                let labels = Labels::parse(pargs)?;
                let flatten_parameters = !pargs.contains("--no-flatten-parameters");
                let diagnostics = pargs
                    .opt_value_from_str("--diagnostics")
                    .context("parsing diagnostics argument")?;
                Self::Split {
                    input: pargs.free_from_str().context("parsing input argument")?,
                    output: output.unwrap_or_else(|| PathBuf::from(".")),
                    format: format.unwrap_or_default(),
                    labels,
                    flatten_parameters,
                    diagnostics,
                }
            }
            "dereference" => {
                let output = pargs
                    .opt_value_from_str(["-o", "--output"])
                    .context("parsing output argument")?;
                let diagnostics = pargs
                    .opt_value_from_str("--diagnostics")
                    .context("parsing diagnostics argument")?;
                Self::Dereference {
                    input: pargs.free_from_str().context("parsing input argument")?,
                    output,
                    diagnostics,
                }
            }
            "checklist" => {
                let base_url = pargs
                    .opt_value_from_str("--base-url")
                    .context("parsing base url argument")?;
                let labels = Labels::parse(pargs)?;
                let output = pargs
                    .opt_value_from_str(["-o", "--output"])
                    .context("parsing output argument")?;
                Self::Checklist {
                    input: pargs.free_from_str().context("parsing input argument")?,
                    base_url,
                    labels,
                    output,
                }
            }
            other => bail!("unknown command '{other}'\n\n{USAGE}"),
        };
        Ok(command)
    }

    fn run(self) -> Result<()> {
        match self {
            Self::Split {
                input,
                output,
                format,
                labels,
                flatten_parameters,
                diagnostics,
            } => {
                let document = load(&input)?;
                let splitter = SplitByCategory::new()
                    .with_delimiter(labels.delimiter)
                    .with_default_category(labels.default_category)
                    .with_format(format)
                    .with_flatten_parameters(flatten_parameters);
                let result = document.split_with(splitter);
                report(&result.diagnostics, diagnostics.as_deref())?;

                fs::create_dir_all(&output)
                    .with_context(|| format!("creating {}", output.display()))?;
                for fragment in &result.fragments {
                    let path = output.join(&fragment.path);
                    let content = format.render(&fragment.content)?;
                    fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(category = %fragment.category, path = %path.display(), "written");
                }
                info!(count = result.fragment_count(), "split complete");
            }
            Self::Dereference {
                input,
                output,
                diagnostics,
            } => {
                let document = load(&input)?;
                let (flat, recorded) = document.dereference();
                report(&recorded, diagnostics.as_deref())?;

                let content = if output.as_deref().is_some_and(is_yaml) {
                    flat.to_yaml().context("serializing YAML")?
                } else {
                    serde_json::to_string_pretty(&flat).context("serializing JSON")?
                };
                emit(output.as_deref(), &content)?;
            }
            Self::Checklist {
                input,
                base_url,
                labels,
                output,
            } => {
                let document = load(&input)?;
                let mut options = ChecklistOptions::new()
                    .with_delimiter(labels.delimiter)
                    .with_default_category(labels.default_category);
                if let Some(base_url) = base_url {
                    options = options.with_base_url(base_url);
                }
                let checklist = Checklist::from_document(&document, &options);
                info!(operations = checklist.item_count(), "checklist built");
                emit(output.as_deref(), &checklist.to_string())?;
            }
        }
        Ok(())
    }
}

fn parse_format(value: &str) -> Result<OutputFormat> {
    match value {
        "json" => Ok(OutputFormat::Json),
        "yaml" | "yml" => Ok(OutputFormat::Yaml),
        other => bail!("unknown format '{other}', expected json or yaml"),
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("yaml" | "yml")
    )
}

fn load(input: &Path) -> Result<Document> {
    let text =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let document = if is_yaml(input) {
        Document::from_yaml_str(&text)
    } else {
        Document::from_json_str(&text)
    };
    document.with_context(|| format!("loading {}", input.display()))
}

/// Logs the diagnostics count and writes the JSON report when asked to.
fn report(diagnostics: &Diagnostics, path: Option<&Path>) -> Result<()> {
    if !diagnostics.is_empty() {
        warn!(count = diagnostics.len(), "problems recorded while processing");
    }
    if let Some(path) = path {
        let content = diagnostics_report(diagnostics)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "diagnostics written");
    }
    Ok(())
}

fn diagnostics_report(diagnostics: &Diagnostics) -> Result<String> {
    serde_json::to_string_pretty(diagnostics).context("serializing diagnostics")
}

fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
