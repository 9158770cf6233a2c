use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use colored::Colorize;
use patchgen_diff::{
    format as render_unified, is_blank_line, split_lines, FileDiff, Header, SequenceMatcher,
};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::{DiffConfig, OutputFormat};
use crate::error::{CliError, CliResult};

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The inputs match; no patch file was created.
    Identical,
    /// A patch was written to this path.
    Written(PathBuf),
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = DiffConfig::resolve(&cli)?;
    generate(&config)?;
    Ok(())
}

/// Diff the two configured files and write the patch.
pub fn generate(config: &DiffConfig) -> CliResult<Outcome> {
    println!("{}", "--- Automatic Diff Generator ---".bold());

    println!("Reading original file: {}", config.from.display());
    let old_text = read_input(&config.from)?;
    println!("Reading new file: {}", config.to.display());
    let new_text = read_input(&config.to)?;

    let now = timestamp();
    let header = Header::new(config.from.display().to_string(), config.to.display().to_string())
        .with_dates(now.clone(), now);

    let (a, b) = (split_lines(&old_text), split_lines(&new_text));
    let matcher = build_matcher(config, &a, &b);
    let opcodes = matcher.opcodes();
    debug!(
        old_lines = a.len(),
        new_lines = b.len(),
        opcodes = opcodes.len(),
        popular = matcher.popular_len(),
        "diff computed"
    );

    match config.format {
        OutputFormat::Text => {
            let mut lines = render_unified(&a, &b, opcodes, config.context, header).peekable();
            if lines.peek().is_none() {
                return Ok(report_identical());
            }
            println!("Writing differences to patch file: {}", config.output.display());
            write_output(&config.output, |w| {
                lines.try_for_each(|line| w.write_all(line.as_bytes()))
            })?;
        }
        OutputFormat::Json => {
            let diff = FileDiff::new(&a, &b, opcodes, config.context, header);
            if diff.is_empty() {
                return Ok(report_identical());
            }
            debug!(
                hunks = diff.hunks.len(),
                additions = diff.additions(),
                deletions = diff.deletions(),
                "diff summary"
            );
            let json = serde_json::to_string_pretty(&diff)?;
            println!("Writing differences to patch file: {}", config.output.display());
            write_output(&config.output, |w| {
                w.write_all(json.as_bytes())?;
                w.write_all(b"\n")
            })?;
        }
    }

    println!(
        "\n{} Successfully created patch file: '{}'",
        "✓".green().bold(),
        config.output.display()
    );
    println!(
        "You can apply this patch using a command like: {}",
        format!("patch {} < {}", config.from.display(), config.output.display()).cyan()
    );
    Ok(Outcome::Written(config.output.clone()))
}

fn build_matcher<'a>(
    config: &DiffConfig,
    a: &'a [&'a str],
    b: &'a [&'a str],
) -> SequenceMatcher<'a, &'a str> {
    let mut builder = SequenceMatcher::builder().autojunk(config.autojunk);
    if config.junk_blank_lines {
        builder = builder.junk(|line: &&str| is_blank_line(line));
    }
    builder.build(a, b)
}

fn report_identical() -> Outcome {
    println!("\n{}", "Files are identical. No patch file will be created.".yellow());
    Outcome::Identical
}

fn read_input(path: &Path) -> CliResult<String> {
    let bytes = fs::read(path).map_err(|source| CliError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| CliError::InvalidEncoding {
        path: path.to_path_buf(),
    })?;
    debug!(path = %path.display(), bytes = text.len(), "input read");
    Ok(text)
}

fn write_output<F>(path: &Path, write: F) -> CliResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let unwritable = |source| CliError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(unwritable)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)
        .and_then(|()| writer.flush())
        .map_err(unwritable)?;
    info!(path = %path.display(), "patch written");
    Ok(())
}

/// Local time with microseconds and a numeric UTC offset.
fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
