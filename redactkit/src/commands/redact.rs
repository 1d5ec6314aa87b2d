// redactkit/src/commands/redact.rs
//! The `redact` command: runs files, directory trees or stdin through the
//! redaction engine and reports what was removed.

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use walkdir::WalkDir;

use redactkit_core::{RedactionEngine, RedactionList, RuleSpec};

use crate::cli::RedactCommand;
use crate::commands::load_rules;
use crate::ui::redaction_summary;

/// Path recorded in the ledger for stdin input.
pub const STDIN_PATH: &str = "stdin";

/// Options for [`run_redact`].
#[derive(Debug, Clone, Default)]
pub struct RedactOptions {
    pub rules: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub show_summary: bool,
}

impl RedactOptions {
    pub fn from_command(command: RedactCommand, quiet: bool) -> Self {
        Self {
            rules: command.rules,
            input: command.input,
            output: command.output,
            report: command.report,
            show_summary: !quiet && !command.no_summary,
        }
    }
}

/// Runs the `redact` command and returns the redactions it performed.
pub async fn run_redact(engine: &RedactionEngine, opts: RedactOptions) -> Result<RedactionList> {
    let rules = Arc::new(load_rules(opts.rules.as_deref())?);
    info!("Starting redaction with {} custom rules.", rules.len());

    match opts.input.as_deref() {
        None => redact_stdin(engine, &rules, opts.output.clone()).await?,
        Some(input) if input.is_dir() => {
            let Some(output) = opts.output.as_deref() else {
                bail!("--output is required when --input is a directory");
            };
            redact_tree(engine, &rules, input, output).await?;
        }
        Some(input) => {
            let engine = engine.clone();
            let rules = Arc::clone(&rules);
            let input = input.to_path_buf();
            let output = opts.output.clone();
            tokio::task::spawn_blocking(move || {
                let ledger_path = input_ledger_path(&input);
                redact_file(&engine, &rules, &input, &ledger_path, output.as_deref())
            })
            .await
            .context("Redaction task panicked")??;
        }
    }

    let list = engine.ledger().snapshot_async().await;
    debug!("Redaction finished with {} recorded redactions.", list.len());

    if let Some(report) = opts.report.as_deref() {
        let json = list.to_json_pretty().context("Failed to serialize redaction report")?;
        fs::write(report, json).with_context(|| format!("Failed to write report: {}", report.display()))?;
        info!("Wrote redaction report to {}", report.display());
    }

    if opts.show_summary {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        redaction_summary::print_summary(&list, &mut stderr.lock(), supports_color)?;
    }
    // Printed even with --quiet.
    redaction_summary::print_warnings(&list, &mut io::stderr().lock())?;
    Ok(list)
}

async fn redact_stdin(engine: &RedactionEngine, rules: &Arc<Vec<RuleSpec>>, output: Option<PathBuf>) -> Result<()> {
    let engine = engine.clone();
    let rules = Arc::clone(rules);
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut redacted = engine.redact_reader(BufReader::new(io::stdin()), STDIN_PATH, &rules)?;
        match output {
            Some(path) => {
                let file = fs::File::create(&path)
                    .with_context(|| format!("Failed to create output file: {}", path.display()))?;
                let mut writer = BufWriter::new(file);
                io::copy(&mut redacted, &mut writer).context("Failed to redact stdin")?;
                writer.flush()?;
            }
            None => {
                let stdout = io::stdout();
                let mut writer = BufWriter::new(stdout.lock());
                io::copy(&mut redacted, &mut writer).context("Failed to redact stdin")?;
                writer.flush()?;
            }
        }
        Ok(())
    })
    .await
    .context("Redaction task panicked")?
}

/// Redacts every file under `input` into the same relative path under
/// `output`. Files are processed concurrently.
async fn redact_tree(engine: &RedactionEngine, rules: &Arc<Vec<RuleSpec>>, input: &Path, output: &Path) -> Result<()> {
    let mut tasks = JoinSet::new();

    for entry in WalkDir::new(input).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", input.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(input)?.to_path_buf();
        let source = entry.path().to_path_buf();
        let destination = output.join(&relative);
        let ledger_path = relative_ledger_path(&relative);
        let engine = engine.clone();
        let rules = Arc::clone(rules);

        tasks.spawn_blocking(move || {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            redact_file(&engine, &rules, &source, &ledger_path, Some(&destination))
        });
    }

    let mut processed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        joined.context("Redaction task panicked")??;
        processed += 1;
    }
    info!("Redacted {} files from {}", processed, input.display());
    Ok(())
}

/// Redacts one file, writing to `output` or stdout.
fn redact_file(
    engine: &RedactionEngine,
    rules: &[RuleSpec],
    input: &Path,
    ledger_path: &str,
    output: Option<&Path>,
) -> Result<()> {
    let content = fs::read(input).with_context(|| format!("Failed to read input file: {}", input.display()))?;
    let redacted = engine
        .redact(&content, ledger_path, rules)
        .with_context(|| format!("Failed to redact {}", input.display()))?;

    match output {
        Some(path) => fs::write(path, &redacted)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writer.write_all(&redacted)?;
            writer.flush()?;
        }
    }
    debug!("Redacted {} ({} bytes)", ledger_path, redacted.len());
    Ok(())
}

/// `/`-separated form of a relative path, as matched by rule globs. `.`
/// components are dropped.
fn relative_ledger_path(relative: &Path) -> String {
    relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Ledger path for a single `--input` file. Relative paths are normalized the
/// same way as files found in a directory walk, so `./logs/app.log` matches
/// `logs/*.log`. Absolute paths are matched as given, with `/` separators.
fn input_ledger_path(input: &Path) -> String {
    if input.is_absolute() {
        input.to_string_lossy().replace('\\', "/")
    } else {
        relative_ledger_path(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redactkit_core::{RedactionLedger, RuleSpec};
    use tempfile::tempdir;

    #[test]
    fn test_relative_ledger_path_uses_forward_slashes() {
        let path: PathBuf = ["logs", "nested", "app.log"].iter().collect();
        assert_eq!(relative_ledger_path(&path), "logs/nested/app.log");
    }

    #[test]
    fn test_input_ledger_path_drops_current_dir() {
        assert_eq!(input_ledger_path(Path::new("./logs/app.log")), "logs/app.log");
        assert_eq!(input_ledger_path(Path::new("logs/./app.log")), "logs/app.log");
        assert_eq!(input_ledger_path(Path::new("app.log")), "app.log");
    }

    #[test]
    fn test_input_ledger_path_keeps_absolute_paths() {
        let absolute = std::env::temp_dir().join("logs").join("app.log");
        let expected = absolute.to_string_lossy().replace('\\', "/");
        assert_eq!(input_ledger_path(&absolute), expected);
    }

    #[test]
    fn test_dotted_input_path_matches_rule_glob() -> Result<()> {
        let rules = vec![RuleSpec {
            file: Some("logs/*.log".to_string()),
            values: vec!["abc".to_string()],
            ..Default::default()
        }];
        let dir = tempdir()?;
        let src = dir.path().join("app.log");
        let dst = dir.path().join("out.log");
        fs::write(&src, "token=abc\n")?;

        let engine = RedactionEngine::new(RedactionLedger::new());
        let ledger_path = input_ledger_path(Path::new("./logs/app.log"));
        redact_file(&engine, &rules, &src, &ledger_path, Some(&dst))?;
        assert_eq!(fs::read_to_string(&dst)?, "token=***HIDDEN***\n");
        assert_eq!(engine.ledger().snapshot().by_file["logs/app.log"].len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_tree_is_mirrored_with_relative_paths() -> Result<()> {
        let input = tempdir()?;
        let output = tempdir()?;
        fs::create_dir_all(input.path().join("logs"))?;
        fs::write(input.path().join("logs/app.log"), "token=abc\n")?;
        fs::write(input.path().join("notes.txt"), "token=abc\n")?;

        let rules_dir = tempdir()?;
        let rules_file = rules_dir.path().join("rules.yaml");
        fs::write(
            &rules_file,
            "redacts:\n  - file: 'logs/*.log'\n    regex: ['(token=)(?P<mask>\\w+)']\n",
        )?;

        let engine = RedactionEngine::new(RedactionLedger::new());
        let list = run_redact(
            &engine,
            RedactOptions {
                rules: Some(rules_file),
                input: Some(input.path().to_path_buf()),
                output: Some(output.path().to_path_buf()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(fs::read_to_string(output.path().join("logs/app.log"))?, "token=***HIDDEN***\n");
        assert_eq!(fs::read_to_string(output.path().join("notes.txt"))?, "token=abc\n");
        assert_eq!(list.by_file["logs/app.log"].len(), 1);
        assert!(!list.by_file.contains_key("notes.txt"));
        Ok(())
    }

    #[tokio::test]
    async fn test_directory_input_requires_output() {
        let input = tempdir().unwrap();
        let engine = RedactionEngine::new(RedactionLedger::new());
        let err = run_redact(
            &engine,
            RedactOptions {
                input: Some(input.path().to_path_buf()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("--output is required"));
    }

    #[test]
    fn test_redact_file_writes_output() -> Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("in.txt");
        let dst = dir.path().join("out.txt");
        fs::write(&src, "ip 10.0.0.1\n")?;
        let engine = RedactionEngine::new(RedactionLedger::new());
        redact_file(&engine, &Vec::<RuleSpec>::new(), &src, "in.txt", Some(&dst))?;
        assert_eq!(fs::read_to_string(&dst)?, "ip ***HIDDEN***\n");
        Ok(())
    }
}
