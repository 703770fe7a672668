// CLI commands for running code on the remote backend
use anyhow::{bail, Context, Result};
use praxis_judge::{DispatchMode, JudgeConfig, Orchestrator, TestCase};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Language name to backend id, for a stock deployment. Deployments that
/// encode runtime versions differently can pass a numeric id instead.
const LANGUAGES: &[(&str, u32)] = &[
    ("c", 50),
    ("cpp", 54),
    ("java", 62),
    ("javascript", 63),
    ("python", 71),
    ("rust", 73),
];

#[derive(Debug, Deserialize)]
struct TestFileEntry {
    input: String,
    expected_output: String,
}

fn language_id(name: &str) -> Result<u32> {
    if let Ok(id) = name.parse::<u32>() {
        return Ok(id);
    }
    let lower = name.to_lowercase();
    LANGUAGES
        .iter()
        .find(|(known, _)| *known == lower)
        .map(|(_, id)| *id)
        .with_context(|| {
            format!(
                "unknown language '{}'; see `praxis-cli languages` or pass a numeric id",
                name
            )
        })
}

fn load_tests(path: &Path) -> Result<Vec<TestCase>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read test-case file {}", path.display()))?;
    let entries: Vec<TestFileEntry> =
        serde_json::from_str(&raw).context("failed to parse test-case file")?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| TestCase {
            id: (idx + 1) as u32,
            input: entry.input,
            expected_output: entry.expected_output,
        })
        .collect())
}

pub async fn run(
    source_path: &Path,
    tests_path: &Path,
    mode: &str,
    url: Option<String>,
    key: Option<String>,
    language: &str,
    timeout_secs: u64,
) -> Result<()> {
    let source = fs::read_to_string(source_path)
        .with_context(|| format!("failed to read source file {}", source_path.display()))?;
    let tests = load_tests(tests_path)?;

    let mode = match mode {
        "sync" => DispatchMode::Sync,
        "batch" => DispatchMode::Batch,
        other => bail!("unknown mode '{}', expected sync or batch", other),
    };

    let mut config = match url {
        Some(url) => JudgeConfig::new(url),
        None => JudgeConfig::from_env().context("no --url given and JUDGE_API_URL is not set")?,
    };
    if let Some(key) = key.or_else(|| std::env::var("JUDGE_API_KEY").ok()) {
        config.api_key = Some(key);
    }
    config.language_id = language_id(language)?;
    config.wall_clock_timeout = Duration::from_secs(timeout_secs);

    println!("→ Running {} against {} test cases", source_path.display(), tests.len());
    println!("  Backend: {}", config.base_url);
    println!();

    let orchestrator = Orchestrator::from_config(config)?;
    let report = orchestrator.run_tests(&source, &tests, mode).await?;

    for outcome in &report.outcomes {
        let marker = if outcome.passed { "✓" } else { "✗" };
        println!("  {} test {} → {:?}", marker, outcome.test_id, outcome.status);
        if let Some(time) = outcome.time_secs {
            println!("    time: {:.3}s", time);
        }
        if let Some(error) = &outcome.error {
            if let Some(line) = error.lines().next() {
                println!("    {}", line);
            }
        }
    }
    println!();
    println!("→ {} / {} tests passed", report.passed, report.total);

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

pub fn list_languages() {
    println!("Known languages (name → backend id):");
    for (name, id) in LANGUAGES {
        println!("  {:<12} {}", name, id);
    }
    println!();
    println!("Pass --language with a name above or any numeric backend id.");
}
