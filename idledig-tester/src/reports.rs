use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use crate::runner::SeedResult;

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[SeedResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Mission Run Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;

    let total = results.len();
    let parity_ok = results.iter().filter(|r| r.parity_ok).count();
    writeln!(out, "Seeds run: {total}")?;
    writeln!(out, "Parity held: {}", parity_ok.to_string().green())?;
    writeln!(out, "Parity broken: {}", (total - parity_ok).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.parity_ok {
            "✅ PARITY".green()
        } else {
            "❌ DIVERGED".red()
        };
        writeln!(out, "{} seed {}", status, result.seed.to_string().bold())?;
        writeln!(
            out,
            "   Live: {:.1}s, {} completed, {} started",
            result.live.consumed_seconds, result.live.completed, result.live.started
        )?;
        writeln!(
            out,
            "   Offline: {:.1}s, {} completed, {} started",
            result.offline.consumed_seconds, result.offline.completed, result.offline.started
        )?;
        writeln!(out, "   Outcomes: {}", join_counts(&result.outcomes))?;
        if result.warnings > 0 {
            writeln!(out, "   Terminated early: {}", result.warnings)?;
        }
        if !result.rewards.is_empty() {
            writeln!(out, "   Rewards: {}", join_counts(&result.rewards))?;
        }
        if let Some(detail) = &result.parity_detail {
            writeln!(out, "   • {}", detail.red())?;
        }
        writeln!(out, "   Log entries: {} ({:?})", result.log_entries, result.duration)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[SeedResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[SeedResult]) -> Result<()> {
    writeln!(out, "# IdleDig Mission Run Results\n")?;

    let total = results.len();
    let parity_ok = results.iter().filter(|r| r.parity_ok).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Seeds run**: {total}")?;
    writeln!(out, "- **Parity held**: {parity_ok}")?;
    writeln!(out, "- **Parity broken**: {}\n", total - parity_ok)?;

    writeln!(out, "## Seeds\n")?;
    writeln!(
        out,
        "| Seed | Parity | Live done | Offline done | Outcomes | Rewards |"
    )?;
    writeln!(out, "|------|--------|-----------|--------------|----------|---------|")?;
    for result in results {
        let status = if result.parity_ok { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            result.seed,
            status,
            result.live.completed,
            result.offline.completed,
            join_counts(&result.outcomes),
            join_counts(&result.rewards)
        )?;
    }

    let diverged: Vec<_> = results
        .iter()
        .filter_map(|r| r.parity_detail.as_ref().map(|d| (r.seed, d)))
        .collect();
    if !diverged.is_empty() {
        writeln!(out, "\n## Divergences\n")?;
        for (seed, detail) in diverged {
            writeln!(out, "- seed {seed}: {detail}")?;
        }
    }
    Ok(())
}

fn join_counts<'a>(counts: impl IntoIterator<Item = (&'a String, &'a u64)>) -> String {
    let parts: Vec<String> = counts
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}
