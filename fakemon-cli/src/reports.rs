use anyhow::Result;
use colored::Colorize;
use fakemon_stats::{
    CreatureProfile, EditOutcome, RejectReason, StageRangeTable, StageStatTable, Stat, StatMap,
    StatRangeMap,
};
use serde::Serialize;
use std::io::Write;

use crate::edits::EditSpec;

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: u8,
    pub stats: StatMap,
    /// Total minus the sum of the base stats.
    pub residual: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranges: Option<StatRangeMap>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditRecord {
    pub stage: u8,
    pub stat: Stat,
    pub min: u32,
    pub max: u32,
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EditRecord {
    #[must_use]
    pub fn new(request: &EditSpec, outcome: &EditOutcome) -> Self {
        let reason = match outcome {
            EditOutcome::Accepted(_) => None,
            EditOutcome::Rejected(RejectReason::InvertedRange) => {
                Some("minimum exceeds maximum".to_string())
            }
            EditOutcome::Rejected(RejectReason::BelowPreviousStage { floor }) => Some(format!(
                "minimum is below the previous stage value {floor}"
            )),
        };
        Self {
            stage: request.stage,
            stat: request.stat,
            min: request.min,
            max: request.max,
            accepted: reason.is_none(),
            reason,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,
    pub num_stages: u8,
    pub stat_increment: u32,
    pub stages: Vec<StageReport>,
    pub edits: Vec<EditRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CreatureProfile>,
}

impl GenerationReport {
    #[must_use]
    pub fn stages_from(generated: &StageStatTable, ranges: &StageRangeTable) -> Vec<StageReport> {
        generated
            .iter()
            .map(|(&stage, stats)| StageReport {
                stage,
                stats: *stats,
                residual: stats.residual(),
                ranges: ranges.get(stage).copied(),
            })
            .collect()
    }
}

pub fn write_console_report(out: &mut dyn Write, report: &GenerationReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Fakemon Stat Line".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())?;
    match &report.share_code {
        Some(code) => writeln!(out, "Seed: {} ({})", code.bold(), report.seed)?,
        None => writeln!(out, "Seed: {}", report.seed)?,
    }
    writeln!(
        out,
        "Stages: {}  Increment: {}",
        report.num_stages, report.stat_increment
    )?;
    writeln!(out)?;

    for stage in &report.stages {
        writeln!(out, "{}", format!("Stage {}", stage.stage).bold())?;
        for stat in Stat::ALL {
            let value = stage.stats.get(stat);
            let range = stage
                .ranges
                .map(|ranges| format!("  [{}]", ranges.get(stat)))
                .unwrap_or_default();
            if stat.is_total() {
                writeln!(out, "   {:<9} {}{}", stat.as_str(), value.to_string().green(), range)?;
            } else {
                writeln!(out, "   {:<9} {value}{range}", stat.as_str())?;
            }
        }
        if stage.residual != 0 {
            writeln!(
                out,
                "   {}",
                format!("Total is off the base sum by {}", stage.residual).yellow()
            )?;
        }
        writeln!(out)?;
    }

    if !report.edits.is_empty() {
        writeln!(out, "{}", "✏️  Edits".bright_yellow().bold())?;
        for edit in &report.edits {
            let status = if edit.accepted {
                "✅ applied".green()
            } else {
                "❌ ignored".red()
            };
            write!(
                out,
                "{status} stage {} {} {}-{}",
                edit.stage, edit.stat, edit.min, edit.max
            )?;
            match &edit.reason {
                Some(reason) => writeln!(out, ": {reason}")?,
                None => writeln!(out)?,
            }
        }
        writeln!(out)?;
    }

    if let Some(profile) = &report.profile {
        writeln!(out, "{}", "🧬 Profile".bright_magenta().bold())?;
        let typing = match profile.secondary_type {
            Some(secondary) => format!("{}/{}", profile.primary_type, secondary),
            None => profile.primary_type.to_string(),
        };
        writeln!(out, "   Type: {typing}")?;
        writeln!(out, "   Habitat: {}", profile.habitat)?;
        writeln!(out, "   Climate: {}", profile.climate)?;
        writeln!(out, "   Diet: {}", profile.diet)?;
        writeln!(out, "   Size: {}", profile.size)?;
    }
    Ok(())
}

pub fn write_json_report(out: &mut dyn Write, report: &GenerationReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_markdown_report(out: &mut dyn Write, report: &GenerationReport) -> Result<()> {
    writeln!(out, "# Fakemon Stat Line\n")?;
    match &report.share_code {
        Some(code) => writeln!(out, "**Seed:** `{code}` ({})\n", report.seed)?,
        None => writeln!(out, "**Seed:** {}\n", report.seed)?,
    }
    write!(out, "| Stage |")?;
    for stat in Stat::ALL {
        write!(out, " {stat} |")?;
    }
    writeln!(out)?;
    write!(out, "|-------|")?;
    for _ in Stat::ALL {
        write!(out, "------|")?;
    }
    writeln!(out)?;
    for stage in &report.stages {
        write!(out, "| {} |", stage.stage)?;
        for stat in Stat::ALL {
            write!(out, " {} |", stage.stats.get(stat))?;
        }
        writeln!(out)?;
    }

    if !report.edits.is_empty() {
        writeln!(out, "\n## Edits\n")?;
        for edit in &report.edits {
            let status = if edit.accepted { "applied" } else { "ignored" };
            write!(
                out,
                "- {status}: stage {} {} {}-{}",
                edit.stage, edit.stat, edit.min, edit.max
            )?;
            match &edit.reason {
                Some(reason) => writeln!(out, " ({reason})")?,
                None => writeln!(out)?,
            }
        }
    }

    if let Some(profile) = &report.profile {
        writeln!(out, "\n## Profile\n")?;
        writeln!(out, "- Primary type: {}", profile.primary_type)?;
        if let Some(secondary) = profile.secondary_type {
            writeln!(out, "- Secondary type: {secondary}")?;
        }
        writeln!(out, "- Habitat: {}", profile.habitat)?;
        writeln!(out, "- Climate: {}", profile.climate)?;
        writeln!(out, "- Diet: {}", profile.diet)?;
        writeln!(out, "- Size: {}", profile.size)?;
    }
    Ok(())
}
