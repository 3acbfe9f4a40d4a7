use crate::stats::BatchSummary;
use crate::SimulationError;
use std::io::Write;

const WIDTH: usize = 80;

fn format_row(summary: &BatchSummary) -> String {
    format!(
        "{:<12}{:>6}{:>6}{:>10.2}{:>10.2}{:>10.2}{:>14.2}{:>12.2}\n",
        summary.label,
        summary.stand_threshold,
        summary.decks_count,
        summary.win_rate,
        summary.loss_rate,
        summary.tie_rate,
        summary.net_profit,
        summary.max_wager_seen
    )
}

fn format_header() -> String {
    format!(
        "{:<12}{:>6}{:>6}{:>10}{:>10}{:>10}{:>14}{:>12}\n{}\n",
        "strategy",
        "stand",
        "decks",
        "win %",
        "loss %",
        "tie %",
        "net profit",
        "max wager",
        "-".repeat(WIDTH)
    )
}

/// Writes `summaries` as a fixed width table, one row per configuration in the order given.
pub fn write_summaries(summaries: &[BatchSummary], mut writer: impl Write) -> std::io::Result<()> {
    writer.write_all(format_header().as_bytes())?;
    for summary in summaries {
        writer.write_all(format_row(summary).as_bytes())?;
    }
    writer.flush()
}

/// Writes every summary as its full labelled block.
pub fn write_detailed(summaries: &[BatchSummary], mut writer: impl Write) -> std::io::Result<()> {
    for summary in summaries {
        writeln!(writer, "{}", summary)?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
    }
    writer.flush()
}

/// Writes `summaries` as a pretty printed JSON array.
pub fn write_json(
    summaries: &[BatchSummary],
    mut writer: impl Write,
) -> Result<(), SimulationError> {
    serde_json::to_writer_pretty(&mut writer, summaries)
        .map_err(|e| SimulationError::WriteError(format!("{}", e)))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
