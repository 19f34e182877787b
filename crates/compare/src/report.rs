//! Comparison summary on disk (JSON) and on the terminal (text table).

use std::io::Write;
use std::path::Path;

use depthcmp_core::stats::ComparisonRecord;

use crate::error::CompareError;

const RULE_WIDTH: usize = 80;

/// Write `record` pretty-printed to `path`.
pub fn write_summary_json(record: &ComparisonRecord, path: &Path) -> Result<(), CompareError> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json).map_err(CompareError::io(path))
}

/// Print every metric that has a comparison entry, in report order.
pub fn print_summary<W: Write>(
    out: &mut W,
    record: &ComparisonRecord,
    summary_path: &Path,
) -> std::io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "TRAINING COMPARISON SUMMARY")?;
    writeln!(out, "{rule}")?;

    for (tag, comparison) in record.compared() {
        writeln!(out)?;
        writeln!(out, "{tag}:")?;
        writeln!(
            out,
            "  Final improvement: {:.4}",
            comparison.absolute_improvement
        )?;
        writeln!(
            out,
            "  Relative improvement: {:.2}%",
            comparison.relative_improvement_percent
        )?;
        writeln!(
            out,
            "  Strong supervision better: {}",
            comparison.strong_better
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Detailed statistics saved to: {}", summary_path.display())
}
