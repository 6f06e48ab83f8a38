use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::commands::summarize;
use crate::dataset::{self, DatasetRow};
use crate::lookup::{FilePageIndex, PageIndex, page_flag_or_false};
use crate::model::{
    AnalysisReport, ContingencyTable, CorrelationResult, MentionRateByFlag, Observation,
};
use crate::stats;
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let delimiter = u8::try_from(args.delimiter)
        .context("delimiter must be a single ASCII character")?;

    let mut rows = dataset::load_rows(&args.dataset, delimiter)?;
    let seeded = dataset::seed_demo_responses(&mut rows);
    info!(
        dataset = %args.dataset.display(),
        rows = rows.len(),
        seeded_responses = seeded,
        sample_prompt = %rows.first().map(|row| row.prompt()).unwrap_or_default(),
        "dataset loaded"
    );

    let index = args
        .page_index
        .as_deref()
        .map(FilePageIndex::load)
        .transpose()?;

    let observations = build_observations(&rows, index.as_ref().map(|i| i as &dyn PageIndex))?;

    let table = stats::tabulate(&observations);
    let correlation = stats::correlate(&table);
    let mention_rates = mention_rate_by_flag(&observations);

    info!(
        observations = observations.len(),
        chi_square = correlation.chi_square,
        p_value = correlation.p_value,
        "correlation computed"
    );

    let report = AnalysisReport {
        report_version: 1,
        generated_at: now_utc_string(),
        dataset_path: args.dataset.display().to_string(),
        observation_count: observations.len(),
        observations,
        brand_summary: summarize::build_brand_summary(&rows),
        category_summary: summarize::build_category_summary(&rows),
        contingency_table: table,
        correlation,
        mention_rate_by_flag: mention_rates,
    };

    if args.json {
        let mut output = io::BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut output, &report)
            .context("failed to serialize analysis report")?;
        writeln!(output)?;
        output.flush()?;
    } else {
        let mut output = io::BufWriter::new(io::stdout().lock());
        summarize::write_summaries(&mut output, &report.brand_summary, &report.category_summary)?;
        write_correlation(&mut output, &table, &correlation, &mention_rates)?;
        output.flush()?;
    }

    if let Some(report_path) = &args.report_path {
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote analysis report");
    }

    Ok(())
}

/// Builds one Observation per dataset row. A literal `HasPage` label wins
/// over the page index; without either the flag defaults to absent.
fn build_observations(
    rows: &[DatasetRow],
    index: Option<&dyn PageIndex>,
) -> Result<Vec<Observation>> {
    if rows.is_empty() {
        bail!("cannot analyze an empty dataset");
    }

    if index.is_none() && rows.iter().any(|row| row.has_page.is_none()) {
        warn!("no page index configured; unlabeled brands treated as having no page");
    }

    let observations = rows
        .iter()
        .map(|row| {
            let has_reference_page = match (row.has_page, index) {
                (Some(flag), _) => flag,
                (None, Some(index)) => page_flag_or_false(index, &row.brand),
                (None, None) => false,
            };

            Observation {
                brand: row.brand.clone(),
                category: row.category.clone(),
                mentioned: row.effective_mention(),
                has_reference_page,
            }
        })
        .collect();

    Ok(observations)
}

fn mention_rate_by_flag(observations: &[Observation]) -> MentionRateByFlag {
    let rate = |flag: bool| {
        let group: Vec<_> = observations
            .iter()
            .filter(|obs| obs.has_reference_page == flag)
            .collect();
        if group.is_empty() {
            return 0.0;
        }
        group.iter().filter(|obs| obs.mentioned).count() as f64 / group.len() as f64
    };

    MentionRateByFlag {
        without_page: rate(false),
        with_page: rate(true),
    }
}

fn write_correlation(
    output: &mut impl Write,
    table: &ContingencyTable,
    correlation: &CorrelationResult,
    mention_rates: &MentionRateByFlag,
) -> Result<()> {
    writeln!(output, "\n--- Contingency Table (HasPage x Mentioned) ---")?;
    writeln!(
        output,
        "{:<12} {:>12} {:>12}",
        "", "mentioned=0", "mentioned=1"
    )?;
    for (flag, row) in table.cells.iter().enumerate() {
        writeln!(
            output,
            "{:<12} {:>12} {:>12}",
            format!("has_page={flag}"),
            row[0],
            row[1]
        )?;
    }

    writeln!(
        output,
        "\nChi-square: {:.4} | p-value: {:.4} | dof: {}",
        correlation.chi_square, correlation.p_value, correlation.degrees_of_freedom
    )?;
    writeln!(
        output,
        "Phi coefficient (effect size): {:.4}",
        correlation.phi_coefficient
    )?;

    writeln!(output, "\nMention rate by HasPage:")?;
    writeln!(output, "  has_page=0: {:.4}", mention_rates.without_page)?;
    writeln!(output, "  has_page=1: {:.4}", mention_rates.with_page)?;

    writeln!(output, "\nInterpretation:")?;
    if correlation.p_value < 0.05 {
        writeln!(
            output,
            "- Statistically significant association between having a reference page and being mentioned."
        )?;
    } else {
        writeln!(
            output,
            "- No statistically significant association detected at the 0.05 level."
        )?;
    }
    writeln!(
        output,
        "- Rule of thumb for phi: ~0.1 small, ~0.3 medium, ~0.5 large."
    )?;

    Ok(())
}
