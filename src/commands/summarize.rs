use std::collections::BTreeMap;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::SummarizeArgs;
use crate::dataset::{self, DatasetRow};
use crate::model::{BrandSummaryRow, CategorySummaryRow};

pub fn run(args: SummarizeArgs) -> Result<()> {
    let delimiter = u8::try_from(args.delimiter)
        .context("delimiter must be a single ASCII character")?;

    let mut rows = dataset::load_rows(&args.dataset, delimiter)?;
    let seeded = dataset::seed_demo_responses(&mut rows);
    info!(
        dataset = %args.dataset.display(),
        rows = rows.len(),
        seeded_responses = seeded,
        "dataset loaded"
    );

    let brand_summary = build_brand_summary(&rows);
    let category_summary = build_category_summary(&rows);

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_summaries(&mut output, &brand_summary, &category_summary)?;
    output.flush()?;

    Ok(())
}

pub fn build_brand_summary(rows: &[DatasetRow]) -> Vec<BrandSummaryRow> {
    let mut groups: BTreeMap<(String, String), (usize, usize, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry((row.category.clone(), row.brand.clone()))
            .or_default();
        entry.0 += 1;
        if !row.response_empty() {
            entry.1 += 1;
        }
        if row.effective_mention() {
            entry.2 += 1;
        }
    }

    let mut summary: Vec<BrandSummaryRow> = groups
        .into_iter()
        .map(
            |((category, brand), (prompts, responses_nonempty, mentions))| BrandSummaryRow {
                category,
                brand,
                prompts,
                responses_nonempty,
                mentions,
                mention_rate: mention_rate(mentions, responses_nonempty),
            },
        )
        .collect();

    // Category ascending, mention rate descending within a category.
    summary.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(b.mention_rate.total_cmp(&a.mention_rate))
            .then(a.brand.cmp(&b.brand))
    });
    summary
}

pub fn build_category_summary(rows: &[DatasetRow]) -> Vec<CategorySummaryRow> {
    let mut groups: BTreeMap<String, (usize, usize, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(row.category.clone()).or_default();
        entry.0 += 1;
        if !row.response_empty() {
            entry.1 += 1;
        }
        if row.effective_mention() {
            entry.2 += 1;
        }
    }

    let mut summary: Vec<CategorySummaryRow> = groups
        .into_iter()
        .map(
            |(category, (prompts, responses_nonempty, mentions))| CategorySummaryRow {
                category,
                prompts,
                responses_nonempty,
                mentions,
                mention_rate: mention_rate(mentions, responses_nonempty),
            },
        )
        .collect();

    summary.sort_by(|a, b| {
        b.mention_rate
            .total_cmp(&a.mention_rate)
            .then(a.category.cmp(&b.category))
    });
    summary
}

pub fn write_summaries(
    output: &mut impl Write,
    brand_summary: &[BrandSummaryRow],
    category_summary: &[CategorySummaryRow],
) -> Result<()> {
    writeln!(
        output,
        "{:<12} {:<12} {:>7} {:>9} {:>8} {:>12}",
        "category", "brand", "prompts", "responses", "mentions", "mention_rate"
    )?;
    for row in brand_summary {
        writeln!(
            output,
            "{:<12} {:<12} {:>7} {:>9} {:>8} {:>12.4}",
            row.category, row.brand, row.prompts, row.responses_nonempty, row.mentions,
            row.mention_rate
        )?;
    }

    writeln!(output, "\nCategory summary:")?;
    for row in category_summary {
        writeln!(
            output,
            "{:<12} prompts={} responses={} mentions={} mention_rate={:.4}",
            row.category, row.prompts, row.responses_nonempty, row.mentions, row.mention_rate
        )?;
    }

    Ok(())
}

fn mention_rate(mentions: usize, responses_nonempty: usize) -> f64 {
    if responses_nonempty == 0 {
        return 0.0;
    }
    mentions as f64 / responses_nonempty as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(brand: &str, category: &str, response: &str) -> DatasetRow {
        DatasetRow {
            brand: brand.to_string(),
            category: category.to_string(),
            response: response.to_string(),
            mentioned: None,
            has_page: None,
        }
    }

    #[test]
    fn brand_summary_counts_and_rates() {
        let rows = vec![
            row("Apple", "laptop", "Apple is a popular choice."),
            row("Apple", "laptop", ""),
            row("Dell", "laptop", "Many prefer other vendors."),
        ];

        let summary = build_brand_summary(&rows);
        assert_eq!(summary.len(), 2);

        let apple = summary.iter().find(|s| s.brand == "Apple").unwrap();
        assert_eq!(apple.prompts, 2);
        assert_eq!(apple.responses_nonempty, 1);
        assert_eq!(apple.mentions, 1);
        assert!((apple.mention_rate - 1.0).abs() < 1e-9);

        let dell = summary.iter().find(|s| s.brand == "Dell").unwrap();
        assert_eq!(dell.mentions, 0);
        assert_eq!(dell.mention_rate, 0.0);
    }

    #[test]
    fn brand_summary_sorts_by_rate_within_category() {
        let rows = vec![
            row("Dell", "laptop", "Nothing relevant."),
            row("Apple", "laptop", "Apple leads here."),
        ];

        let summary = build_brand_summary(&rows);
        assert_eq!(summary[0].brand, "Apple");
        assert_eq!(summary[1].brand, "Dell");
    }

    #[test]
    fn category_summary_orders_by_rate() {
        let rows = vec![
            row("Apple", "laptop", "Apple again."),
            row("Jabra", "headset", "No names given."),
        ];

        let summary = build_category_summary(&rows);
        assert_eq!(summary[0].category, "laptop");
        assert_eq!(summary[1].category, "headset");
        assert_eq!(summary[1].mention_rate, 0.0);
    }

    #[test]
    fn zero_responses_give_zero_rate() {
        let rows = vec![row("Apple", "laptop", "")];
        let summary = build_category_summary(&rows);
        assert_eq!(summary[0].responses_nonempty, 0);
        assert_eq!(summary[0].mention_rate, 0.0);
    }
}
