use serde::{Deserialize, Serialize};

/// One brand's binary labels after mention labeling and page lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    pub brand: String,
    pub category: String,
    pub mentioned: bool,
    pub has_reference_page: bool,
}

/// 2x2 cross-tabulation of (has_reference_page, mentioned).
///
/// `cells[r][c]` holds the count for has_reference_page = r, mentioned = c,
/// with 0 = false and 1 = true on both axes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContingencyTable {
    pub cells: [[u64; 2]; 2],
}

impl ContingencyTable {
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    pub fn row_totals(&self) -> [u64; 2] {
        [
            self.cells[0][0] + self.cells[0][1],
            self.cells[1][0] + self.cells[1][1],
        ]
    }

    pub fn col_totals(&self) -> [u64; 2] {
        [
            self.cells[0][0] + self.cells[1][0],
            self.cells[0][1] + self.cells[1][1],
        ]
    }

    /// A zero row or column (or an empty table) collapses the test.
    pub fn is_degenerate(&self) -> bool {
        self.row_totals().contains(&0) || self.col_totals().contains(&0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CorrelationResult {
    pub chi_square: f64,
    pub p_value: f64,
    pub degrees_of_freedom: u32,
    pub phi_coefficient: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandSummaryRow {
    pub category: String,
    pub brand: String,
    pub prompts: usize,
    pub responses_nonempty: usize,
    pub mentions: usize,
    pub mention_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummaryRow {
    pub category: String,
    pub prompts: usize,
    pub responses_nonempty: usize,
    pub mentions: usize,
    pub mention_rate: f64,
}

/// Mention rate split by the reference-page flag.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MentionRateByFlag {
    pub without_page: f64,
    pub with_page: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub report_version: u32,
    pub generated_at: String,
    pub dataset_path: String,
    pub observation_count: usize,
    pub observations: Vec<Observation>,
    pub brand_summary: Vec<BrandSummaryRow>,
    pub category_summary: Vec<CategorySummaryRow>,
    pub contingency_table: ContingencyTable,
    pub correlation: CorrelationResult,
    pub mention_rate_by_flag: MentionRateByFlag,
}
