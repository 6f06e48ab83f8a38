use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::model::{ContingencyTable, CorrelationResult, Observation};

/// Cross-tabulates observations into the 2x2 (has_reference_page, mentioned)
/// grid. The four cells always sum to `observations.len()`.
pub fn tabulate(observations: &[Observation]) -> ContingencyTable {
    let mut table = ContingencyTable::default();

    for obs in observations {
        table.cells[obs.has_reference_page as usize][obs.mentioned as usize] += 1;
    }

    table
}

/// Pearson chi-square test of independence on a 2x2 table, with a signed phi
/// effect size.
///
/// A degenerate table (zero row or column) collapses to chi_square = 0,
/// p_value = 1, dof = 0, phi = 0: no evidence of association. Phi is
/// `sqrt(chi_square / n)` signed positive when the main diagonal dominates
/// the off-diagonal, negative when it is dominated.
pub fn correlate(table: &ContingencyTable) -> CorrelationResult {
    if table.is_degenerate() {
        return CorrelationResult {
            chi_square: 0.0,
            p_value: 1.0,
            degrees_of_freedom: 0,
            phi_coefficient: 0.0,
        };
    }

    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    let total = table.total() as f64;

    let mut chi_square = 0.0;
    for r in 0..2 {
        for c in 0..2 {
            let expected = row_totals[r] as f64 * col_totals[c] as f64 / total;
            let diff = table.cells[r][c] as f64 - expected;
            chi_square += diff * diff / expected;
        }
    }

    let p_value = chi_square_survival(chi_square, 1.0);

    let magnitude = (chi_square / total).sqrt().min(1.0);
    let cross = table.cells[1][1] as i128 * table.cells[0][0] as i128
        - table.cells[1][0] as i128 * table.cells[0][1] as i128;
    let phi_coefficient = match cross.signum() {
        1 => magnitude,
        -1 => -magnitude,
        _ => 0.0,
    };

    CorrelationResult {
        chi_square,
        p_value,
        degrees_of_freedom: 1,
        phi_coefficient,
    }
}

fn chi_square_survival(stat: f64, df: f64) -> f64 {
    match ChiSquared::new(df) {
        Ok(dist) => (1.0 - dist.cdf(stat)).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}
