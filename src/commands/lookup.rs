use std::collections::BTreeSet;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::LookupArgs;
use crate::dataset;
use crate::lookup::{FilePageIndex, PageIndex};

/// Resolves the reference-page flag for each unique brand in the dataset and
/// prints one line per brand.
pub fn run(args: LookupArgs) -> Result<()> {
    let delimiter = u8::try_from(args.delimiter)
        .context("delimiter must be a single ASCII character")?;

    let rows = dataset::load_rows(&args.dataset, delimiter)?;
    let index = FilePageIndex::load(&args.page_index)?;

    let brands: BTreeSet<&str> = rows.iter().map(|row| row.brand.as_str()).collect();
    info!(brands = brands.len(), "resolving page flags");

    let mut output = io::BufWriter::new(io::stdout().lock());
    let mut found = 0_usize;

    for brand in &brands {
        let title = index.resolve_title(brand)?;
        let flag = u8::from(title.is_some());
        if title.is_some() {
            found += 1;
        }

        writeln!(
            output,
            "{brand:<12} -> has_page={flag}  ({})",
            title.as_deref().unwrap_or("none")
        )?;
    }

    writeln!(output, "\n{found} of {} brands have a page", brands.len())?;
    output.flush()?;

    Ok(())
}
