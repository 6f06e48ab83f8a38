use std::path::Path;

use anyhow::{Context, Result, bail};

/// One raw dataset row before labeling. `mentioned` and `has_page` are only
/// present when the file supplies them literally.
#[derive(Debug, Clone)]
pub struct DatasetRow {
    pub brand: String,
    pub category: String,
    pub response: String,
    pub mentioned: Option<bool>,
    pub has_page: Option<bool>,
}

impl DatasetRow {
    /// Simple yes/no prompt: `Is {Brand} a good {Category} brand?`
    pub fn prompt(&self) -> String {
        format!("Is {} a good {} brand?", self.brand, self.category)
    }

    pub fn response_empty(&self) -> bool {
        self.response.trim().is_empty()
    }

    /// A literal `Mentioned` label wins; otherwise the response is labeled.
    pub fn effective_mention(&self) -> bool {
        self.mentioned.unwrap_or_else(|| self.labeled_mention())
    }

    /// Mentioned iff the brand name appears in the response,
    /// case-insensitively. An empty response forces false.
    pub fn labeled_mention(&self) -> bool {
        if self.response_empty() {
            return false;
        }
        self.response
            .to_lowercase()
            .contains(&self.brand.to_lowercase())
    }
}

/// Loads a delimited brand dataset. `Brand` and `Category` columns are
/// required; `Response`, `Mentioned` and `HasPage` are optional. Header
/// matching is case-insensitive.
pub fn load_rows(path: &Path, delimiter: u8) -> Result<Vec<DatasetRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open dataset: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read dataset header: {}", path.display()))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    };

    let brand_idx = column("brand")
        .with_context(|| format!("dataset missing Brand column: {}", path.display()))?;
    let category_idx = column("category")
        .with_context(|| format!("dataset missing Category column: {}", path.display()))?;
    let response_idx = column("response");
    let mentioned_idx = column("mentioned");
    let has_page_idx = column("haspage").or_else(|| column("has_page"));

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("failed to read dataset record {}", line + 2))?;

        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();

        let brand = field(brand_idx);
        if brand.is_empty() {
            bail!("empty brand in dataset record {}", line + 2);
        }

        let mentioned = mentioned_idx
            .map(|idx| parse_binary(record.get(idx).unwrap_or(""), "Mentioned", line + 2))
            .transpose()?
            .flatten();
        let has_page = has_page_idx
            .map(|idx| parse_binary(record.get(idx).unwrap_or(""), "HasPage", line + 2))
            .transpose()?
            .flatten();

        rows.push(DatasetRow {
            brand,
            category: field(category_idx),
            response: response_idx.map(field).unwrap_or_default(),
            mentioned,
            has_page,
        });
    }

    if rows.is_empty() {
        bail!("dataset has no rows: {}", path.display());
    }

    Ok(rows)
}

/// Stubs a few sample responses when the dataset carries none, so the
/// pipeline has something to label.
pub fn seed_demo_responses(rows: &mut [DatasetRow]) -> usize {
    if rows.iter().any(|row| !row.response_empty()) {
        return 0;
    }

    let seed = [
        "Yes, Apple is one of the most popular laptop brands.",
        "Yes, Dell laptops are known for reliability.",
        "HP is a solid laptop brand with many models.",
    ];

    let mut seeded = 0;
    for (row, text) in rows.iter_mut().zip(seed) {
        row.response = text.to_string();
        seeded += 1;
    }
    seeded
}

/// Parses a 0/1 (or true/false) cell. An empty cell means the label is
/// absent; anything else non-binary is invalid input.
fn parse_binary(cell: &str, column: &str, line: usize) -> Result<Option<bool>> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed {
        "0" => Ok(Some(false)),
        "1" => Ok(Some(true)),
        other if other.eq_ignore_ascii_case("true") => Ok(Some(true)),
        other if other.eq_ignore_ascii_case("false") => Ok(Some(false)),
        other => bail!("non-binary {column} label {other:?} in dataset record {line}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_dataset(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_semicolon_delimited_rows() {
        let file = write_dataset("Brand;Category\nApple;laptop\nDell;laptop\n");
        let rows = load_rows(file.path(), b';').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].brand, "Apple");
        assert_eq!(rows[0].category, "laptop");
        assert!(rows[0].response_empty());
        assert_eq!(rows[0].mentioned, None);
    }

    #[test]
    fn literal_labels_are_parsed() {
        let file = write_dataset(
            "Brand;Category;Mentioned;HasPage\nApple;laptop;1;1\nZorin;laptop;0;0\n",
        );
        let rows = load_rows(file.path(), b';').unwrap();

        assert_eq!(rows[0].mentioned, Some(true));
        assert_eq!(rows[0].has_page, Some(true));
        assert_eq!(rows[1].mentioned, Some(false));
        assert_eq!(rows[1].has_page, Some(false));
    }

    #[test]
    fn non_binary_label_is_rejected() {
        let file = write_dataset("Brand;Category;Mentioned\nApple;laptop;maybe\n");
        let err = load_rows(file.path(), b';').unwrap_err();
        assert!(err.to_string().contains("non-binary Mentioned label"));
    }

    #[test]
    fn missing_brand_column_is_rejected() {
        let file = write_dataset("Name;Category\nApple;laptop\n");
        let err = load_rows(file.path(), b';').unwrap_err();
        assert!(err.to_string().contains("missing Brand column"));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let file = write_dataset("Brand;Category\n");
        let err = load_rows(file.path(), b';').unwrap_err();
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn prompt_follows_brand_and_category() {
        let row = DatasetRow {
            brand: "Apple".to_string(),
            category: "laptop".to_string(),
            response: String::new(),
            mentioned: None,
            has_page: None,
        };
        assert_eq!(row.prompt(), "Is Apple a good laptop brand?");
    }

    #[test]
    fn mention_labeling_is_case_insensitive_and_empty_forces_false() {
        let mut row = DatasetRow {
            brand: "Apple".to_string(),
            category: "laptop".to_string(),
            response: "APPLE makes popular laptops.".to_string(),
            mentioned: None,
            has_page: None,
        };
        assert!(row.labeled_mention());

        row.response = "A solid pick overall.".to_string();
        assert!(!row.labeled_mention());

        row.response = "   ".to_string();
        assert!(!row.labeled_mention());
    }

    #[test]
    fn demo_responses_seed_only_blank_datasets() {
        let blank = DatasetRow {
            brand: "Apple".to_string(),
            category: "laptop".to_string(),
            response: String::new(),
            mentioned: None,
            has_page: None,
        };

        let mut rows = vec![blank.clone(), blank.clone(), blank.clone(), blank.clone()];
        assert_eq!(seed_demo_responses(&mut rows), 3);
        assert!(!rows[0].response_empty());
        assert!(rows[3].response_empty());

        let mut rows = vec![DatasetRow {
            response: "Already answered.".to_string(),
            ..blank
        }];
        assert_eq!(seed_demo_responses(&mut rows), 0);
    }
}
