//! `prwatch enrich`: offline backfill of an existing PR table.

use std::path::{Path, PathBuf};

use prwatch_core::{load_brand_dictionary, AppConfig};
use prwatch_detect::{confidence_score, Extractor};

use crate::output::{self, OutputRow};

pub(crate) const ENRICHED_FILE_NAME: &str = "pr_videos_enriched.csv";

#[derive(Debug)]
pub(crate) struct EnrichReport {
    pub rows: usize,
    pub products_filled: usize,
    pub sponsors_filled: usize,
    pub path: PathBuf,
}

/// Reads `input`, fills blank product/sponsor cells, recomputes every
/// confidence score, and writes the result.
///
/// # Errors
///
/// Returns an error if the input cannot be read or parsed, the brand
/// dictionary is invalid, or the output cannot be written.
pub(crate) fn run_enrich(
    input: &Path,
    output: Option<&Path>,
    config: &AppConfig,
) -> anyhow::Result<EnrichReport> {
    let rows = output::read_rows(input)?;
    tracing::info!(rows = rows.len(), input = %input.display(), "loaded PR table");

    let dictionary = load_brand_dictionary(&config.brands_path)?;
    let extractor = Extractor::with_heuristics(dictionary);

    let mut products_filled = 0usize;
    let mut sponsors_filled = 0usize;
    let rows: Vec<OutputRow> = rows
        .into_iter()
        .map(|row| {
            let (row, filled) = enrich_row(row, &extractor);
            products_filled += usize::from(filled.product);
            sponsors_filled += usize::from(filled.sponsor);
            row
        })
        .collect();

    let path = output.map_or_else(
        || config.output_dir.join(ENRICHED_FILE_NAME),
        Path::to_path_buf,
    );
    output::write_rows(&path, &rows)?;
    tracing::info!(
        rows = rows.len(),
        products_filled,
        sponsors_filled,
        path = %path.display(),
        "wrote enriched PR table"
    );

    Ok(EnrichReport {
        rows: rows.len(),
        products_filled,
        sponsors_filled,
        path,
    })
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Filled {
    pub product: bool,
    pub sponsor: bool,
}

/// Fills blank cells of one row; other cells keep their trimmed value.
pub(crate) fn enrich_row(mut row: OutputRow, extractor: &Extractor) -> (OutputRow, Filled) {
    let mut filled = Filled::default();
    row.product = row.product.trim().to_owned();
    row.sponsor = row.sponsor.trim().to_owned();

    if row.product.is_empty() || row.sponsor.is_empty() {
        let extraction = extractor.extract(&row.description, &row.title, &row.transcript);
        if row.product.is_empty() && !extraction.product.is_empty() {
            row.product = extraction.product;
            filled.product = true;
        }
        if row.sponsor.is_empty() && !extraction.sponsor.is_empty() {
            row.sponsor = extraction.sponsor;
            filled.sponsor = true;
        }
    }

    row.confidence_score =
        confidence_score(&row.product, &row.title, &row.description, &row.transcript);

    tracing::debug!(
        video_id = %row.video_id,
        product_filled = filled.product,
        sponsor_filled = filled.sponsor,
        confidence_score = row.confidence_score,
        "row enriched"
    );
    (row, filled)
}
