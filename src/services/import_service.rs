// src/services/import_service.rs

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::{
        auth::User,
        catalog::{DataImport, ImportType},
    },
};

/// Supplier price spreadsheets arrive as CSV exports. Appliance matrices put
/// the brand somewhere in the first few banner rows, the column header at row
/// 5 and data from row 6, with each data row carrying a category name and
/// three price-tier triplets of (model codes, series, price).
const MATRIX_HEADER_ROW: usize = 4;
const MATRIX_BRAND_SCAN_ROWS: usize = 4;
const KBB_HEADER_ROW: usize = 2;

const KNOWN_BRANDS: &[&str] = &[
    "Bosch",
    "Neff",
    "Siemens",
    "AEG",
    "Smeg",
    "Miele",
    "Hotpoint",
    "Zanussi",
    "Indesit",
    "Beko",
    "Hoover",
    "Candy",
    "CDA",
    "Rangemaster",
    "Caple",
    "Franke",
    "Elica",
    "Liebherr",
];

/// Runs catalogue imports as detached background jobs. The upload handler
/// gets a `processing` record back immediately; clients poll its status while
/// the worker commits row by row.
#[derive(Clone)]
pub struct ImportService {
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

impl ImportService {
    pub fn new(catalog_repo: CatalogRepository, pool: PgPool) -> Self {
        Self { catalog_repo, pool }
    }

    pub async fn start_import(
        &self,
        filename: &str,
        import_type: ImportType,
        bytes: Vec<u8>,
        actor: &User,
    ) -> Result<DataImport, AppError> {
        if bytes.is_empty() {
            return Err(AppError::InvalidInput("Uploaded file is empty.".to_string()));
        }

        let import = self
            .catalog_repo
            .insert_import(filename, import_type, actor.id)
            .await?;

        let worker = self.clone();
        let import_id = import.id;
        tokio::spawn(async move {
            // run() stamps the terminal status itself; an error here means
            // even that bookkeeping failed.
            if let Err(error) = worker.run(import_id, import_type, &bytes).await {
                tracing::error!(import_id = %import_id, %error, "import bookkeeping failed");
            }
        });

        tracing::info!(import_id = %import.id, filename, "📦 import started");
        Ok(import)
    }

    pub async fn get_status(&self, id: Uuid) -> Result<DataImport, AppError> {
        self.catalog_repo
            .find_import(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Import".to_string()))
    }

    async fn run(
        &self,
        import_id: Uuid,
        import_type: ImportType,
        bytes: &[u8],
    ) -> Result<(), AppError> {
        let outcome = match import_type {
            ImportType::ApplianceMatrix => self.run_appliance_matrix(import_id, bytes).await,
            ImportType::KbbPricelist => self.run_kbb_pricelist(import_id, bytes).await,
        };

        match outcome {
            Ok(()) => self.catalog_repo.mark_completed(import_id).await,
            Err(error) => {
                tracing::error!(import_id = %import_id, %error, "import failed");
                self.catalog_repo
                    .mark_failed(import_id, &error.to_string())
                    .await
            }
        }
    }

    /// One pass over an appliance price matrix. Row failures roll back that
    /// row's transaction, get recorded on the import and never stop the pass.
    async fn run_appliance_matrix(&self, import_id: Uuid, bytes: &[u8]) -> Result<(), AppError> {
        let records = read_csv(bytes)
            .map_err(|e| AppError::InvalidInput(format!("Unreadable spreadsheet: {}", e)))?;

        if records.len() <= MATRIX_HEADER_ROW + 1 {
            return Err(AppError::InvalidInput(
                "Spreadsheet has no data rows below the header.".to_string(),
            ));
        }

        let brand_name = detect_brand(&records[..MATRIX_BRAND_SCAN_ROWS]);
        let brand = self.catalog_repo.upsert_brand(&self.pool, &brand_name).await?;

        for (index, record) in records.iter().enumerate().skip(MATRIX_HEADER_ROW + 1) {
            // 1-based row numbers, as a person sees them in the file
            let row_number = index + 1;

            let row = match parse_matrix_row(record) {
                Ok(Some(row)) => row,
                Ok(None) => continue,
                Err(message) => {
                    self.catalog_repo
                        .record_row_failure(import_id, row_number, &message)
                        .await?;
                    continue;
                }
            };

            if let Err(error) = self.import_matrix_row(import_id, brand.id, &row).await {
                self.catalog_repo
                    .record_row_failure(import_id, row_number, &error.to_string())
                    .await?;
            }
        }

        Ok(())
    }

    async fn import_matrix_row(
        &self,
        import_id: Uuid,
        brand_id: Uuid,
        row: &MatrixRow,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let category = self
            .catalog_repo
            .upsert_category(&mut *tx, &row.category)
            .await?;

        for (tier_index, tier) in row.tiers.iter().enumerate() {
            for code in &tier.codes {
                let name = product_name(tier.series.as_deref(), code);
                let (low, mid, high) = match tier_index {
                    0 => (tier.price, None, None),
                    1 => (None, tier.price, None),
                    _ => (None, None, tier.price),
                };

                self.catalog_repo
                    .upsert_product(
                        &mut *tx,
                        brand_id,
                        category.id,
                        code,
                        &name,
                        tier.series.as_deref(),
                        low,
                        mid,
                        high,
                    )
                    .await?;
            }
        }

        self.catalog_repo.bump_processed(&mut *tx, import_id, 1).await?;
        tx.commit().await?;
        Ok(())
    }

    /// KBB price lists are validated and counted but not yet turned into
    /// catalogue rows; the supplier's column mapping is not finalised.
    async fn run_kbb_pricelist(&self, import_id: Uuid, bytes: &[u8]) -> Result<(), AppError> {
        let records = read_csv(bytes)
            .map_err(|e| AppError::InvalidInput(format!("Unreadable spreadsheet: {}", e)))?;

        if records.len() <= KBB_HEADER_ROW + 1 {
            return Err(AppError::InvalidInput(
                "Spreadsheet has no data rows below the header.".to_string(),
            ));
        }

        let code_column = find_code_column(&records[KBB_HEADER_ROW]).ok_or_else(|| {
            AppError::InvalidInput("No 'code' column in the header row.".to_string())
        })?;

        let mut processed = 0i32;
        for record in records.iter().skip(KBB_HEADER_ROW + 1) {
            let code = record.get(code_column).unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }
            processed += 1;
        }

        if processed > 0 {
            self.catalog_repo
                .bump_processed(&self.pool, import_id, processed)
                .await?;
        }

        Ok(())
    }
}

// =============================================================================
//  LAYOUT PARSING
// =============================================================================

#[derive(Debug, PartialEq)]
struct TierEntry {
    codes: Vec<String>,
    series: Option<String>,
    price: Option<Decimal>,
}

#[derive(Debug, PartialEq)]
struct MatrixRow {
    category: String,
    // low, mid, high
    tiers: [TierEntry; 3],
}

fn read_csv(bytes: &[u8]) -> Result<Vec<csv::StringRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    reader.records().collect()
}

/// Scans the banner rows above the header for a known brand name. Matrices
/// from suppliers we have not mapped yet land under "Unknown".
fn detect_brand(records: &[csv::StringRecord]) -> String {
    for record in records {
        for cell in record.iter() {
            let cell = cell.to_lowercase();
            for brand in KNOWN_BRANDS {
                if cell.contains(&brand.to_lowercase()) {
                    return (*brand).to_string();
                }
            }
        }
    }
    "Unknown".to_string()
}

/// Parses one data row. `Ok(None)` is a spacer row (empty category cell);
/// `Err` carries a message describing the cell that failed.
fn parse_matrix_row(record: &csv::StringRecord) -> Result<Option<MatrixRow>, String> {
    let category = record.get(0).unwrap_or("").trim();
    if category.is_empty() {
        return Ok(None);
    }

    let parse_tier = |tier: usize| -> Result<TierEntry, String> {
        let codes_cell = record.get(1 + tier * 3).unwrap_or("").trim();
        let series_cell = record.get(2 + tier * 3).unwrap_or("").trim();
        let price_cell = record.get(3 + tier * 3).unwrap_or("").trim();

        // Several model codes can share one price cell, written "A/B/C"
        let codes: Vec<String> = codes_cell
            .split('/')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect();

        let series = (!series_cell.is_empty()).then(|| series_cell.to_string());

        let price = if price_cell.is_empty() {
            None
        } else {
            Some(
                parse_price(price_cell)
                    .map_err(|e| format!("column {}: {}", 4 + tier * 3, e))?,
            )
        };

        Ok(TierEntry {
            codes,
            series,
            price,
        })
    };

    let tiers = [parse_tier(0)?, parse_tier(1)?, parse_tier(2)?];

    Ok(Some(MatrixRow {
        category: category.to_string(),
        tiers,
    }))
}

/// Accepts "£1,249.00", "1249" and friends.
fn parse_price(raw: &str) -> Result<Decimal, String> {
    let cleaned = raw.trim().trim_start_matches('£').replace(',', "");
    Decimal::from_str(cleaned.trim()).map_err(|_| format!("invalid price '{}'", raw.trim()))
}

fn product_name(series: Option<&str>, code: &str) -> String {
    match series {
        Some(series) => format!("{} {}", series, code),
        None => code.to_string(),
    }
}

fn find_code_column(header: &csv::StringRecord) -> Option<usize> {
    header
        .iter()
        .position(|cell| cell.trim().eq_ignore_ascii_case("code"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cells: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(cells.to_vec())
    }

    #[test]
    fn detects_brand_from_banner_rows() {
        let records = vec![
            record(&["", "", ""]),
            record(&["NEFF APPLIANCE PRICE MATRIX 2026", "", ""]),
        ];
        assert_eq!(detect_brand(&records), "Neff");
    }

    #[test]
    fn unrecognised_banner_falls_back_to_unknown() {
        let records = vec![record(&["Acme Kitchens Ltd", "internal use only"])];
        assert_eq!(detect_brand(&records), "Unknown");
    }

    #[test]
    fn parses_prices_with_currency_noise() {
        assert_eq!(parse_price("£1,249.00").unwrap(), Decimal::new(124900, 2));
        assert_eq!(parse_price("845").unwrap(), Decimal::new(845, 0));
        assert_eq!(parse_price(" £ 2,100 ").unwrap(), Decimal::new(2100, 0));
        assert!(parse_price("POA").is_err());
    }

    #[test]
    fn parses_full_matrix_row_with_shared_price_codes() {
        let row = parse_matrix_row(&record(&[
            "Single Oven",
            "B1ACE4HN0B/B1ACE4HW0B",
            "N30",
            "£399",
            "B3ACE4HN0B",
            "N50",
            "£549.00",
            "B5ACM7HH0B",
            "N70",
            "£1,049",
        ]))
        .unwrap()
        .expect("not a spacer row");

        assert_eq!(row.category, "Single Oven");
        assert_eq!(row.tiers[0].codes, vec!["B1ACE4HN0B", "B1ACE4HW0B"]);
        assert_eq!(row.tiers[0].series.as_deref(), Some("N30"));
        assert_eq!(row.tiers[0].price, Some(Decimal::new(399, 0)));
        assert_eq!(row.tiers[2].price, Some(Decimal::new(1049, 0)));
    }

    #[test]
    fn empty_category_cell_is_a_spacer() {
        let row = parse_matrix_row(&record(&["", "B1ACE4HN0B", "N30", "£399"])).unwrap();
        assert_eq!(row, None);
    }

    #[test]
    fn short_rows_parse_as_partial_tiers() {
        let row = parse_matrix_row(&record(&["Hob", "T26DS49S0", "N50", "£429"]))
            .unwrap()
            .expect("not a spacer row");
        assert_eq!(row.tiers[0].codes, vec!["T26DS49S0"]);
        assert!(row.tiers[1].codes.is_empty());
        assert_eq!(row.tiers[1].price, None);
    }

    #[test]
    fn bad_price_fails_the_row_and_names_the_column() {
        let err = parse_matrix_row(&record(&[
            "Dishwasher",
            "SMV2ITX18G",
            "Serie 2",
            "four hundred",
        ]))
        .unwrap_err();
        assert!(err.contains("column 4"));
        assert!(err.contains("four hundred"));
    }

    #[test]
    fn finds_code_column_case_insensitively() {
        assert_eq!(
            find_code_column(&record(&["Range", "Description", " CODE ", "RRP"])),
            Some(2)
        );
        assert_eq!(find_code_column(&record(&["Range", "Description", "RRP"])), None);
    }

    #[test]
    fn product_name_prefers_series_prefix() {
        assert_eq!(product_name(Some("N50"), "B3ACE4HN0B"), "N50 B3ACE4HN0B");
        assert_eq!(product_name(None, "B3ACE4HN0B"), "B3ACE4HN0B");
    }
}
