use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::catalog::{Catalog, UrlBuilder};

pub const EMAIL_NOT_PROVIDED: &str = "Not provided";

const NAME_COLUMN: &str = "company name";
const EMAIL_COLUMN: &str = "email address";
const WEBSITE_COLUMN: &str = "website";

#[derive(Debug, Clone)]
pub struct SupplierRecord {
    pub name: String,
    pub homepage: String,
    pub email: String,
    pub locator: UrlBuilder,
}

/// One row of the directory file before it is joined with the catalogue.
#[derive(Debug, Clone, Default)]
pub struct DirectoryRow {
    pub name: String,
    pub email: Option<String>,
    pub website: Option<String>,
}

/// Load the supplier directory (CSV or XLSX) and join it with the catalogue.
///
/// A missing or unreadable file is fatal; nothing else is.
pub fn load(path: &Path, sheet: Option<&str>, catalog: &Catalog) -> Result<Vec<SupplierRecord>> {
    if !path.exists() {
        bail!("Supplier directory not found at {:?}", path);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" => {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to read supplier directory {:?}", path))?;
            parse_csv(&data)?
        }
        "xlsx" | "xlsm" => parse_xlsx(path, sheet)?,
        other => bail!("Unsupported supplier directory format {:?} (expected .csv or .xlsx)", other),
    };

    info!("Loaded {} directory rows from {:?}", rows.len(), path);
    let records = build_records(rows, catalog);
    info!("{} suppliers after catalogue join and dedup", records.len());
    Ok(records)
}

pub fn parse_csv(data: &[u8]) -> Result<Vec<DirectoryRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(normalize_header)
        .collect();
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        match record {
            Ok(record) => {
                let cells: Vec<String> = record.iter().map(str::to_string).collect();
                if let Some(row) = columns.row(&cells) {
                    rows.push(row);
                }
            }
            Err(e) => warn!("Row {}: parse error - {}", idx + 2, e),
        }
    }
    Ok(rows)
}

fn parse_xlsx(path: &Path, sheet: Option<&str>) -> Result<Vec<DirectoryRow>> {
    use calamine::{open_workbook, DataType, Reader, Xlsx};

    let mut workbook: Xlsx<_> =
        open_workbook(path).with_context(|| format!("Failed to open workbook {:?}", path))?;

    let sheet_name = match sheet {
        Some(s) => s.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context("No sheets found in workbook")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Sheet {:?} not found", sheet_name))?
        .context("Failed to read worksheet")?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .context("Empty worksheet")?
        .iter()
        .map(|cell: &DataType| normalize_header(&cell.to_string()))
        .collect();
    let columns = Columns::locate(&headers)?;

    Ok(rows_iter
        .filter_map(|row| {
            let cells: Vec<String> = row.iter().map(|c: &DataType| c.to_string()).collect();
            columns.row(&cells)
        })
        .collect())
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase()
}

struct Columns {
    name: usize,
    email: Option<usize>,
    website: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let Some(name) = find(NAME_COLUMN) else {
            bail!("Supplier directory has no {:?} column (found {:?})", NAME_COLUMN, headers);
        };
        Ok(Columns {
            name,
            email: find(EMAIL_COLUMN),
            website: find(WEBSITE_COLUMN),
        })
    }

    fn row(&self, cells: &[String]) -> Option<DirectoryRow> {
        let get = |i: Option<usize>| {
            i.and_then(|i| cells.get(i))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(DirectoryRow {
            name: get(Some(self.name))?,
            email: get(self.email),
            website: get(self.website),
        })
    }
}

/// Join rows with the catalogue, drop rows with no known site, then collapse
/// duplicate names (first remaining row wins) and fill missing emails.
pub fn build_records(rows: Vec<DirectoryRow>, catalog: &Catalog) -> Vec<SupplierRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in rows {
        let (homepage, locator) = match (catalog.lookup(&row.name), &row.website) {
            (Some(entry), _) => (entry.homepage.clone(), entry.url.clone()),
            (None, Some(site)) => (normalize_site(site), UrlBuilder::SiteSearch),
            (None, None) => {
                warn!("No catalogue entry or website for {:?}, skipping", row.name);
                continue;
            }
        };

        // Only rows that can be looked up claim the name.
        if !seen.insert(row.name.clone()) {
            continue;
        }

        records.push(SupplierRecord {
            name: row.name,
            homepage,
            email: row.email.unwrap_or_else(|| EMAIL_NOT_PROVIDED.to_string()),
            locator,
        });
    }

    records
}

fn normalize_site(site: &str) -> String {
    if site.starts_with("http://") || site.starts_with("https://") {
        site.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", site.trim_end_matches('/'))
    }
}

/// Catalogue vendors with no directory row, for the `catalog` listing.
pub fn uncovered<'a>(records: &[SupplierRecord], catalog: &'a Catalog) -> Vec<&'a str> {
    let covered: HashSet<&str> = records.iter().map(|r| r.homepage.as_str()).collect();
    catalog
        .entries()
        .iter()
        .filter(|e| !covered.contains(e.homepage.as_str()))
        .map(|e| e.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_records() -> Vec<SupplierRecord> {
        load(Path::new("tests/fixtures/suppliers.csv"), None, &Catalog::default()).unwrap()
    }

    #[test]
    fn duplicate_company_collapses_to_first() {
        let records = fixture_records();
        let abcam: Vec<_> = records.iter().filter(|r| r.name == "Abcam Inc").collect();
        assert_eq!(abcam.len(), 1);
        assert_eq!(abcam[0].email, "us.orders@abcam.com");
    }

    #[test]
    fn missing_email_gets_sentinel() {
        let records = fixture_records();
        let fisher = records.iter().find(|r| r.name == "Fisher Scientific").unwrap();
        assert_eq!(fisher.email, EMAIL_NOT_PROVIDED);
        // whitespace-only cell counts as missing
        let qiagen = records.iter().find(|r| r.name == "QIAGEN LLC").unwrap();
        assert_eq!(qiagen.email, EMAIL_NOT_PROVIDED);
        assert!(records.iter().all(|r| !r.email.is_empty()));
    }

    #[test]
    fn unknown_company_without_website_dropped() {
        let records = fixture_records();
        assert!(records.iter().all(|r| r.name != "Unknown Reagents LLC"));
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn website_column_enables_site_search() {
        let csv = "company name,EMAIL ADDRESS,Website\nSmall Lab Supply,,smalllab.example/\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        let records = build_records(rows, &Catalog::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].homepage, "https://smalllab.example");
        assert_eq!(records[0].locator, UrlBuilder::SiteSearch);
    }

    #[test]
    fn unusable_duplicate_does_not_shadow_later_row() {
        let csv = "Company Name,Email Address,Website\n\
                   Small Lab,a@x.com,\n\
                   Small Lab,b@x.com,smalllab.example\n\
                   Small Lab,c@x.com,other.example\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();
        let records = build_records(rows, &Catalog::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "b@x.com");
        assert_eq!(records[0].homepage, "https://smalllab.example");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load(Path::new("tests/fixtures/nope.xlsx"), None, &Catalog::default()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn missing_name_column_is_an_error() {
        assert!(parse_csv(b"vendor,email\nAbcam,x@y.z\n").is_err());
    }

    #[test]
    fn uncovered_lists_catalogue_gaps() {
        let records = fixture_records();
        let catalog = Catalog::default();
        let gaps = uncovered(&records, &catalog);
        assert!(gaps.contains(&"Promega"));
        assert!(!gaps.contains(&"Abcam"));
    }
}
