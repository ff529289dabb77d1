//! Raw table sources.
//!
//! Loads the three ABS inputs from CSV:
//! - SEIFA 2021 by SAL: identity plus four index score/decile pairs
//! - Census G02: medians and averages (income, rent, mortgage)
//! - Census G01: person counts by age band, birthplace and language
//!
//! Every table comes back keyed by the normalised suburb code, so the join
//! step never has to think about `SAL` prefixes or float-formatted codes.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use roiscout_common::{FeatureTable, Result, RoiError};
use tracing::{debug, info, warn};

use crate::columns::{
    G01_COLUMNS, G02_COLUMNS, IEO_SCORE, IER_SCORE, IRSAD_SCORE, IRSD_SCORE, SAL_CODE, SAL_NAME,
    SEIFA_INDEXES, USUAL_RESIDENT_POPULATION,
};

/// Normalise a suburb code to its numeric key.
///
/// Trims whitespace, strips a letter prefix (`SAL10001` → `10001`) and a
/// float suffix (`10001.0` → `10001`). Anything else around the digits
/// rejects the code, so footnote rows such as
/// `© Commonwealth of Australia 2023` return None.
pub fn normalise_sal_code(raw: &str) -> Option<String> {
    let stripped = raw.trim().trim_start_matches(|c: char| c.is_ascii_alphabetic()).trim_start();
    let stripped = match stripped.split_once('.') {
        Some((int, frac)) if frac.chars().all(|c| c == '0') => int,
        _ => stripped,
    };
    if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(stripped.to_string())
}

/// Map the ABS SEIFA export headers onto the working column names.
///
/// The ABS table repeats `Score` and `Decile` once per index; CSV exports
/// may keep them verbatim or suffix them (`Score.1`). Both are resolved by
/// position. Headers already in working form pass through untouched.
pub fn seifa_headers(headers: Vec<String>) -> Vec<String> {
    let mut scores = 0usize;
    let mut deciles = 0usize;
    headers
        .into_iter()
        .map(|h| {
            if h.starts_with("2021 Suburbs and Localities") && h.ends_with("Code") {
                SAL_CODE.to_string()
            } else if h.starts_with("2021 Suburbs and Localities") && h.ends_with("Name") {
                SAL_NAME.to_string()
            } else if h == "Usual Resident Population" {
                USUAL_RESIDENT_POPULATION.to_string()
            } else if h == "Score" || h.starts_with("Score.") {
                let name = SEIFA_INDEXES
                    .get(scores)
                    .map(|idx| format!("{}_Score", idx))
                    .unwrap_or(h);
                scores += 1;
                name
            } else if h == "Decile" || h.starts_with("Decile.") {
                let name = SEIFA_INDEXES
                    .get(deciles)
                    .map(|idx| format!("{}_Decile", idx))
                    .unwrap_or(h);
                deciles += 1;
                name
            } else {
                h
            }
        })
        .collect()
}

/// Replace the raw codes with normalised ones, dropping rows whose code
/// does not normalise and repeats of a code already seen (first wins).
/// With `require_name`, rows without a suburb name are dropped as well.
fn rekey(table: FeatureTable, label: &str, require_name: bool) -> Result<FeatureTable> {
    let mut keep = Vec::with_capacity(table.len());
    let mut codes = Vec::with_capacity(table.len());
    let mut seen = HashSet::with_capacity(table.len());
    let mut invalid = 0usize;
    for (row, raw) in table.codes().iter().enumerate() {
        let named = table.names()[row].as_deref().is_some_and(|n| !n.trim().is_empty());
        let code = match normalise_sal_code(raw) {
            Some(code) if named || !require_name => code,
            _ => {
                invalid += 1;
                continue;
            }
        };
        if !seen.insert(code.clone()) {
            warn!("{}: duplicate suburb code {}, keeping the first row", label, code);
            continue;
        }
        keep.push(row);
        codes.push(code);
    }
    if invalid > 0 {
        debug!("{}: dropped {} rows without a suburb code or name", label, invalid);
    }
    let mut out = table.select_rows(&keep);
    out.set_codes(codes)?;
    Ok(out)
}

fn open(path: &Path) -> Result<std::fs::File> {
    if !path.exists() {
        return Err(RoiError::MissingInput(path.display().to_string()));
    }
    Ok(std::fs::File::open(path)?)
}

// ── SEIFA ─────────────────────────────────────────────────────────────────────

pub fn load_seifa_reader<R: Read>(reader: R) -> Result<FeatureTable> {
    let table = FeatureTable::from_csv_reader_mapped(reader, SAL_CODE, Some(SAL_NAME), seifa_headers)?;
    let table = rekey(table, "SEIFA", true)?;
    let decile_cols: Vec<String> = SEIFA_INDEXES.iter().map(|i| format!("{}_Decile", i)).collect();
    let mut keep: Vec<&str> = vec![IRSD_SCORE, IRSAD_SCORE, IER_SCORE, IEO_SCORE, USUAL_RESIDENT_POPULATION];
    keep.extend(decile_cols.iter().map(|s| s.as_str()));
    Ok(table.project(&keep))
}

pub fn load_seifa(path: &Path) -> Result<FeatureTable> {
    let table = load_seifa_reader(open(path)?)?;
    info!("Loaded SEIFA: {} suburbs from {:?}", table.len(), path);
    Ok(table)
}

// ── Census DataPacks ──────────────────────────────────────────────────────────

pub fn load_g02_reader<R: Read>(reader: R) -> Result<FeatureTable> {
    let table = FeatureTable::from_csv_reader(reader, SAL_CODE, None)?;
    Ok(rekey(table, "G02", false)?.project(G02_COLUMNS))
}

pub fn load_g02(path: &Path) -> Result<FeatureTable> {
    let table = load_g02_reader(open(path)?)?;
    info!("Loaded G02: {} suburbs from {:?}", table.len(), path);
    Ok(table)
}

pub fn load_g01_reader<R: Read>(reader: R) -> Result<FeatureTable> {
    let table = FeatureTable::from_csv_reader(reader, SAL_CODE, None)?;
    Ok(rekey(table, "G01", false)?.project(G01_COLUMNS))
}

pub fn load_g01(path: &Path) -> Result<FeatureTable> {
    let table = load_g01_reader(open(path)?)?;
    info!("Loaded G01: {} suburbs from {:?}", table.len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalise_sal_code() {
        assert_eq!(normalise_sal_code("SAL10001"), Some("10001".to_string()));
        assert_eq!(normalise_sal_code("  SAL 20002 "), Some("20002".to_string()));
        assert_eq!(normalise_sal_code("10003.0"), Some("10003".to_string()));
        assert_eq!(normalise_sal_code("10004"), Some("10004".to_string()));
        assert_eq!(normalise_sal_code("© Commonwealth of Australia"), None);
        assert_eq!(normalise_sal_code("© Commonwealth of Australia 2023"), None);
        assert_eq!(normalise_sal_code("Source: ABS 2021"), None);
        assert_eq!(normalise_sal_code("10001a"), None);
        assert_eq!(normalise_sal_code(""), None);
        assert_eq!(normalise_sal_code("10005.5"), None);
    }

    #[test]
    fn test_seifa_headers_resolve_by_position() {
        let raw = vec![
            "2021 Suburbs and Localities (SAL) Code".to_string(),
            "2021 Suburbs and Localities (SAL) Name".to_string(),
            "Score".to_string(),
            "Decile".to_string(),
            "Score.1".to_string(),
            "Decile.1".to_string(),
            "Score".to_string(),
            "Decile".to_string(),
            "Score".to_string(),
            "Decile".to_string(),
            "Usual Resident Population".to_string(),
        ];
        assert_eq!(
            seifa_headers(raw),
            vec![
                "SAL_CODE_2021", "SAL_NAME_2021",
                "IRSD_Score", "IRSD_Decile",
                "IRSAD_Score", "IRSAD_Decile",
                "IER_Score", "IER_Decile",
                "IEO_Score", "IEO_Decile",
                "Usual_Resident_Population",
            ]
        );
    }

    #[test]
    fn test_seifa_drops_footer_rows() {
        let csv = "\
SAL_CODE_2021,SAL_NAME_2021,IRSD_Score,IRSAD_Score,IER_Score,IEO_Score
10001,Aarons Pass,1000,990,1010,980
10002,Abbotsbury,1050,1070,1040,1100
Source: ABS,,,,,
";
        let table = load_seifa_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.codes(), &["10001".to_string(), "10002".to_string()]);
        assert_eq!(table.column(IRSAD_SCORE).unwrap(), &[Some(990.0), Some(1070.0)]);
    }

    #[test]
    fn test_seifa_drops_copyright_footer_and_unnamed_rows() {
        let csv = "\
SAL_CODE_2021,SAL_NAME_2021,IRSD_Score,IRSAD_Score,IER_Score,IEO_Score
10001,Aarons Pass,1000,990,1010,980
10009,,1000,990,1010,980
© Commonwealth of Australia 2023
";
        let table = load_seifa_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.codes(), &["10001".to_string()]);
    }

    #[test]
    fn test_duplicate_codes_keep_first_row() {
        let csv = "\
SAL_CODE_2021,SAL_NAME_2021,IRSD_Score,IRSAD_Score,IER_Score,IEO_Score
10001,Aarons Pass,1000,990,1010,980
SAL10001,Aarons Pass (dup),1200,1190,1210,1180
10002,Abbotsbury,1050,1070,1040,1100
";
        let table = load_seifa_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.codes(), &["10001".to_string(), "10002".to_string()]);
        assert_eq!(table.column(IRSAD_SCORE).unwrap(), &[Some(990.0), Some(1070.0)]);
        assert_eq!(table.names()[0].as_deref(), Some("Aarons Pass"));
    }

    #[test]
    fn test_g02_keeps_documented_columns() {
        let csv = "\
SAL_CODE_2021,Median_rent_weekly,Median_mortgage_repay_monthly,Unrelated
SAL10001,350,1800,7
";
        let table = load_g02_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.codes(), &["10001".to_string()]);
        assert!(table.has_column("Median_rent_weekly"));
        assert!(!table.has_column("Unrelated"));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let err = load_g01(Path::new("/nonexistent/G01.csv")).unwrap_err();
        assert!(matches!(err, RoiError::MissingInput(_)));
    }
}
