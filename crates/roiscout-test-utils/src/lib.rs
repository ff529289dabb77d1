//! Shared test fixtures for the roiscout workspace.
//!
//! Small raw ABS extracts (SEIFA, G02, G01) covering six suburbs, a
//! helper that lays them out on disk the way [`DataConfig`] expects, and a
//! row-literal builder for engineered tables.

use std::fs;
use std::path::{Path, PathBuf};

use roiscout_common::{Column, DataConfig, FeatureTable};
use tempfile::TempDir;

/// SEIFA 2021 extract with ABS export headers and a trailing footer row.
/// Zeta (10006) has no G02 record.
pub const SEIFA_CSV: &str = "\
2021 Suburbs and Localities (SAL) Code,2021 Suburbs and Localities (SAL) Name,Score,Decile,Score,Decile,Score,Decile,Score,Decile,Usual Resident Population
10001,Alpha,1000,5,990,5,1010,6,980,4,5200
10002,Beta,1050,8,1070,8,1040,7,1100,9,8100
10003,Gamma,920,2,900,2,950,3,910,2,3100
10004,Delta,1100,10,1120,10,1090,9,1150,10,12000
10005,Epsilon,980,4,975,4,990,5,1000,5,4400
10006,Zeta,1010,6,1005,6,1000,5,1020,6,2600
© Commonwealth of Australia 2023
";

pub const G02_CSV: &str = "\
SAL_CODE_2021,Median_age_persons,Median_mortgage_repay_monthly,Median_tot_prsnl_inc_weekly,Median_rent_weekly,Median_tot_fam_inc_weekly,Average_num_psns_per_bedroom,Median_tot_hhd_inc_weekly,Average_household_size
SAL10001,38,1800,850,380,2100,0.8,1700,2.5
SAL10002,34,2400,1100,520,2900,0.9,2300,2.7
SAL10003,45,1300,650,300,1500,0.8,1200,2.3
SAL10004,36,3000,1400,650,3600,0.9,2900,2.8
SAL10005,41,1600,780,340,1900,0.8,1500,2.4
";

pub const G01_CSV: &str = "\
SAL_CODE_2021,Tot_P_P,Age_25_34_yr_P,Age_35_44_yr_P,Age_45_54_yr_P,Age_65_74_yr_P,Age_75_84_yr_P,Age_85ov_P,Birthplace_Elsewhere_P,Lang_used_home_Oth_Lang_P,Australian_citizen_P
SAL10001,5200,700,720,690,520,300,110,1200,900,4500
SAL10002,8100,1500,1300,1000,600,300,100,2800,2500,6600
SAL10003,3100,300,330,380,450,300,120,400,250,2900
SAL10004,12000,2000,1900,1600,900,500,200,4500,4000,9500
SAL10005,4400,520,560,600,500,320,130,800,600,3900
SAL10006,2600,310,330,340,280,160,60,500,350,2300
";

pub const FIXTURE_SUBURBS: usize = 6;

/// Write `content` to `dir/name`, creating `dir` if needed.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("create fixture dir");
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

/// Raw inputs written into a fresh temp directory, with a [`DataConfig`]
/// pointing at them. Keep the `TempDir` alive for the duration of the test.
pub fn raw_data_dir() -> (TempDir, DataConfig) {
    let dir = TempDir::new().expect("tempdir");
    let seifa = write_fixture(dir.path(), "SEIFA_2021_SAL.csv", SEIFA_CSV);
    let g02 = write_fixture(dir.path(), "G02.csv", G02_CSV);
    let g01 = write_fixture(dir.path(), "G01.csv", G01_CSV);
    let config = DataConfig {
        seifa_csv: seifa.display().to_string(),
        g02_csv: g02.display().to_string(),
        g01_csv: g01.display().to_string(),
        engineered_csv: dir.path().join("prepared/features.csv").display().to_string(),
        model_path: dir.path().join("models/model.json").display().to_string(),
    };
    (dir, config)
}

/// Build a table from row literals. Codes are assigned `1..=n`; a NaN cell
/// becomes missing.
///
/// ```
/// let t = roiscout_test_utils::table_from_rows(&["rent"], &[("A", &[400.0]), ("B", &[f64::NAN])]);
/// assert_eq!(t.column("rent").unwrap(), &[Some(400.0), None]);
/// ```
pub fn table_from_rows(columns: &[&str], rows: &[(&str, &[f64])]) -> FeatureTable {
    let codes = (1..=rows.len()).map(|i| i.to_string()).collect();
    let names = rows.iter().map(|(name, _)| Some(name.to_string())).collect();
    let mut table = FeatureTable::new(codes, names).expect("identity");
    for (slot, column) in columns.iter().enumerate() {
        let values: Column = rows
            .iter()
            .map(|(_, cells)| cells.get(slot).copied().filter(|v| !v.is_nan()))
            .collect();
        table.insert_column(*column, values).expect("column length");
    }
    table
}
