//! Feature pipeline orchestration.
//!
//! ```text
//! SEIFA ──┐
//!         ├─ left join (G02) ─ left join (G01) ─ negotiate ─ derive ─ target
//! G02/G01 ┘
//! ```

use std::fs;
use std::io::Write;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roiscout_common::{DataConfig, FeatureTable, PipelineConfig, Result};
use tracing::{info, warn};

use crate::columns::{ENGINEERED_COLUMNS, SAL_CODE, SAL_NAME};
use crate::derive::derive_features;
use crate::join::{left_join, JoinStats};
use crate::schema::{negotiate, DerivedFeature, SchemaReport};
use crate::sources::{load_g01, load_g02, load_seifa};
use crate::target::synthesize_target;

/// The three raw inputs, already keyed by normalised suburb code.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub seifa: FeatureTable,
    pub g02: FeatureTable,
    pub g01: FeatureTable,
}

impl RawTables {
    /// Load all three tables. Any missing file aborts the load.
    pub fn load(config: &DataConfig) -> Result<Self> {
        Ok(Self {
            seifa: load_seifa(Path::new(&config.seifa_csv))?,
            g02: load_g02(Path::new(&config.g02_csv))?,
            g01: load_g01(Path::new(&config.g01_csv))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: FeatureTable,
    pub report: SchemaReport,
    pub joins: Vec<JoinStats>,
}

pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Noise generator seeded from `noise_seed`.
    pub fn seeded_rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.config.noise_seed)
    }

    /// Join, negotiate and derive. `rng` drives the target noise only.
    pub fn run<R: Rng + ?Sized>(&self, raw: &RawTables, rng: &mut R) -> Result<PipelineOutput> {
        let (joined, g02_stats) = left_join(&raw.seifa, &raw.g02, "G02")?;
        let (mut table, g01_stats) = left_join(&joined, &raw.g01, "G01")?;

        let report = negotiate(&table);
        for (feature, absent) in &report.missing {
            warn!("Cannot derive {}: missing {:?}", feature.column(), absent);
        }

        derive_features(&mut table, &report, &self.config)?;
        if report.can_derive(DerivedFeature::SyntheticTarget) {
            synthesize_target(&mut table, &self.config, rng)?;
        }

        info!(
            "Feature pipeline complete: {} suburbs, {} of {} derived features",
            table.len(),
            report.derivable.len(),
            DerivedFeature::ALL.len()
        );
        Ok(PipelineOutput {
            table,
            report,
            joins: vec![g02_stats, g01_stats],
        })
    }
}

/// Write the engineered table: identity first, then the documented order.
pub fn write_engineered_csv<W: Write>(table: &FeatureTable, writer: W) -> Result<()> {
    table.write_csv(writer, SAL_CODE, SAL_NAME, ENGINEERED_COLUMNS)
}

pub fn write_engineered_csv_path(table: &FeatureTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_engineered_csv(table, file)?;
    info!("Wrote engineered table ({} rows) to {:?}", table.len(), path);
    Ok(())
}
