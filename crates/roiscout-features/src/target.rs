//! Synthetic training target.
//!
//! ```text
//! base    = 0.40·n(yield) + 0.25·n(income/mortgage) + 0.20·n(IRSAD)
//!         + 0.15·demand − 0.20·risk
//! demand  = 0.45·n(working age) + 0.30·n(diversity) + 0.25·n(ln(1 + population))
//! risk    = 0.50·n(senior) + 0.30·n(rent/income) + 0.20·(1 − n(IRSD))
//! target  = clip(base + N(0, σ), floor, ceiling)
//! ```
//!
//! `n` is min-max normalisation. The noise generator is supplied by the
//! caller so a fixed seed reproduces the same target column.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use roiscout_common::normalise::{minmax_normalise, minmax_normalise_reversed};
use roiscout_common::stats::{impute_median, quantile};
use roiscout_common::{Column, FeatureTable, PipelineConfig, Result, RoiError};
use tracing::info;

use crate::columns::*;
use crate::derive::combine;

fn normalised(table: &FeatureTable, name: &str) -> Result<Vec<f64>> {
    let column = table
        .column(name)
        .ok_or_else(|| RoiError::Schema(format!("target input '{}' absent", name)))?;
    Ok(impute_median(&minmax_normalise(column)))
}

/// Add the target, its dense descending rank and the top-quantile flag.
pub fn synthesize_target<R: Rng + ?Sized>(
    table: &mut FeatureTable,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<()> {
    let yield_n = normalised(table, GROSS_YIELD_PCT)?;
    let itm_n = normalised(table, INCOME_TO_MORTGAGE)?;
    let advantage_n = normalised(table, IRSAD_SCORE)?;
    let working_n = normalised(table, WORKING_AGE_SHARE)?;
    let diversity_n = normalised(table, DIVERSITY_SHARE)?;
    let senior_n = normalised(table, SENIOR_SHARE)?;
    let rti_n = normalised(table, RENT_TO_INCOME)?;

    let population = table
        .column(TOTAL_PERSONS)
        .ok_or_else(|| RoiError::Schema(format!("target input '{}' absent", TOTAL_PERSONS)))?;
    let log_pop = combine(&[population], |xs| xs[0].ln_1p());
    let log_pop_n = impute_median(&minmax_normalise(&log_pop));

    let irsd = table
        .column(IRSD_SCORE)
        .ok_or_else(|| RoiError::Schema(format!("target input '{}' absent", IRSD_SCORE)))?;
    let irsd_inv = impute_median(&minmax_normalise_reversed(irsd));

    let noise = Normal::new(0.0, config.noise_std)
        .map_err(|e| RoiError::Config(format!("invalid noise_std {}: {}", config.noise_std, e)))?;

    let target: Column = (0..table.len())
        .map(|i| {
            let demand = 0.45 * working_n[i] + 0.30 * diversity_n[i] + 0.25 * log_pop_n[i];
            let risk = 0.50 * senior_n[i] + 0.30 * rti_n[i] + 0.20 * irsd_inv[i];
            let base = 0.40 * yield_n[i]
                + 0.25 * itm_n[i]
                + 0.20 * advantage_n[i]
                + 0.15 * demand
                - 0.20 * risk;
            let noisy = base + noise.sample(rng);
            Some(noisy.clamp(config.target_floor, config.target_ceiling))
        })
        .collect();

    let ranks = dense_rank_desc(&target);
    let flags = top_quantile_flags(&target, config.top_quantile);
    info!(
        "Synthetic target: {} rows, {} in top cluster",
        target.len(),
        flags.iter().filter(|f| **f == Some(1.0)).count()
    );

    table.insert_column(SYNTHETIC_TARGET, target)?;
    table.insert_column(TARGET_RANK, ranks)?;
    table.insert_column(TOP_QUINTILE_FLAG, flags)?;
    Ok(())
}

/// Dense rank, highest value first: equal values share a rank and the
/// next distinct value takes the next integer. Missing stays missing.
pub fn dense_rank_desc(values: &[Option<f64>]) -> Column {
    let mut distinct: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    distinct.sort_by(|a, b| b.total_cmp(a));
    distinct.dedup();
    values
        .iter()
        .map(|v| v.map(|x| (distinct.partition_point(|d| *d > x) + 1) as f64))
        .collect()
}

/// 1.0 where the value is at or above the `q` quantile, else 0.0.
pub fn top_quantile_flags(values: &[Option<f64>], q: f64) -> Column {
    let finite: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    let threshold = quantile(&finite, q);
    values
        .iter()
        .map(|v| match (v, threshold) {
            (Some(x), Some(t)) if *x >= t => Some(1.0),
            _ => Some(0.0),
        })
        .collect()
}
