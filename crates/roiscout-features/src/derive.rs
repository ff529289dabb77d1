//! Ratio, share and price/yield derivations.

use roiscout_common::normalise::{minmax_normalise, normalise_score};
use roiscout_common::{Column, FeatureTable, PipelineConfig, Result, RoiError};
use tracing::debug;

use crate::columns::*;
use crate::schema::{DerivedFeature, SchemaReport};

/// Weekly → monthly conversion used by the income-to-mortgage ratio.
pub const WEEKS_PER_MONTH: f64 = 4.33;
pub const WEEKS_PER_YEAR: f64 = 52.0;
/// Share of gross rent assumed lost to rates, maintenance and management.
pub const RUNNING_COST_SHARE: f64 = 0.20;

/// Back-solve the loan principal from a monthly repayment with the
/// amortising-loan annuity identity:
///
/// principal = payment × [(1+r)^n − 1] / [r × (1+r)^n]
///
/// with `r` the monthly rate and `n` the number of monthly payments.
pub fn monthly_payment_to_principal(payment: f64, annual_rate: f64, years: u32) -> f64 {
    payment * annuity_factor(annual_rate, years)
}

/// Inverse of [`monthly_payment_to_principal`].
pub fn principal_to_monthly_payment(principal: f64, annual_rate: f64, years: u32) -> f64 {
    principal / annuity_factor(annual_rate, years)
}

fn annuity_factor(annual_rate: f64, years: u32) -> f64 {
    let r = annual_rate / 12.0;
    let n = i32::try_from(years.saturating_mul(12)).unwrap_or(i32::MAX);
    let growth = (1.0 + r).powi(n);
    (growth - 1.0) / (r * growth)
}

/// Row-wise combination of several columns. A row is missing in the
/// output if any input is missing there or `f` yields a non-finite value.
pub fn combine<F>(inputs: &[&[Option<f64>]], f: F) -> Column
where
    F: Fn(&[f64]) -> f64,
{
    let rows = inputs.first().map(|c| c.len()).unwrap_or(0);
    let mut buf = vec![0.0; inputs.len()];
    (0..rows)
        .map(|row| {
            for (slot, col) in inputs.iter().enumerate() {
                buf[slot] = col[row]?;
            }
            Some(f(&buf)).filter(|v| v.is_finite())
        })
        .collect()
}

/// Σ wᵢ·xᵢ over the given columns, row by row.
pub fn weighted_sum(parts: &[(f64, &[Option<f64>])]) -> Column {
    let weights: Vec<f64> = parts.iter().map(|(w, _)| *w).collect();
    let columns: Vec<&[Option<f64>]> = parts.iter().map(|(_, c)| *c).collect();
    combine(&columns, |xs| xs.iter().zip(&weights).map(|(x, w)| x * w).sum())
}

fn col<'a>(table: &'a FeatureTable, name: &str) -> Result<&'a [Option<f64>]> {
    table
        .column(name)
        .ok_or_else(|| RoiError::Schema(format!("column '{}' required but absent", name)))
}

/// Sum of the named columns divided by `scale × total persons`.
fn population_share(table: &FeatureTable, bands: &[&str], scale: f64) -> Result<Column> {
    let mut inputs = vec![col(table, TOTAL_PERSONS)?];
    for band in bands {
        inputs.push(col(table, band)?);
    }
    Ok(combine(&inputs, |xs| xs[1..].iter().sum::<f64>() / (scale * xs[0])))
}

/// Compute every derivable feature except the synthetic target, in
/// dependency order, writing each into `table`.
pub fn derive_features(
    table: &mut FeatureTable,
    report: &SchemaReport,
    config: &PipelineConfig,
) -> Result<()> {
    for feature in DerivedFeature::ALL {
        if feature == DerivedFeature::SyntheticTarget || !report.can_derive(feature) {
            continue;
        }
        let values = derive_one(table, feature, config)?;
        debug!(
            "Derived {}: {} of {} rows defined",
            feature.column(),
            values.iter().filter(|v| v.is_some()).count(),
            values.len()
        );
        table.insert_column(feature.column(), values)?;
    }
    Ok(())
}

fn derive_one(table: &FeatureTable, feature: DerivedFeature, config: &PipelineConfig) -> Result<Column> {
    let values = match feature {
        DerivedFeature::IncomeToMortgageRatio => combine(
            &[col(table, HOUSEHOLD_INCOME_WEEKLY)?, col(table, MORTGAGE_MONTHLY)?],
            |xs| (xs[0] * WEEKS_PER_MONTH) / xs[1],
        ),
        DerivedFeature::RentToIncomeRatio => combine(
            &[col(table, RENT_WEEKLY)?, col(table, HOUSEHOLD_INCOME_WEEKLY)?],
            |xs| xs[0] / xs[1],
        ),
        DerivedFeature::WorkingAgeShare => population_share(table, WORKING_AGE_BANDS, 1.0)?,
        DerivedFeature::SeniorShare => population_share(table, SENIOR_BANDS, 1.0)?,
        DerivedFeature::DiversityShare => {
            population_share(table, &[BORN_ELSEWHERE, OTHER_LANGUAGE], 2.0)?
        }
        DerivedFeature::EstimatedPropertyPrice => {
            let (rate, years) = (config.annual_rate, config.term_years);
            combine(&[col(table, MORTGAGE_MONTHLY)?], |xs| {
                monthly_payment_to_principal(xs[0], rate, years)
            })
        }
        DerivedFeature::AnnualRent => {
            combine(&[col(table, RENT_WEEKLY)?], |xs| xs[0] * WEEKS_PER_YEAR)
        }
        DerivedFeature::GrossYield => combine(
            &[col(table, ANNUAL_RENT)?, col(table, PROPERTY_PRICE)?],
            |xs| xs[0] / xs[1] * 100.0,
        ),
        DerivedFeature::NetYield => combine(
            &[col(table, ANNUAL_RENT)?, col(table, PROPERTY_PRICE)?],
            |xs| (xs[0] * (1.0 - RUNNING_COST_SHARE)) / xs[1] * 100.0,
        ),
        DerivedFeature::CapitalGrowthProxy => {
            let income = normalise_score(col(table, HOUSEHOLD_INCOME_WEEKLY)?, false);
            let advantage = normalise_score(col(table, IRSAD_SCORE)?, false);
            combine(&[&income[..], &advantage[..]], |xs| (0.5 * xs[0] + 0.5 * xs[1]) / 10.0)
        }
        DerivedFeature::LegacyProxyScore => {
            let itm = minmax_normalise(col(table, INCOME_TO_MORTGAGE)?);
            let rent = minmax_normalise(col(table, RENT_WEEKLY)?);
            let advantage = minmax_normalise(col(table, IRSAD_SCORE)?);
            let working = minmax_normalise(col(table, WORKING_AGE_SHARE)?);
            weighted_sum(&[
                (0.35, &itm[..]),
                (0.30, &rent[..]),
                (0.20, &advantage[..]),
                (0.15, &working[..]),
            ])
        }
        DerivedFeature::SyntheticTarget => {
            return Err(RoiError::Schema(
                "synthetic target is produced by the target step".to_string(),
            ))
        }
    };
    Ok(values)
}
