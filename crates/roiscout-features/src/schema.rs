//! Schema negotiation for derived features.
//!
//! Each derived feature declares the raw columns it is computed from.
//! Before deriving anything the pipeline asks [`negotiate`] which features
//! the joined table can support, and only those are produced. Identity
//! (code and name) is the only hard requirement and is enforced when the
//! SEIFA table is read.

use roiscout_common::FeatureTable;
use serde::Serialize;

use crate::columns::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFeature {
    IncomeToMortgageRatio,
    RentToIncomeRatio,
    WorkingAgeShare,
    SeniorShare,
    DiversityShare,
    EstimatedPropertyPrice,
    AnnualRent,
    GrossYield,
    NetYield,
    CapitalGrowthProxy,
    LegacyProxyScore,
    SyntheticTarget,
}

impl DerivedFeature {
    /// Derivation order: later features may read earlier ones.
    pub const ALL: [DerivedFeature; 12] = [
        DerivedFeature::IncomeToMortgageRatio,
        DerivedFeature::RentToIncomeRatio,
        DerivedFeature::WorkingAgeShare,
        DerivedFeature::SeniorShare,
        DerivedFeature::DiversityShare,
        DerivedFeature::EstimatedPropertyPrice,
        DerivedFeature::AnnualRent,
        DerivedFeature::GrossYield,
        DerivedFeature::NetYield,
        DerivedFeature::CapitalGrowthProxy,
        DerivedFeature::LegacyProxyScore,
        DerivedFeature::SyntheticTarget,
    ];

    /// Output column written by this feature.
    pub fn column(&self) -> &'static str {
        match self {
            DerivedFeature::IncomeToMortgageRatio => INCOME_TO_MORTGAGE,
            DerivedFeature::RentToIncomeRatio => RENT_TO_INCOME,
            DerivedFeature::WorkingAgeShare => WORKING_AGE_SHARE,
            DerivedFeature::SeniorShare => SENIOR_SHARE,
            DerivedFeature::DiversityShare => DIVERSITY_SHARE,
            DerivedFeature::EstimatedPropertyPrice => PROPERTY_PRICE,
            DerivedFeature::AnnualRent => ANNUAL_RENT,
            DerivedFeature::GrossYield => GROSS_YIELD_PCT,
            DerivedFeature::NetYield => NET_YIELD_PCT,
            DerivedFeature::CapitalGrowthProxy => GROWTH_PROXY_PCT,
            DerivedFeature::LegacyProxyScore => LEGACY_PROXY_SCORE,
            DerivedFeature::SyntheticTarget => SYNTHETIC_TARGET,
        }
    }

    /// Raw input columns this feature needs, including those of the
    /// intermediate features it builds on.
    pub fn requires(&self) -> &'static [&'static str] {
        match self {
            DerivedFeature::IncomeToMortgageRatio => &[HOUSEHOLD_INCOME_WEEKLY, MORTGAGE_MONTHLY],
            DerivedFeature::RentToIncomeRatio => &[RENT_WEEKLY, HOUSEHOLD_INCOME_WEEKLY],
            DerivedFeature::WorkingAgeShare => &[AGE_25_34, AGE_35_44, AGE_45_54, TOTAL_PERSONS],
            DerivedFeature::SeniorShare => &[AGE_65_74, AGE_75_84, AGE_85_OVER, TOTAL_PERSONS],
            DerivedFeature::DiversityShare => &[BORN_ELSEWHERE, OTHER_LANGUAGE, TOTAL_PERSONS],
            DerivedFeature::EstimatedPropertyPrice => &[MORTGAGE_MONTHLY],
            DerivedFeature::AnnualRent => &[RENT_WEEKLY],
            DerivedFeature::GrossYield | DerivedFeature::NetYield => &[RENT_WEEKLY, MORTGAGE_MONTHLY],
            DerivedFeature::CapitalGrowthProxy => &[HOUSEHOLD_INCOME_WEEKLY, IRSAD_SCORE],
            DerivedFeature::LegacyProxyScore => &[
                HOUSEHOLD_INCOME_WEEKLY,
                MORTGAGE_MONTHLY,
                RENT_WEEKLY,
                IRSAD_SCORE,
                AGE_25_34,
                AGE_35_44,
                AGE_45_54,
                TOTAL_PERSONS,
            ],
            DerivedFeature::SyntheticTarget => &[
                HOUSEHOLD_INCOME_WEEKLY,
                MORTGAGE_MONTHLY,
                RENT_WEEKLY,
                IRSAD_SCORE,
                IRSD_SCORE,
                AGE_25_34,
                AGE_35_44,
                AGE_45_54,
                AGE_65_74,
                AGE_75_84,
                AGE_85_OVER,
                BORN_ELSEWHERE,
                OTHER_LANGUAGE,
                TOTAL_PERSONS,
            ],
        }
    }
}

/// What the pipeline can produce from a given table.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SchemaReport {
    pub derivable: Vec<DerivedFeature>,
    /// Underivable features with the raw columns they lack
    pub missing: Vec<(DerivedFeature, Vec<String>)>,
}

impl SchemaReport {
    pub fn can_derive(&self, feature: DerivedFeature) -> bool {
        self.derivable.contains(&feature)
    }
}

pub fn negotiate(table: &FeatureTable) -> SchemaReport {
    let mut report = SchemaReport::default();
    for feature in DerivedFeature::ALL {
        let absent: Vec<String> = feature
            .requires()
            .iter()
            .filter(|c| !table.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if absent.is_empty() {
            report.derivable.push(feature);
        } else {
            report.missing.push((feature, absent));
        }
    }
    report
}
