//! Column names shared by the raw tables, the engineered table and the
//! serving layer.

// ── Identity ──────────────────────────────────────────────────────────────────
pub const SAL_CODE: &str = "SAL_CODE_2021";
pub const SAL_NAME: &str = "SAL_NAME_2021";

// ── SEIFA ─────────────────────────────────────────────────────────────────────
pub const IRSD_SCORE: &str = "IRSD_Score";
pub const IRSAD_SCORE: &str = "IRSAD_Score";
pub const IER_SCORE: &str = "IER_Score";
pub const IEO_SCORE: &str = "IEO_Score";
pub const USUAL_RESIDENT_POPULATION: &str = "Usual_Resident_Population";

/// SEIFA indexes in the order their score/decile pairs appear in the ABS table.
pub const SEIFA_INDEXES: [&str; 4] = ["IRSD", "IRSAD", "IER", "IEO"];

// ── Census G02: medians and averages ──────────────────────────────────────────
pub const MEDIAN_AGE: &str = "Median_age_persons";
pub const MORTGAGE_MONTHLY: &str = "Median_mortgage_repay_monthly";
pub const PERSONAL_INCOME_WEEKLY: &str = "Median_tot_prsnl_inc_weekly";
pub const RENT_WEEKLY: &str = "Median_rent_weekly";
pub const FAMILY_INCOME_WEEKLY: &str = "Median_tot_fam_inc_weekly";
pub const PERSONS_PER_BEDROOM: &str = "Average_num_psns_per_bedroom";
pub const HOUSEHOLD_INCOME_WEEKLY: &str = "Median_tot_hhd_inc_weekly";
pub const HOUSEHOLD_SIZE: &str = "Average_household_size";

pub const G02_COLUMNS: &[&str] = &[
    MEDIAN_AGE,
    MORTGAGE_MONTHLY,
    PERSONAL_INCOME_WEEKLY,
    RENT_WEEKLY,
    FAMILY_INCOME_WEEKLY,
    PERSONS_PER_BEDROOM,
    HOUSEHOLD_INCOME_WEEKLY,
    HOUSEHOLD_SIZE,
];

// ── Census G01: person counts ─────────────────────────────────────────────────
pub const TOTAL_PERSONS: &str = "Tot_P_P";
pub const AGE_25_34: &str = "Age_25_34_yr_P";
pub const AGE_35_44: &str = "Age_35_44_yr_P";
pub const AGE_45_54: &str = "Age_45_54_yr_P";
pub const AGE_65_74: &str = "Age_65_74_yr_P";
pub const AGE_75_84: &str = "Age_75_84_yr_P";
pub const AGE_85_OVER: &str = "Age_85ov_P";
pub const BORN_ELSEWHERE: &str = "Birthplace_Elsewhere_P";
pub const OTHER_LANGUAGE: &str = "Lang_used_home_Oth_Lang_P";
pub const CITIZENS: &str = "Australian_citizen_P";

pub const G01_COLUMNS: &[&str] = &[
    TOTAL_PERSONS,
    "Age_0_4_yr_P",
    "Age_5_14_yr_P",
    "Age_15_19_yr_P",
    "Age_20_24_yr_P",
    AGE_25_34,
    AGE_35_44,
    AGE_45_54,
    "Age_55_64_yr_P",
    AGE_65_74,
    AGE_75_84,
    AGE_85_OVER,
    BORN_ELSEWHERE,
    OTHER_LANGUAGE,
    CITIZENS,
];

pub const WORKING_AGE_BANDS: &[&str] = &[AGE_25_34, AGE_35_44, AGE_45_54];
pub const SENIOR_BANDS: &[&str] = &[AGE_65_74, AGE_75_84, AGE_85_OVER];

// ── Derived ───────────────────────────────────────────────────────────────────
pub const INCOME_TO_MORTGAGE: &str = "Income_to_Mortgage_Ratio";
pub const RENT_TO_INCOME: &str = "Rent_to_Income_Ratio";
pub const WORKING_AGE_SHARE: &str = "Working_Age_Share";
pub const SENIOR_SHARE: &str = "Senior_Share";
pub const DIVERSITY_SHARE: &str = "Diversity_Share";
pub const PROPERTY_PRICE: &str = "Estimated_Property_Price";
pub const ANNUAL_RENT: &str = "Annual_Rent";
pub const GROSS_YIELD_PCT: &str = "Estimated_Gross_Yield_Pct";
pub const NET_YIELD_PCT: &str = "Estimated_Net_Yield_Pct";
pub const GROWTH_PROXY_PCT: &str = "Capital_Growth_Proxy_Pct";
pub const LEGACY_PROXY_SCORE: &str = "ROI_Proxy_Score";
pub const SYNTHETIC_TARGET: &str = "Realistic_ROI_Target";
pub const TARGET_RANK: &str = "ROI_Rank";
pub const TOP_QUINTILE_FLAG: &str = "Top20_Flag";

/// Column order of the engineered table after the identity columns.
pub const ENGINEERED_COLUMNS: &[&str] = &[
    IRSD_SCORE,
    IRSAD_SCORE,
    IER_SCORE,
    IEO_SCORE,
    MEDIAN_AGE,
    MORTGAGE_MONTHLY,
    PERSONAL_INCOME_WEEKLY,
    RENT_WEEKLY,
    HOUSEHOLD_INCOME_WEEKLY,
    HOUSEHOLD_SIZE,
    TOTAL_PERSONS,
    INCOME_TO_MORTGAGE,
    RENT_TO_INCOME,
    WORKING_AGE_SHARE,
    SENIOR_SHARE,
    DIVERSITY_SHARE,
    PROPERTY_PRICE,
    GROSS_YIELD_PCT,
    NET_YIELD_PCT,
    GROWTH_PROXY_PCT,
    LEGACY_PROXY_SCORE,
    SYNTHETIC_TARGET,
    TARGET_RANK,
    TOP_QUINTILE_FLAG,
];
