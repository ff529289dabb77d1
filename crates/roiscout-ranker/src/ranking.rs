//! Opportunity ranking, tagging and filtering.
//!
//! Thresholds for the descriptive tags are population quantiles over every
//! ranked suburb, not just the returned head, so a suburb's tags do not
//! depend on `top_n`.

use roiscout_common::stats::{mean, median, quantile, round_to};
use serde::{Deserialize, Serialize};

use crate::dataset::SuburbRow;

pub const MIN_TOP_N: usize = 5;
pub const MAX_TOP_N: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightTag {
    #[serde(rename = "High rent demand")]
    HighRentDemand,
    #[serde(rename = "Socio-economic resilience")]
    SocioEconomicResilience,
    #[serde(rename = "Relatively affordable")]
    RelativelyAffordable,
    #[serde(rename = "Top ROI cluster")]
    TopRoiCluster,
    #[serde(rename = "Balanced profile")]
    BalancedProfile,
}

impl InsightTag {
    pub fn label(&self) -> &'static str {
        match self {
            InsightTag::HighRentDemand => "High rent demand",
            InsightTag::SocioEconomicResilience => "Socio-economic resilience",
            InsightTag::RelativelyAffordable => "Relatively affordable",
            InsightTag::TopRoiCluster => "Top ROI cluster",
            InsightTag::BalancedProfile => "Balanced profile",
        }
    }
}

/// Population quantiles the tags are judged against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TagThresholds {
    /// 75th percentile of weekly rent
    pub rent: Option<f64>,
    /// 60th percentile of the IRSD score
    pub seifa: Option<f64>,
    /// 40th percentile of the mortgage repayment
    pub price: Option<f64>,
}

impl TagThresholds {
    pub fn from_rows(rows: &[SuburbRow]) -> Self {
        let finite = |f: fn(&SuburbRow) -> Option<f64>| -> Vec<f64> { rows.iter().filter_map(f).collect() };
        Self {
            rent: quantile(&finite(|r| r.rent), 0.75),
            seifa: quantile(&finite(|r| r.seifa_score), 0.60),
            price: quantile(&finite(|r| r.price), 0.40),
        }
    }

    /// Tags for one row; never empty. A missing value or threshold does
    /// not earn the tag.
    pub fn tags_for(&self, row: &SuburbRow) -> Vec<InsightTag> {
        let at_least = |v: Option<f64>, t: Option<f64>| matches!((v, t), (Some(v), Some(t)) if v >= t);
        let at_most = |v: Option<f64>, t: Option<f64>| matches!((v, t), (Some(v), Some(t)) if v <= t);

        let mut tags = Vec::new();
        if at_least(row.rent, self.rent) {
            tags.push(InsightTag::HighRentDemand);
        }
        if at_least(row.seifa_score, self.seifa) {
            tags.push(InsightTag::SocioEconomicResilience);
        }
        if at_most(row.price, self.price) {
            tags.push(InsightTag::RelativelyAffordable);
        }
        if row.top_quintile {
            tags.push(InsightTag::TopRoiCluster);
        }
        if tags.is_empty() {
            tags.push(InsightTag::BalancedProfile);
        }
        tags
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRow {
    /// 1-based position in the ranked head
    pub rank: usize,
    #[serde(flatten)]
    pub row: SuburbRow,
    pub tags: Vec<InsightTag>,
}

/// Aggregates in percent, rounded to 2 decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub avg_top_n: f64,
    pub median_all: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    pub summary: Summary,
    pub thresholds: TagThresholds,
    pub opportunities: Vec<OpportunityRow>,
}

fn score_desc(rows: &mut [SuburbRow]) {
    rows.sort_by(|a, b| {
        let (a, b) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
        b.total_cmp(&a)
    });
}

/// Rank named, scored suburbs and tag the best `top_n` (clamped to 5..=100).
pub fn rank_opportunities(rows: &[SuburbRow], top_n: usize) -> RankingResult {
    let mut population: Vec<SuburbRow> = rows
        .iter()
        .filter(|r| r.name.is_some() && r.score.is_some())
        .cloned()
        .collect();
    score_desc(&mut population);

    let thresholds = TagThresholds::from_rows(&population);
    let head = top_n.clamp(MIN_TOP_N, MAX_TOP_N).min(population.len());

    let all_scores: Vec<f64> = population.iter().filter_map(|r| r.score).collect();
    let percent = |v: Option<f64>| v.map(|x| round_to(x * 100.0, 2)).unwrap_or(0.0);
    let summary = Summary {
        avg_top_n: percent(mean(&all_scores[..head])),
        median_all: percent(median(&all_scores)),
        max: percent(all_scores.first().copied()),
        count: population.len(),
    };

    let opportunities = population
        .into_iter()
        .take(head)
        .enumerate()
        .map(|(i, row)| OpportunityRow {
            rank: i + 1,
            tags: thresholds.tags_for(&row),
            row,
        })
        .collect();

    RankingResult {
        summary,
        thresholds,
        opportunities,
    }
}

/// Optional, independent row predicates. An absent predicate does not
/// constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterQuery {
    /// Case-insensitive substring of the suburb name
    pub name: Option<String>,
    /// Fraction, or percent when above 1
    pub min_score: Option<f64>,
    pub max_price: Option<f64>,
    pub min_seifa: Option<f64>,
}

/// Rows matching every predicate, best score first. Missing values count
/// as 0.
pub fn filter(rows: &[SuburbRow], query: &FilterQuery) -> Vec<SuburbRow> {
    let needle = query
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase);
    let min_score = query.min_score.map(|s| if s > 1.0 { s / 100.0 } else { s });

    let mut out: Vec<SuburbRow> = rows
        .iter()
        .filter(|r| match &needle {
            Some(n) => r.name.as_deref().unwrap_or("").to_lowercase().contains(n.as_str()),
            None => true,
        })
        .filter(|r| min_score.map_or(true, |t| r.score.unwrap_or(0.0) >= t))
        .filter(|r| query.max_price.map_or(true, |t| r.price.unwrap_or(0.0) <= t))
        .filter(|r| query.min_seifa.map_or(true, |t| r.seifa_score.unwrap_or(0.0) >= t))
        .cloned()
        .collect();
    score_desc(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(name: &str, score: f64, rent: f64, seifa: f64, price: f64, top: bool) -> SuburbRow {
        SuburbRow {
            rent: Some(rent),
            seifa_score: Some(seifa),
            price: Some(price),
            top_quintile: top,
            ..SuburbRow::scored(name, score)
        }
    }

    #[test]
    fn test_tagging_scenario() {
        let thresholds = TagThresholds {
            rent: Some(480.0),
            seifa: Some(1000.0),
            price: Some(1800.0),
        };
        let a = row("A", 0.7, 500.0, 1100.0, 2000.0, true);
        let b = row("B", 0.3, 300.0, 900.0, 1500.0, false);
        assert_eq!(
            thresholds.tags_for(&a),
            vec![
                InsightTag::HighRentDemand,
                InsightTag::SocioEconomicResilience,
                InsightTag::TopRoiCluster
            ]
        );
        assert_eq!(thresholds.tags_for(&b), vec![InsightTag::RelativelyAffordable]);

        let pricey_b = row("B", 0.3, 300.0, 900.0, 1900.0, false);
        assert_eq!(thresholds.tags_for(&pricey_b), vec![InsightTag::BalancedProfile]);
    }

    #[test]
    fn test_missing_value_fails_predicate() {
        let thresholds = TagThresholds { rent: Some(100.0), seifa: None, price: Some(1.0) };
        let r = SuburbRow::scored("X", 0.5);
        assert_eq!(thresholds.tags_for(&r), vec![InsightTag::BalancedProfile]);
    }

    #[test]
    fn test_rank_clamps_and_summarises() {
        let rows: Vec<SuburbRow> = (0..10)
            .map(|i| row(&format!("S{}", i), i as f64 / 10.0, 300.0 + i as f64, 1000.0, 2000.0, false))
            .collect();
        let result = rank_opportunities(&rows, 1);
        assert_eq!(result.opportunities.len(), MIN_TOP_N);
        let ranked: Vec<(usize, Option<&str>)> = result
            .opportunities
            .iter()
            .map(|o| (o.rank, o.row.name.as_deref()))
            .collect();
        assert_eq!(ranked[0], (1, Some("S9")));
        assert_eq!(ranked[4], (5, Some("S5")));
        assert_eq!(result.summary.count, 10);
        assert_eq!(result.summary.max, 90.0);
        assert_eq!(result.summary.avg_top_n, 70.0);
        assert_eq!(result.summary.median_all, 45.0);
        assert!(result.opportunities.iter().all(|o| !o.tags.is_empty()));
    }

    #[test]
    fn test_thresholds_come_from_whole_population() {
        let rows: Vec<SuburbRow> = (0..10)
            .map(|i| {
                let i = i as f64;
                row(&format!("S{}", i), i / 10.0, 100.0 * (i + 1.0), 900.0 + 10.0 * i, 1000.0 + 100.0 * i, false)
            })
            .collect();
        let result = rank_opportunities(&rows, 5);

        let near = |v: Option<f64>, want: f64| (v.unwrap() - want).abs() < 1e-9;
        assert!(near(result.thresholds.rent, 775.0), "{:?}", result.thresholds);
        assert!(near(result.thresholds.seifa, 954.0), "{:?}", result.thresholds);
        assert!(near(result.thresholds.price, 1360.0), "{:?}", result.thresholds);

        // Head-only quantiles (rent 900, IRSD 974) would tag S7 and S6 differently.
        let tags: Vec<(&str, Vec<InsightTag>)> = result
            .opportunities
            .iter()
            .map(|o| (o.row.name.as_deref().unwrap_or(""), o.tags.clone()))
            .collect();
        use InsightTag::*;
        assert_eq!(
            tags,
            vec![
                ("S9", vec![HighRentDemand, SocioEconomicResilience]),
                ("S8", vec![HighRentDemand, SocioEconomicResilience]),
                ("S7", vec![HighRentDemand, SocioEconomicResilience]),
                ("S6", vec![SocioEconomicResilience]),
                ("S5", vec![BalancedProfile]),
            ]
        );
    }

    #[test]
    fn test_rank_drops_unnamed_and_unscored() {
        let mut unnamed = SuburbRow::scored("gone", 0.99);
        unnamed.name = None;
        let mut unscored = SuburbRow::scored("Unscored", 0.0);
        unscored.score = None;
        let rows = vec![unnamed, unscored, SuburbRow::scored("Kept", 0.2)];
        let result = rank_opportunities(&rows, 20);
        assert_eq!(result.summary.count, 1);
        assert_eq!(result.opportunities[0].row.name.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_rank_empty() {
        let result = rank_opportunities(&[], 20);
        assert_eq!(result.summary, Summary::default());
        assert!(result.opportunities.is_empty());
    }

    #[test]
    fn test_filter_percent_and_fraction_agree() {
        let rows = vec![
            SuburbRow::scored("Low", 0.10),
            SuburbRow::scored("Mid", 0.15),
            SuburbRow::scored("High", 0.40),
        ];
        let percent = filter(&rows, &FilterQuery { min_score: Some(15.0), ..Default::default() });
        let fraction = filter(&rows, &FilterQuery { min_score: Some(0.15), ..Default::default() });
        assert_eq!(percent, fraction);
        let names: Vec<_> = percent.iter().map(|r| r.name.clone().unwrap_or_default()).collect();
        assert_eq!(names, vec!["High", "Mid"]);
    }

    #[test]
    fn test_filter_sorts_and_may_be_empty() {
        let rows = vec![
            row("Northbridge", 0.2, 400.0, 1000.0, 1500.0, false),
            row("North Haven", 0.6, 300.0, 950.0, 2500.0, false),
            row("Southport", 0.9, 500.0, 1050.0, 1800.0, false),
        ];
        let north = filter(&rows, &FilterQuery { name: Some("NORTH".into()), ..Default::default() });
        assert_eq!(north.len(), 2);
        assert_eq!(north[0].name.as_deref(), Some("North Haven"));

        let capped = filter(
            &rows,
            &FilterQuery { max_price: Some(2000.0), min_seifa: Some(1000.0), ..Default::default() },
        );
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].name.as_deref(), Some("Southport"));

        assert!(filter(&rows, &FilterQuery { name: Some("nowhere".into()), ..Default::default() }).is_empty());
    }

    #[test]
    fn test_filter_missing_values_count_as_zero() {
        let rows = vec![SuburbRow::scored("Bare", 0.5)];
        assert_eq!(filter(&rows, &FilterQuery { max_price: Some(100.0), ..Default::default() }).len(), 1);
        assert!(filter(&rows, &FilterQuery { min_seifa: Some(1.0), ..Default::default() }).is_empty());
    }
}
