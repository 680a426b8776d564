// Builds the fixed chart set from a loaded dataset

use crate::aggregate::{Ranking, TopSet};
use crate::compiler::{build_spec, genre_comparison};
use crate::data::{Dataset, Record, SalesRegion};
use crate::filter::{both, genre_in, platform_in, region_in, restrict};
use crate::ir::{
    Channel, ChartKind, ChartSize, ChartSpec, DataValues, EncodingPlan, FieldDef, Sort, Width,
};
use crate::preprocessor::expand_variables;
use crate::ReportOptions;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;

pub const CHART_IDS: [&str; 8] = ["1a", "1b", "2a", "2b", "3a", "3b", "4a", "4b"];

const NA_JP: [SalesRegion; 2] = [SalesRegion::NorthAmerica, SalesRegion::Japan];

/// One chart of the report and the container it is meant for
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry<'a> {
    pub id: &'static str,
    pub container: String,
    pub spec: ChartSpec<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report<'a> {
    pub charts: Vec<ChartEntry<'a>>,
}

impl<'a> Report<'a> {
    /// Keep only the listed charts, in report order.
    pub fn select(mut self, ids: &[String]) -> Result<Self> {
        for id in ids {
            if !CHART_IDS.contains(&id.as_str()) {
                bail!(
                    "Unknown chart '{}' (expected one of {})",
                    id,
                    CHART_IDS.join(", ")
                );
            }
        }
        self.charts.retain(|c| ids.iter().any(|id| id == c.id));
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<&ChartEntry<'a>> {
        self.charts.iter().find(|c| c.id == id)
    }
}

/// Rankings and top sets shared by every chart of one report.
///
/// Computed exactly once so all "top N" charts agree on membership.
#[derive(Debug, Clone)]
pub struct SharedSets {
    pub platform_ranking: Ranking,
    pub genre_ranking: Ranking,
    pub top_platforms: TopSet,
    pub top_line_platforms: TopSet,
    pub top_genres: TopSet,
}

impl SharedSets {
    pub fn compute(dataset: &Dataset, options: &ReportOptions) -> Self {
        let platform_ranking = Ranking::platforms_by_global_sales(dataset);
        let genre_ranking = Ranking::genres_by_global_sales(dataset);
        let top_platforms = platform_ranking.top(options.top_platforms);
        let top_line_platforms = platform_ranking.top(options.top_line_platforms);
        let top_genres = genre_ranking.top(options.top_genres);

        tracing::info!(
            platforms = platform_ranking.len(),
            genres = genre_ranking.len(),
            "ranked platforms and genres by global sales"
        );

        Self {
            platform_ranking,
            genre_ranking,
            top_platforms,
            top_line_platforms,
            top_genres,
        }
    }
}

fn sum_global_sales() -> FieldDef {
    FieldDef::quantitative("global_sales").sum()
}

fn sum_sales_amount() -> FieldDef {
    FieldDef::quantitative("sales_amount").sum()
}

struct Builder<'a, 'o> {
    options: &'o ReportOptions,
    variables: HashMap<&'static str, String>,
    charts: Vec<ChartEntry<'a>>,
}

impl<'a, 'o> Builder<'a, 'o> {
    // Titles describe the sets the charts were filtered by.
    fn new(options: &'o ReportOptions, sets: &SharedSets) -> Self {
        let mut variables = HashMap::new();
        variables.insert("top_platforms", sets.top_platforms.n().to_string());
        variables.insert("top_genres", sets.top_genres.n().to_string());
        variables.insert("top_line_platforms", sets.top_line_platforms.n().to_string());
        Self {
            options,
            variables,
            charts: Vec::new(),
        }
    }

    fn full_width(&self) -> ChartSize {
        ChartSize {
            width: self.options.width.map_or(Width::Container, Width::Fixed),
            height: self.options.height,
        }
    }

    fn facet_width(&self) -> ChartSize {
        ChartSize {
            width: Width::Fixed(self.options.facet_width),
            height: self.options.height,
        }
    }

    fn push(
        &mut self,
        id: &'static str,
        kind: ChartKind,
        title: &str,
        data: DataValues<'a>,
        encoding: EncodingPlan,
        size: ChartSize,
    ) -> Result<()> {
        let title = expand_variables(title, &self.variables)
            .with_context(|| format!("Failed to expand title of chart {}", id))?;
        let spec = build_spec(kind, title, data, encoding, size, &self.options.schema);
        self.charts.push(ChartEntry {
            id,
            container: format!("#view{}", id),
            spec,
        });
        Ok(())
    }
}

/// Run aggregation, filtering and spec building over the whole dataset.
pub fn build_report<'a>(dataset: &'a Dataset, options: &ReportOptions) -> Result<Report<'a>> {
    let sets = SharedSets::compute(dataset, options);
    build_report_with(dataset, &sets, options)
}

/// Same as [`build_report`] but reusing precomputed top sets.
pub fn build_report_with<'a>(
    dataset: &'a Dataset,
    sets: &SharedSets,
    options: &ReportOptions,
) -> Result<Report<'a>> {
    let all: Vec<&'a Record> = dataset.iter().collect();
    let top_platform_rows = restrict(dataset, platform_in(&sets.top_platforms));
    let heatmap_rows = restrict(
        dataset,
        both(platform_in(&sets.top_platforms), genre_in(&sets.top_genres)),
    );
    let top_line_rows = restrict(dataset, platform_in(&sets.top_line_platforms));
    let top_platform_na_jp = restrict(top_platform_rows.iter().copied(), region_in(&NA_JP));
    let na_jp_rows = restrict(dataset, region_in(&NA_JP));
    let genre_rows = genre_comparison(na_jp_rows.iter().copied());

    let mut b = Builder::new(options, sets);
    let full = b.full_width();
    let faceted = b.facet_width();

    b.push(
        "1a",
        ChartKind::Bar,
        "1A - Total Global Sales by Platform (Top $top_platforms)",
        DataValues::Records(top_platform_rows.clone()),
        EncodingPlan {
            y: Some(
                FieldDef::nominal("platform")
                    .sort(Sort::descending_by(Channel::X))
                    .title("Platform"),
            ),
            x: Some(sum_global_sales().title("Total Global Sales (millions)")),
            tooltip: vec![
                FieldDef::nominal("platform").title("Platform"),
                sum_global_sales().title("Total Global Sales"),
            ],
            ..Default::default()
        },
        full,
    )?;

    b.push(
        "1b",
        ChartKind::Heatmap,
        "1B - Global Sales by Platform and Genre (Top $top_platforms × Top $top_genres)",
        DataValues::Records(heatmap_rows),
        EncodingPlan {
            x: Some(FieldDef::nominal("platform").title("Platform")),
            y: Some(FieldDef::nominal("genre").title("Genre")),
            color: Some(sum_global_sales().title("Total Global Sales (millions)")),
            tooltip: vec![
                FieldDef::nominal("platform"),
                FieldDef::nominal("genre"),
                sum_global_sales().title("Total Global Sales"),
            ],
            ..Default::default()
        },
        full,
    )?;

    b.push(
        "2a",
        ChartKind::Line,
        "2A - Total Global Sales Over Time",
        DataValues::Records(all),
        EncodingPlan {
            x: Some(FieldDef::quantitative("year").title("Year")),
            y: Some(sum_global_sales().title("Total Global Sales (millions)")),
            tooltip: vec![
                FieldDef::quantitative("year").title("Year"),
                sum_global_sales().title("Total Global Sales"),
            ],
            ..Default::default()
        },
        full,
    )?;

    b.push(
        "2b",
        ChartKind::Line,
        "2B - Global Sales Over Time by Platform (Top $top_line_platforms)",
        DataValues::Records(top_line_rows),
        EncodingPlan {
            x: Some(FieldDef::quantitative("year").title("Year")),
            y: Some(sum_global_sales().title("Total Global Sales (millions)")),
            color: Some(FieldDef::nominal("platform").title("Platform")),
            tooltip: vec![
                FieldDef::nominal("platform"),
                FieldDef::quantitative("year").title("Year"),
                sum_global_sales().title("Total Global Sales"),
            ],
            ..Default::default()
        },
        full,
    )?;

    b.push(
        "3a",
        ChartKind::StackedBar,
        "3A - Regional Sales by Platform (Top $top_platforms Platforms)",
        DataValues::Records(top_platform_rows),
        EncodingPlan {
            x: Some(
                FieldDef::nominal("platform")
                    .sort(Sort::descending_by(Channel::Y))
                    .title("Platform"),
            ),
            y: Some(sum_sales_amount().title("Total Regional Sales (millions)")),
            color: Some(FieldDef::nominal("sales_region").title("Region")),
            tooltip: vec![
                FieldDef::nominal("platform"),
                FieldDef::nominal("sales_region").title("Region"),
                sum_sales_amount().title("Total Sales"),
            ],
            ..Default::default()
        },
        full,
    )?;

    b.push(
        "3b",
        ChartKind::FacetedBar,
        "3B - Platform Popularity: North America vs Japan (Top $top_platforms Platforms)",
        DataValues::Records(top_platform_na_jp),
        EncodingPlan {
            y: Some(
                FieldDef::nominal("platform")
                    .sort(Sort::descending_by(Channel::X))
                    .title("Platform"),
            ),
            x: Some(sum_sales_amount().title("Total Sales (millions)")),
            column: Some(FieldDef::nominal("sales_region").title("Region")),
            tooltip: vec![
                FieldDef::nominal("sales_region").title("Region"),
                FieldDef::nominal("platform"),
                sum_sales_amount().title("Total Sales"),
            ],
            ..Default::default()
        },
        faceted,
    )?;

    b.push(
        "4a",
        ChartKind::FacetedBar,
        "4A - Visual Story: Genre Sales in North America vs Japan",
        DataValues::Records(na_jp_rows),
        EncodingPlan {
            y: Some(
                FieldDef::nominal("genre")
                    .sort(Sort::descending_by(Channel::X))
                    .title("Genre"),
            ),
            x: Some(sum_sales_amount().title("Total Sales (millions)")),
            column: Some(FieldDef::nominal("sales_region").title("Region")),
            tooltip: vec![
                FieldDef::nominal("sales_region").title("Region"),
                FieldDef::nominal("genre"),
                sum_sales_amount().title("Total Sales"),
            ],
            ..Default::default()
        },
        faceted,
    )?;

    b.push(
        "4b",
        ChartKind::Scatter,
        "4B - Visual Story: Genres (NA vs JP) as a Scatterplot",
        DataValues::GenreComparison(genre_rows),
        EncodingPlan {
            x: Some(FieldDef::quantitative("na_total").title("Total NA Sales (millions)")),
            y: Some(FieldDef::quantitative("jp_total").title("Total JP Sales (millions)")),
            tooltip: vec![
                FieldDef::nominal("genre").title("Genre"),
                FieldDef::quantitative("na_total").title("NA Total"),
                FieldDef::quantitative("jp_total").title("JP Total"),
            ],
            ..Default::default()
        },
        full,
    )?;

    Ok(Report { charts: b.charts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::GenreComparison;
    use serde_json::json;

    fn rec(platform: &str, genre: &str, year: i32, global: f64, region: SalesRegion, amount: f64) -> Record {
        Record {
            platform: platform.to_string(),
            genre: genre.to_string(),
            year,
            global_sales: global,
            sales_region: region,
            sales_amount: amount,
        }
    }

    fn sample() -> Dataset {
        let mut rows = Vec::new();
        // Three platforms, two regions each. Global sales repeat per region row.
        for (platform, genre, global, na, jp) in [
            ("Wii", "Sports", 8.0, 4.0, 1.0),
            ("DS", "Puzzle", 6.0, 1.0, 3.0),
            ("PSP", "Action", 2.0, 0.5, 1.0),
        ] {
            rows.push(rec(platform, genre, 2008, global, SalesRegion::NorthAmerica, na));
            rows.push(rec(platform, genre, 2008, global, SalesRegion::Japan, jp));
            rows.push(rec(platform, genre, 2009, global, SalesRegion::Europe, 1.0));
        }
        Dataset::new(rows)
    }

    fn small_options() -> ReportOptions {
        ReportOptions {
            top_platforms: 2,
            top_genres: 2,
            top_line_platforms: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_report_has_every_chart_in_order() {
        let dataset = sample();
        let report = build_report(&dataset, &ReportOptions::default()).unwrap();
        let ids: Vec<&str> = report.charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, CHART_IDS.to_vec());
        assert_eq!(report.charts[0].container, "#view1a");
    }

    #[test]
    fn test_top_platform_charts_share_membership() {
        let dataset = sample();
        let report = build_report(&dataset, &small_options()).unwrap();

        for id in ["1a", "3a", "3b"] {
            let DataValues::Records(rows) = &report.get(id).unwrap().spec.data else {
                panic!("chart {} should carry records", id);
            };
            assert!(rows.iter().all(|r| r.platform == "Wii" || r.platform == "DS"), "chart {}", id);
        }
        assert_eq!(report.get("1a").unwrap().spec.data.len(), 6);
        assert_eq!(report.get("3b").unwrap().spec.data.len(), 4);
    }

    #[test]
    fn test_heatmap_requires_both_memberships() {
        let dataset = Dataset::new(vec![
            rec("Wii", "Sports", 2008, 9.0, SalesRegion::NorthAmerica, 1.0),
            rec("Wii", "Racing", 2008, 1.0, SalesRegion::NorthAmerica, 1.0),
            rec("PS3", "Racing", 2008, 7.0, SalesRegion::NorthAmerica, 1.0),
        ]);
        let options = ReportOptions {
            top_platforms: 1,
            top_genres: 1,
            ..Default::default()
        };
        let report = build_report(&dataset, &options).unwrap();
        let DataValues::Records(rows) = &report.get("1b").unwrap().spec.data else {
            panic!("heatmap should carry records");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].genre, "Sports");
    }

    #[test]
    fn test_line_chart_uses_smaller_top_set() {
        let dataset = sample();
        let report = build_report(&dataset, &small_options()).unwrap();
        let DataValues::Records(rows) = &report.get("2b").unwrap().spec.data else {
            panic!("line chart should carry records");
        };
        assert!(rows.iter().all(|r| r.platform == "Wii"));
        assert_eq!(report.get("2a").unwrap().spec.data.len(), dataset.len());
    }

    #[test]
    fn test_genre_scatter_table() {
        let dataset = sample();
        let report = build_report(&dataset, &ReportOptions::default()).unwrap();
        let spec = &report.get("4b").unwrap().spec;
        assert_eq!(
            spec.data,
            DataValues::GenreComparison(vec![
                GenreComparison { genre: "Sports".into(), na_total: 4.0, jp_total: 1.0 },
                GenreComparison { genre: "Puzzle".into(), na_total: 1.0, jp_total: 3.0 },
                GenreComparison { genre: "Action".into(), na_total: 0.5, jp_total: 1.0 },
            ])
        );
        assert_eq!(spec.kind, ChartKind::Scatter);
    }

    #[test]
    fn test_titles_are_expanded() {
        let dataset = sample();
        let report = build_report(&dataset, &small_options()).unwrap();
        assert_eq!(
            report.get("1b").unwrap().spec.title,
            "1B - Global Sales by Platform and Genre (Top 2 × Top 2)"
        );
        assert_eq!(
            report.get("2b").unwrap().spec.title,
            "2B - Global Sales Over Time by Platform (Top 1)"
        );
    }

    #[test]
    fn test_faceted_charts_use_fixed_width() {
        let dataset = sample();
        let report = build_report(&dataset, &ReportOptions::default()).unwrap();
        let doc = serde_json::to_value(&report.get("3b").unwrap().spec).unwrap();
        assert_eq!(doc["width"], json!(360));
        assert_eq!(doc["encoding"]["column"]["field"], json!("sales_region"));
        assert_eq!(doc["encoding"]["y"]["sort"], json!("-x"));

        let doc = serde_json::to_value(&report.get("3a").unwrap().spec).unwrap();
        assert_eq!(doc["width"], json!("container"));
        assert_eq!(doc["encoding"]["x"]["sort"], json!("-y"));
    }

    #[test]
    fn test_width_option_sets_unfaceted_charts() {
        let dataset = sample();
        let options = ReportOptions::from_json_str(r#"{"width": 600}"#).unwrap();
        let report = build_report(&dataset, &options).unwrap();

        for id in ["1a", "1b", "2a", "2b", "3a", "4b"] {
            let doc = serde_json::to_value(&report.get(id).unwrap().spec).unwrap();
            assert_eq!(doc["width"], json!(600), "chart {}", id);
        }
        let doc = serde_json::to_value(&report.get("3b").unwrap().spec).unwrap();
        assert_eq!(doc["width"], json!(360));
    }

    #[test]
    fn test_titles_follow_precomputed_sets() {
        let dataset = sample();
        let sets = SharedSets::compute(&dataset, &small_options());
        let report = build_report_with(&dataset, &sets, &ReportOptions::default()).unwrap();
        assert_eq!(
            report.get("1a").unwrap().spec.title,
            "1A - Total Global Sales by Platform (Top 2)"
        );
        assert_eq!(
            report.get("2b").unwrap().spec.title,
            "2B - Global Sales Over Time by Platform (Top 1)"
        );
        assert_eq!(report.get("1a").unwrap().spec.data.len(), 6);
    }

    #[test]
    fn test_empty_dataset_yields_empty_charts() {
        let dataset = Dataset::default();
        let sets = SharedSets::compute(&dataset, &ReportOptions::default());
        assert!(sets.platform_ranking.is_empty());
        assert!(sets.genre_ranking.is_empty());

        let report = build_report_with(&dataset, &sets, &ReportOptions::default()).unwrap();
        assert_eq!(report.charts.len(), CHART_IDS.len());
        assert!(report.charts.iter().all(|c| c.spec.data.is_empty()));
    }

    #[test]
    fn test_select_keeps_report_order() {
        let dataset = sample();
        let report = build_report(&dataset, &ReportOptions::default())
            .unwrap()
            .select(&["4b".to_string(), "1a".to_string()])
            .unwrap();
        let ids: Vec<&str> = report.charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1a", "4b"]);
    }

    #[test]
    fn test_select_unknown_chart() {
        let dataset = sample();
        let report = build_report(&dataset, &ReportOptions::default()).unwrap();
        assert!(report.select(&["9z".to_string()]).is_err());
    }
}
