use crate::data::{Record, SalesRegion};
use crate::ir::{ChartKind, ChartSize, ChartSpec, DataValues, EncodingPlan, GenreComparison};
use std::collections::HashMap;

/// Assemble a chart descriptor from a kind, its data and an encoding plan.
///
/// Plans are built by code, not users, so a plan that does not fit its kind is
/// a bug and only checked in debug builds.
pub fn build_spec<'a>(
    kind: ChartKind,
    title: impl Into<String>,
    data: DataValues<'a>,
    encoding: EncodingPlan,
    size: ChartSize,
    schema: &str,
) -> ChartSpec<'a> {
    debug_assert!(
        encoding.x.is_some() && encoding.y.is_some(),
        "every chart kind needs both positional channels"
    );
    match kind {
        ChartKind::Heatmap => debug_assert!(encoding.color.is_some(), "heatmap needs a color channel"),
        ChartKind::StackedBar => debug_assert!(encoding.color.is_some(), "stacked bar needs a color channel"),
        ChartKind::FacetedBar => debug_assert!(encoding.column.is_some(), "faceted bar needs a column channel"),
        ChartKind::Bar | ChartKind::Line | ChartKind::Scatter => {}
    }

    let title = title.into();
    tracing::debug!(?kind, title = %title, rows = data.len(), "built chart spec");

    ChartSpec {
        kind,
        schema: schema.to_string(),
        title,
        data,
        encoding,
        size,
    }
}

/// One row per genre with its summed NA and JP `sales_amount`.
///
/// Rows come out in the order genres are first met. Records from other regions
/// still create their genre row but add nothing to either total.
pub fn genre_comparison<'a, I>(records: I) -> Vec<GenreComparison>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut rows: Vec<GenreComparison> = Vec::new();

    for record in records {
        let genre = record.genre.as_str();
        let idx = *slots.entry(genre).or_insert_with(|| {
            rows.push(GenreComparison {
                genre: genre.to_string(),
                na_total: 0.0,
                jp_total: 0.0,
            });
            rows.len() - 1
        });

        match record.sales_region {
            SalesRegion::NorthAmerica => rows[idx].na_total += record.sales_amount,
            SalesRegion::Japan => rows[idx].jp_total += record.sales_amount,
            _ => {}
        }
    }

    rows
}
