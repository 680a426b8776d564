use crate::data::Record;
use serde::{Serialize, Serializer};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

// =============================================================================
// Encoding plan
// =============================================================================

/// Semantic type of a mapped field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Nominal,
    Quantitative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Sum,
}

/// Positional channels a sort can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    X,
    Y,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
        }
    }
}

/// Orders categories by the value on another channel, largest first (`-x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    channel: Channel,
}

impl Sort {
    pub fn descending_by(channel: Channel) -> Self {
        Sort { channel }
    }
}

impl Serialize for Sort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("-{}", self.channel.as_str()))
    }
}

/// One field mapped onto a channel (or listed in the tooltip)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl FieldDef {
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            aggregate: None,
            field: field.into(),
            field_type,
            sort: None,
            title: None,
        }
    }

    pub fn nominal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Nominal)
    }

    pub fn quantitative(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Quantitative)
    }

    pub fn sum(mut self) -> Self {
        self.aggregate = Some(Aggregate::Sum);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Channel → field assignments for one chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodingPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<FieldDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<FieldDef>,
}

// =============================================================================
// Chart descriptor
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Heatmap,
    Line,
    StackedBar,
    FacetedBar,
    Scatter,
}

impl ChartKind {
    pub fn mark(&self) -> Mark {
        match self {
            ChartKind::Bar | ChartKind::StackedBar | ChartKind::FacetedBar => Mark::Simple("bar"),
            ChartKind::Heatmap => Mark::Simple("rect"),
            ChartKind::Line => Mark::Simple("line"),
            ChartKind::Scatter => Mark::Styled {
                mark_type: "point",
                filled: true,
                size: 80.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Mark {
    Simple(&'static str),
    Styled {
        #[serde(rename = "type")]
        mark_type: &'static str,
        filled: bool,
        size: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// Fill the renderer's container
    Container,
    Fixed(u32),
}

impl Serialize for Width {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Width::Container => serializer.serialize_str("container"),
            Width::Fixed(px) => serializer.serialize_u32(*px),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: Width,
    pub height: u32,
}

/// Per-genre NA vs JP totals, the input of the genre scatter plot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreComparison {
    pub genre: String,
    pub na_total: f64,
    pub jp_total: f64,
}

/// Rows a chart is drawn against
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValues<'a> {
    Records(Vec<&'a Record>),
    GenreComparison(Vec<GenreComparison>),
}

impl DataValues<'_> {
    pub fn len(&self) -> usize {
        match self {
            DataValues::Records(rows) => rows.len(),
            DataValues::GenreComparison(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete, immutable chart descriptor. Serializes to a Vega-Lite document.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec<'a> {
    pub kind: ChartKind,
    pub schema: String,
    pub title: String,
    pub data: DataValues<'a>,
    pub encoding: EncodingPlan,
    pub size: ChartSize,
}

#[derive(Serialize)]
struct VegaLiteDocument<'s, 'a> {
    #[serde(rename = "$schema")]
    schema: &'s str,
    title: &'s str,
    data: InlineData<'s, 'a>,
    mark: Mark,
    encoding: &'s EncodingPlan,
    width: Width,
    height: u32,
}

#[derive(Serialize)]
struct InlineData<'s, 'a> {
    values: &'s DataValues<'a>,
}

impl Serialize for ChartSpec<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        VegaLiteDocument {
            schema: &self.schema,
            title: &self.title,
            data: InlineData { values: &self.data },
            mark: self.kind.mark(),
            encoding: &self.encoding,
            width: self.size.width,
            height: self.size.height,
        }
        .serialize(serializer)
    }
}
