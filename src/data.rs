use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Region a `sales_amount` figure belongs to.
///
/// Unknown labels are kept verbatim so a dataset with extra regions still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SalesRegion {
    NorthAmerica,
    Japan,
    Europe,
    Rest,
    Other(String),
}

impl SalesRegion {
    pub fn as_str(&self) -> &str {
        match self {
            SalesRegion::NorthAmerica => "na_sales",
            SalesRegion::Japan => "jp_sales",
            SalesRegion::Europe => "eu_sales",
            SalesRegion::Rest => "other_sales",
            SalesRegion::Other(label) => label,
        }
    }
}

impl From<String> for SalesRegion {
    fn from(label: String) -> Self {
        match label.trim() {
            "na_sales" => SalesRegion::NorthAmerica,
            "jp_sales" => SalesRegion::Japan,
            "eu_sales" => SalesRegion::Europe,
            "other_sales" => SalesRegion::Rest,
            other => SalesRegion::Other(other.to_string()),
        }
    }
}

impl From<SalesRegion> for String {
    fn from(region: SalesRegion) -> Self {
        region.as_str().to_string()
    }
}

impl fmt::Display for SalesRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the long-format sales table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub platform: String,
    pub genre: String,
    pub year: i32,
    #[serde(deserialize_with = "finite")]
    pub global_sales: f64,
    pub sales_region: SalesRegion,
    #[serde(deserialize_with = "finite")]
    pub sales_amount: f64,
}

// `f64::from_str` accepts NaN and inf; a sales figure never is.
fn finite<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!("sales value must be finite, got {}", value)))
    }
}

/// The loaded table. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Create a Dataset from a JSON array of objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut records = Vec::with_capacity(array.len());
        for (idx, item) in array.iter().enumerate() {
            if !item.is_object() {
                return Err(anyhow!("Item {} in array must be an object", idx + 1));
            }
            let record = Record::deserialize(item)
                .with_context(|| format!("Invalid record at item {}", idx + 1))?;
            records.push(record);
        }

        Ok(Self { records })
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
