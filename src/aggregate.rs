use crate::data::Record;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Sum of a value over every record sharing one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

/// Sum `value` per distinct `key`, sorted by total descending.
///
/// Groups are accumulated in first-seen order and then stable-sorted, so equal
/// totals keep the order their keys first appeared in. Zero totals are kept.
pub fn group_sum<'a, I, K, V>(records: I, key: K, value: V) -> Vec<GroupTotal>
where
    I: IntoIterator<Item = &'a Record>,
    K: Fn(&'a Record) -> &'a str,
    V: Fn(&Record) -> f64,
{
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<GroupTotal> = Vec::new();

    for record in records {
        let k = key(record);
        let idx = *slots.entry(k).or_insert_with(|| {
            totals.push(GroupTotal {
                key: k.to_string(),
                total: 0.0,
            });
            totals.len() - 1
        });
        totals[idx].total += value(record);
    }

    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

/// A descending ranking of group totals along one dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    totals: Vec<GroupTotal>,
}

impl Ranking {
    pub fn new<'a, I, K, V>(records: I, key: K, value: V) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
        K: Fn(&'a Record) -> &'a str,
        V: Fn(&Record) -> f64,
    {
        Self {
            totals: group_sum(records, key, value),
        }
    }

    /// Rank platforms by summed `global_sales`.
    pub fn platforms_by_global_sales<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        Self::new(records, |r| r.platform.as_str(), |r| r.global_sales)
    }

    /// Rank genres by summed `global_sales`.
    pub fn genres_by_global_sales<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        Self::new(records, |r| r.genre.as_str(), |r| r.global_sales)
    }

    pub fn totals(&self) -> &[GroupTotal] {
        &self.totals
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// The `n` highest-ranked keys. Asking for more than exist yields them all.
    pub fn top(&self, n: usize) -> TopSet {
        let keys = self
            .totals
            .iter()
            .take(n)
            .map(|g| g.key.clone())
            .collect();
        TopSet { n, keys }
    }
}

/// Membership set of the top-N keys of a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct TopSet {
    n: usize,
    keys: HashSet<String>,
}

impl TopSet {
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// The N this set was cut at; `len()` is smaller when the ranking was short.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn is_subset(&self, other: &TopSet) -> bool {
        self.keys.is_subset(&other.keys)
    }
}
