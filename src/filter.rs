use crate::aggregate::TopSet;
use crate::data::{Record, SalesRegion};

/// Keep the records matching `predicate`, in their original order.
pub fn restrict<'a, I, P>(records: I, predicate: P) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
    P: Fn(&Record) -> bool,
{
    records.into_iter().filter(|r| predicate(*r)).collect()
}

pub fn platform_in(top: &TopSet) -> impl Fn(&Record) -> bool + '_ {
    move |r| top.contains(&r.platform)
}

pub fn genre_in(top: &TopSet) -> impl Fn(&Record) -> bool + '_ {
    move |r| top.contains(&r.genre)
}

pub fn region_in(regions: &[SalesRegion]) -> impl Fn(&Record) -> bool + '_ {
    move |r| regions.contains(&r.sales_region)
}

/// Both predicates must hold.
pub fn both<P, Q>(p: P, q: Q) -> impl Fn(&Record) -> bool
where
    P: Fn(&Record) -> bool,
    Q: Fn(&Record) -> bool,
{
    move |r| p(r) && q(r)
}
