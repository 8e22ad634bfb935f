//! Ordering stage
//!
//! Both orders are total: ties fall back to the upstream document order.
//!
//! Names are compared with the root-locale Unicode collation at secondary
//! strength, so accents are ordered with their base letter and case is
//! ignored.

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use tracing::warn;

use crate::models::{Channel, SortOrder};

pub struct OrderingStage {
    order: SortOrder,
    collator: Option<CollatorBorrowed<'static>>,
}

impl OrderingStage {
    pub fn new(order: SortOrder) -> Self {
        let collator = match order {
            SortOrder::Name => name_collator(),
            SortOrder::ChannelNumber => None,
        };
        Self { order, collator }
    }

    pub fn process(&self, channels: &mut [Channel]) {
        match (self.order, &self.collator) {
            (SortOrder::Name, Some(collator)) => channels.sort_by(|a, b| {
                collator
                    .compare(&a.name, &b.name)
                    .then(a.source_index.cmp(&b.source_index))
            }),
            (SortOrder::Name, None) => {
                channels.sort_by_cached_key(|c| (c.name.to_lowercase(), c.source_index))
            }
            (SortOrder::ChannelNumber, _) => {
                channels.sort_by_key(|c| (c.number.unwrap_or(0), c.source_index))
            }
        }
    }
}

fn name_collator() -> Option<CollatorBorrowed<'static>> {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            warn!("Name collation unavailable, ordering by lowercase name: {}", e);
            None
        }
    }
}
