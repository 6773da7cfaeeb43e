// src/service/price_ranges.rs
use serde::{Deserialize, Serialize};

use crate::utils::currency::{format_inr_compact, CRORE, LAKH};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PriceRange {
    pub label: String,
    pub min: i64,
    pub max: i64,
}

impl PriceRange {
    fn new(min: i64, max: i64) -> Self {
        Self {
            label: format!("{} - {}", format_inr_compact(min), format_inr_compact(max)),
            min,
            max,
        }
    }
}

#[derive(Clone, Copy)]
enum End {
    /// Last bucket starts below this value.
    Before(i64),
    /// Last bucket starts at or below this value, so it may overflow it.
    Through(i64),
}

/// Upper bound on buckets. Past it the remainder collapses into one bucket
/// ending at `max_price`.
pub const MAX_PRICE_BUCKETS: usize = 60;

fn push_steps(ranges: &mut Vec<PriceRange>, start: i64, end: End, step: i64) {
    let mut lower = start;
    loop {
        let keep_going = match end {
            End::Before(limit) => lower < limit,
            End::Through(limit) => lower <= limit,
        };
        if !keep_going {
            break;
        }
        let next = lower.checked_add(step);
        if let End::Through(limit) = end {
            let at_cap = ranges.len() + 1 >= MAX_PRICE_BUCKETS;
            if next.map_or(true, |n| at_cap && n <= limit) {
                ranges.push(PriceRange::new(lower, limit));
                break;
            }
        }
        let Some(next) = next else {
            break;
        };
        ranges.push(PriceRange::new(lower, next));
        lower = next;
    }
}

/// Buckets `[0, max_price]` for the price filter dropdown: fine steps at the
/// low end, coarser ones as prices grow.
///
/// * up to 20L: 2L steps throughout
/// * up to 50L: 2L steps to 20L, then 5L steps
/// * beyond: 5L steps to 50L, 25L steps to 2Cr, then 50L steps
///
/// Buckets are contiguous and ascending; the last one may extend past
/// `max_price` by less than one step. At most `MAX_PRICE_BUCKETS` are
/// returned.
pub fn build_price_ranges(max_price: i64) -> Vec<PriceRange> {
    let max_price = max_price.max(0);
    let mut ranges = Vec::new();

    if max_price <= 20 * LAKH {
        push_steps(&mut ranges, 0, End::Through(max_price), 2 * LAKH);
    } else if max_price <= 50 * LAKH {
        push_steps(&mut ranges, 0, End::Before(20 * LAKH), 2 * LAKH);
        push_steps(&mut ranges, 20 * LAKH, End::Through(max_price), 5 * LAKH);
    } else {
        push_steps(&mut ranges, 0, End::Before(20 * LAKH), 5 * LAKH);
        push_steps(&mut ranges, 20 * LAKH, End::Before(50 * LAKH), 5 * LAKH);
        if max_price <= 2 * CRORE {
            push_steps(&mut ranges, 50 * LAKH, End::Through(max_price), 25 * LAKH);
        } else {
            push_steps(&mut ranges, 50 * LAKH, End::Before(2 * CRORE), 25 * LAKH);
            push_steps(&mut ranges, 2 * CRORE, End::Through(max_price), 50 * LAKH);
        }
    }

    ranges
}
