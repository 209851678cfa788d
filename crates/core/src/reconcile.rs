//! Missing-range computation against cache coverage.
//!
//! Given a requested `[start, end]` window and the coverage of a prior
//! cache, [`reconcile`] computes the 0-2 sub-ranges that actually need a
//! network fetch. Ranges are inclusive on both ends and bounded one
//! interval delta away from the cache edge so they never re-request bars
//! the cache already holds.

use std::fmt;

use crate::table::CacheMetadata;

/// Where a fetch range lies relative to the cache's covered span.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Anchor {
    /// The gap before `covered_start`.
    BeforeCache,
    /// The gap after `covered_end`.
    AfterCache,
    /// The whole requested window (no usable cache coverage).
    Full,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::BeforeCache => write!(f, "before-cache"),
            Anchor::AfterCache => write!(f, "after-cache"),
            Anchor::Full => write!(f, "full"),
        }
    }
}

/// One sub-range to fetch from the provider.
///
/// Created per reconciliation call and discarded once its fetch completes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FetchRange {
    /// Start timestamp, epoch ms (inclusive).
    pub start: i64,
    /// End timestamp, epoch ms (inclusive).
    pub end: i64,
    /// Position relative to cache coverage.
    pub anchor: Anchor,
}

/// Compute the missing sub-ranges for a requested window.
///
/// # Arguments
///
/// * `start` / `end` - Requested window, epoch ms, inclusive
/// * `cache_meta` - Coverage of the loaded cache, if any
/// * `delta_ms` - Duration of one bar in ms; `None` (or non-positive)
///   means the gap cannot be bounded precisely
///
/// # Behavior
///
/// - No cache: one `Full` range covering the whole request.
/// - Request starts before coverage: a `BeforeCache` range ending one
///   delta before `covered_start`, included only if the gap has at least
///   one bar's worth of room.
/// - Request ends after coverage: an `AfterCache` range starting one
///   delta after `covered_end`, same room rule.
/// - Request inside coverage: empty vector, no network call needed.
/// - Unknown delta: the gap cannot be bounded, so the entire request is
///   treated as missing (`Full`) and the merger's dedup absorbs any
///   overlap with the cache. Conservative, not silent data loss.
pub fn reconcile(
    start: i64,
    end: i64,
    cache_meta: Option<&CacheMetadata>,
    delta_ms: Option<i64>,
) -> Vec<FetchRange> {
    let meta = match cache_meta {
        Some(meta) => meta,
        None => {
            return vec![FetchRange {
                start,
                end,
                anchor: Anchor::Full,
            }]
        }
    };

    let delta = match delta_ms {
        Some(delta) if delta > 0 => delta,
        _ => {
            log::warn!(
                "Unknown interval delta for {}; refetching the full requested range",
                meta.source_key
            );
            return vec![FetchRange {
                start,
                end,
                anchor: Anchor::Full,
            }];
        }
    };

    let mut ranges = Vec::with_capacity(2);

    if start < meta.covered_start {
        let candidate_end = meta.covered_start - delta;
        if candidate_end >= start {
            ranges.push(FetchRange {
                start,
                end: candidate_end,
                anchor: Anchor::BeforeCache,
            });
        }
    }

    if end > meta.covered_end {
        let candidate_start = meta.covered_end + delta;
        if candidate_start <= end {
            ranges.push(FetchRange {
                start: candidate_start,
                end,
                anchor: Anchor::AfterCache,
            });
        }
    }

    ranges
}
