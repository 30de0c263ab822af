use crate::Reference;
use crate::assign::RidRange;
use std::collections::BTreeSet;

const FALLBACK_RID: &str = "999";

/// Tracks which RIDs are taken during one assignment run.
///
/// `known` holds every RID already present in the bibliography, so fresh
/// RIDs never collide with an existing reference. `claimed` holds the RIDs
/// handed out in this run; a claimed RID is never handed out twice.
///
/// # Examples
///
/// ```
/// use biblink::{RidAllocator, RidRange};
///
/// let mut allocator = RidAllocator::with_known(["100", "101"]);
/// let range = Some(RidRange::new(100, 199));
///
/// assert_eq!(allocator.allocate(Some("101"), range).as_deref(), Some("101"));
/// assert_eq!(allocator.allocate(Some("101"), range).as_deref(), Some("102"));
/// assert_eq!(allocator.allocate(None, range).as_deref(), Some("103"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RidAllocator {
    known: BTreeSet<String>,
    claimed: BTreeSet<String>,
}

impl RidAllocator {
    /// Creates an allocator seeded with the RIDs of `references`.
    #[must_use]
    pub fn new(references: &[Reference]) -> Self {
        Self::with_known(references.iter().map(|reference| reference.rid.as_str()))
    }

    /// Creates an allocator seeded with `rids`.
    #[must_use]
    pub fn with_known<'a>(rids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            known: rids
                .into_iter()
                .filter(|rid| !rid.is_empty())
                .map(str::to_string)
                .collect(),
            claimed: BTreeSet::new(),
        }
    }

    pub fn is_claimed(&self, rid: &str) -> bool {
        self.claimed.contains(rid)
    }

    /// Returns true if `rid` can no longer be handed out as a fresh RID.
    pub fn is_taken(&self, rid: &str) -> bool {
        self.known.contains(rid) || self.claimed.contains(rid)
    }

    /// RIDs claimed so far, in ascending string order.
    pub fn claimed(&self) -> impl Iterator<Item = &str> {
        self.claimed.iter().map(String::as_str)
    }

    /// Picks and claims an RID.
    ///
    /// 1. `preferred`, if unclaimed and inside `range`
    /// 2. the lowest RID of `range` that is neither known nor claimed
    /// 3. `preferred` (or `"999"` when absent), if unclaimed
    ///
    /// Returns `None` when every option is already claimed.
    pub fn allocate(&mut self, preferred: Option<&str>, range: Option<RidRange>) -> Option<String> {
        let preferred = preferred.filter(|rid| !rid.is_empty());

        let in_range = |rid: &str| {
            range.is_some_and(|range| rid.parse::<u32>().is_ok_and(|n| range.contains(n)))
        };
        let own = preferred.filter(|&rid| !self.is_claimed(rid) && in_range(rid));
        if let Some(rid) = own {
            return Some(self.claim(rid));
        }

        let fresh = range
            .into_iter()
            .flat_map(|range| range.rids())
            .map(|n| n.to_string())
            .find(|rid| !self.is_taken(rid));
        if let Some(rid) = fresh {
            return Some(self.claim(&rid));
        }

        let fallback = preferred.unwrap_or(FALLBACK_RID);
        (!self.is_claimed(fallback)).then(|| self.claim(fallback))
    }

    fn claim(&mut self, rid: &str) -> String {
        self.claimed.insert(rid.to_string());
        rid.to_string()
    }
}
