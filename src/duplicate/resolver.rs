//! Ranking of duplicate groups
//!
//! Earlier passes over the same collections disagreed on how to pick the
//! canonical copy; this module is the single authority now. Members are
//! ranked by pixel area descending, ties broken by discovery order
//! ascending, and rank 1 is the canonical copy. When every member has the
//! same area the ranking degenerates to discovery order alone.

use crate::duplicate::index::{FingerprintGroup, ImageRecord};

/// A group member with its 1-based rank. Rank 1 is canonical.
#[derive(Debug, Clone)]
pub struct RankedMember {
    pub record: ImageRecord,
    pub rank: usize,
}

impl RankedMember {
    pub fn is_canonical(&self) -> bool {
        self.rank == 1
    }
}

/// Rank the members of one duplicate group.
///
/// Sort key: `width * height` descending, then `discovery_order` ascending
/// (earliest seen wins the lower rank). The returned sequence is in rank
/// order starting at 1.
pub fn rank(group: FingerprintGroup) -> Vec<RankedMember> {
    let mut members = group.members;
    members.sort_by(|a, b| {
        b.area()
            .cmp(&a.area())
            .then(a.discovery_order.cmp(&b.discovery_order))
    });

    members
        .into_iter()
        .enumerate()
        .map(|(i, record)| RankedMember {
            record,
            rank: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(name: &str, width: u32, height: u32, order: usize) -> ImageRecord {
        ImageRecord {
            path: PathBuf::from(name),
            fingerprint: 42,
            width,
            height,
            discovery_order: order,
        }
    }

    fn group(members: Vec<ImageRecord>) -> FingerprintGroup {
        FingerprintGroup {
            fingerprint: 42,
            members,
        }
    }

    #[test]
    fn test_highest_area_is_canonical() {
        let ranked = rank(group(vec![
            record("small.jpg", 640, 480, 0),
            record("large.jpg", 1920, 1080, 1),
            record("medium.jpg", 1024, 768, 2),
        ]));

        let names: Vec<_> = ranked
            .iter()
            .map(|m| m.record.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["large.jpg", "medium.jpg", "small.jpg"]);
        assert_eq!(ranked[0].rank, 1);
        assert!(ranked[0].is_canonical());
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_rank_one_area_dominates_every_member() {
        let ranked = rank(group(vec![
            record("a.jpg", 800, 600, 0),
            record("b.jpg", 1280, 720, 1),
            record("c.jpg", 100, 100, 2),
        ]));
        let top = ranked[0].record.area();
        assert!(ranked.iter().all(|m| m.record.area() <= top));
    }

    #[test]
    fn test_ties_resolve_by_discovery_order() {
        // 1000x500 and 500x1000 have equal areas; earliest seen wins.
        let ranked = rank(group(vec![
            record("later.jpg", 1000, 500, 5),
            record("earliest.jpg", 500, 1000, 1),
            record("middle.jpg", 1000, 500, 3),
        ]));

        let names: Vec<_> = ranked
            .iter()
            .map(|m| m.record.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["earliest.jpg", "middle.jpg", "later.jpg"]);
    }

    #[test]
    fn test_identical_areas_follow_discovery_order_only() {
        let ranked = rank(group(vec![
            record("c.jpg", 640, 480, 2),
            record("a.jpg", 640, 480, 0),
            record("b.jpg", 640, 480, 1),
        ]));

        let orders: Vec<_> = ranked.iter().map(|m| m.record.discovery_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        let ranks: Vec<_> = ranked.iter().map(|m| m.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
