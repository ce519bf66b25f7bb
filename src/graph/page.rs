//! Pagination and result envelopes

use super::edge::Edge;
use super::types::{GraphModelError, VertexId};
use super::vertex::Vertex;
use serde::{Deserialize, Serialize};

/// Validated window over a result set: `limit ∈ [1, 100]`, `0 ≤ offset ≤ i64::MAX`
///
/// Gremlin `range()` takes Java longs, so neither bound of the window may
/// exceed `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    limit: u32,
    offset: u64,
}

impl Pagination {
    pub const MIN_LIMIT: u32 = 1;
    pub const MAX_LIMIT: u32 = 100;
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_OFFSET: u64 = i64::MAX as u64;

    /// Out-of-range limits are rejected rather than clamped
    pub fn new(limit: u64, offset: u64) -> Result<Self, GraphModelError> {
        if limit < Self::MIN_LIMIT as u64 || limit > Self::MAX_LIMIT as u64 {
            return Err(GraphModelError::LimitOutOfRange {
                min: Self::MIN_LIMIT,
                max: Self::MAX_LIMIT,
                got: limit,
            });
        }
        if offset > Self::MAX_OFFSET {
            return Err(GraphModelError::OffsetOutOfRange {
                max: Self::MAX_OFFSET,
                got: offset,
            });
        }
        Ok(Pagination {
            limit: limit as u32,
            offset,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Exclusive end of the window, as used by Gremlin `range(lo, hi)`
    pub fn end(&self) -> u64 {
        self.offset
            .saturating_add(self.limit as u64)
            .min(Self::MAX_OFFSET)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Canonical paginated response: `{ total, results }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Size of the whole result set, counted by a separate query.
    /// May be approximate if the graph changes between the two queries.
    pub total: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(total: u64, results: Vec<T>) -> Self {
        Page { total, results }
    }
}

/// Hop count for neighbourhood expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Depth(u32);

impl Depth {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 3;

    pub fn new(depth: u64) -> Result<Self, GraphModelError> {
        if depth < Self::MIN as u64 || depth > Self::MAX as u64 {
            return Err(GraphModelError::DepthOutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                got: depth,
            });
        }
        Ok(Depth(depth as u32))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth(1)
    }
}

/// Neighbourhood of a vertex, shaped for the force-directed visualization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub root: VertexId,
    pub depth: Depth,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    /// Set when expansion stopped at the vertex cap
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        assert!(Pagination::new(1, 0).is_ok());
        assert!(Pagination::new(100, 0).is_ok());
        assert_eq!(
            Pagination::new(0, 0),
            Err(GraphModelError::LimitOutOfRange { min: 1, max: 100, got: 0 })
        );
        assert!(Pagination::new(101, 0).is_err());
    }

    #[test]
    fn test_offset_fits_java_long() {
        assert!(Pagination::new(10, i64::MAX as u64).is_ok());
        let err = Pagination::new(10, i64::MAX as u64 + 1).unwrap_err();
        assert_eq!(
            err,
            GraphModelError::OffsetOutOfRange {
                max: i64::MAX as u64,
                got: 9223372036854775808
            }
        );
        assert_eq!(err.parameter(), "offset");
        assert!(Pagination::new(10, u64::MAX).is_err());
    }

    #[test]
    fn test_pagination_window() {
        let p = Pagination::new(25, 50).unwrap();
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
        assert_eq!(p.end(), 75);

        let far = Pagination::new(10, Pagination::MAX_OFFSET - 3).unwrap();
        assert_eq!(far.end(), Pagination::MAX_OFFSET);
        let last = Pagination::new(10, Pagination::MAX_OFFSET).unwrap();
        assert_eq!(last.end(), Pagination::MAX_OFFSET);

        let d = Pagination::default();
        assert_eq!((d.limit(), d.offset()), (10, 0));
    }

    #[test]
    fn test_page_shape() {
        let page: Page<u32> = Page::new(150, vec![1, 2, 3]);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({ "total": 150, "results": [1, 2, 3] }));
    }

    #[test]
    fn test_depth_bounds() {
        assert_eq!(Depth::default().get(), 1);
        assert_eq!(Depth::new(3).unwrap().get(), 3);
        assert!(Depth::new(0).is_err());
        assert!(Depth::new(4).is_err());
    }
}
