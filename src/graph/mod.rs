//! Movie graph data model
//!
//! Typed records for everything the traversal API returns:
//! - Vertices labelled `movie` or `person` with an open property bag
//! - Directed `appears_in` edges
//! - Pagination window and the `{ total, results }` envelope

pub mod edge;
pub mod page;
pub mod property;
pub mod types;
pub mod vertex;

// Re-export main types
pub use edge::Edge;
pub use page::{Depth, Page, Pagination, Subgraph};
pub use property::{PropertyMap, PropertyValue};
pub use types::{Direction, EdgeLabel, GraphModelError, VertexId, VertexLabel};
pub use vertex::Vertex;
