//! Delta snapshots for schema-less hierarchical data.
//!
//! Database triggers deliver the tree as it was plus a sparse delta. This
//! crate provides:
//! - [`apply_change`] to merge a delta into a tree
//! - [`coerce_arrays`] for integer-keyed objects that represent lists
//! - [`DeltaSnapshot`] views that move between the before/after trees and
//!   down into children without copying them
//! - [`DatabaseResource`] parsing of `projects/_/instances/{i}/refs/{path}`
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use triggerkit_tree::DeltaSnapshot;
//!
//! let snap = DeltaSnapshot::new(
//!     json!({"name": "ada", "visits": 1}),
//!     Some(json!({"visits": 2})),
//!     "/users/ada",
//! );
//! assert_eq!(snap.child("visits").val(), json!(2));
//! assert_eq!(snap.previous().child("visits").val(), json!(1));
//! assert!(snap.child("visits").changed());
//! assert!(!snap.child("name").changed());
//! ```

#![deny(missing_docs)]

/// Delta application and tree lookups.
pub mod change;
/// Array coercion.
pub mod coerce;
/// Error types.
pub mod errors;
/// Path helpers.
pub mod path;
/// Database resource names.
pub mod resource;
/// Delta snapshot views.
pub mod snapshot;

pub use change::{apply_change, delta_touches, prune_nulls, value_at};
pub use coerce::coerce_arrays;
pub use errors::TreeError;
pub use path::{join_path, path_parts};
pub use resource::{DatabaseResource, DATABASE_HOST};
pub use snapshot::DeltaSnapshot;
