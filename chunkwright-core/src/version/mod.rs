//! Per-revision behavior.
//!
//! Every schema era is a [`VersionInterface`]: a version range plus a
//! [`FeatureTable`] folded once from its parent's table and a list of
//! overrides. Lookups never rebuild tables.

mod builtin;
mod features;
mod registry;

pub use features::{
    DEFAULT_STATUS, DataRoot, EntityFormat, Family, Feature, FeatureTable, SectionFormat,
    StatusFormat, TagLocation,
};
pub use registry::{Platform, VersionInterface, VersionRange, VersionRegistry};
