//! Test fixtures for apiop development and testing.
//!
//! Pre-built schemas and registries used by tests across the workspace.
//!
//! # Example
//!
//! ```
//! use apiop_core::{fixtures, SchemaRegistry};
//!
//! let schemas = fixtures::cluster_schemas();
//! assert!(schemas.schema("clusters").is_some());
//! ```

use crate::schema::{Schema, Schemas};
use http::Method;
use std::sync::Arc;

/// Schema for a fully writable `cluster` resource.
///
/// - collection: `GET`, `POST`
/// - resource: `GET`, `PUT`, `DELETE`
#[must_use]
pub fn cluster_schema() -> Schema {
    Schema::builder("cluster")
        .collection_methods([Method::GET, Method::POST])
        .resource_methods([Method::GET, Method::PUT, Method::DELETE])
        .build()
}

/// Schema for a read-only `node` resource.
#[must_use]
pub fn node_schema() -> Schema {
    Schema::builder("node").build()
}

/// Schema for a `policy` resource with an irregular plural.
///
/// - collection: `GET`, `POST`
/// - resource: `GET`, `DELETE`
#[must_use]
pub fn policy_schema() -> Schema {
    Schema::builder("policy")
        .plural_name("policies")
        .collection_methods([Method::GET, Method::POST])
        .resource_methods([Method::GET, Method::DELETE])
        .build()
}

/// Registry containing [`cluster_schema`], [`node_schema`] and [`policy_schema`].
///
/// # Example
///
/// ```
/// use apiop_core::fixtures::cluster_schemas;
///
/// let schemas = cluster_schemas();
/// assert_eq!(schemas.len(), 3);
/// ```
#[must_use]
pub fn cluster_schemas() -> Schemas {
    Schemas::new()
        .with(cluster_schema())
        .with(node_schema())
        .with(policy_schema())
}

/// [`cluster_schemas`] behind an `Arc`, ready to attach to an operation.
#[must_use]
pub fn shared_cluster_schemas() -> Arc<Schemas> {
    Arc::new(cluster_schemas())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaRegistry;

    #[test]
    fn test_cluster_schema_methods() {
        let schema = cluster_schema();
        assert!(schema.allows_collection(&Method::POST));
        assert!(schema.allows_resource(&Method::DELETE));
        assert!(!schema.allows_resource(&Method::POST));
    }

    #[test]
    fn test_node_schema_is_read_only() {
        let schema = node_schema();
        assert_eq!(schema.collection_methods(), &[Method::GET]);
        assert_eq!(schema.resource_methods(), &[Method::GET]);
    }

    #[test]
    fn test_registry_resolves_plurals() {
        let schemas = cluster_schemas();
        assert_eq!(schemas.schema("clusters").unwrap().id(), "cluster");
        assert_eq!(schemas.schema("nodes").unwrap().id(), "node");
        assert_eq!(schemas.schema("policies").unwrap().id(), "policy");
    }
}
