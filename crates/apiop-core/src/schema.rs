//! Resource schemas and the registry used to look them up.
//!
//! A [`Schema`] describes one resource type and which HTTP methods it
//! accepts on its collection (`/widgets`) and on individual resources
//! (`/widgets/{name}`). The normalizer only needs lookup, so the registry
//! is the [`SchemaRegistry`] trait; [`Schemas`] is the in-memory default.

use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Schema describing a resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    id: String,
    plural_name: String,
    collection_methods: Vec<Method>,
    resource_methods: Vec<Method>,
}

impl Schema {
    /// Creates a new schema builder.
    ///
    /// # Example
    ///
    /// ```
    /// use apiop_core::Schema;
    /// use http::Method;
    ///
    /// let schema = Schema::builder("cluster")
    ///     .collection_methods([Method::GET, Method::POST])
    ///     .resource_methods([Method::GET, Method::PUT, Method::DELETE])
    ///     .build();
    ///
    /// assert_eq!(schema.id(), "cluster");
    /// assert_eq!(schema.plural_name(), "clusters");
    /// assert!(schema.allows_collection(&Method::POST));
    /// assert!(!schema.allows_resource(&Method::POST));
    /// ```
    #[must_use]
    pub fn builder(id: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(id)
    }

    /// Returns the schema identifier (the canonical type name).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the plural name used in collection URLs.
    #[must_use]
    pub fn plural_name(&self) -> &str {
        &self.plural_name
    }

    /// Returns the methods accepted on the collection.
    #[must_use]
    pub fn collection_methods(&self) -> &[Method] {
        &self.collection_methods
    }

    /// Returns the methods accepted on a single resource.
    #[must_use]
    pub fn resource_methods(&self) -> &[Method] {
        &self.resource_methods
    }

    /// Returns `true` if `method` is accepted on the collection.
    #[must_use]
    pub fn allows_collection(&self, method: &Method) -> bool {
        self.collection_methods.contains(method)
    }

    /// Returns `true` if `method` is accepted on a single resource.
    #[must_use]
    pub fn allows_resource(&self, method: &Method) -> bool {
        self.resource_methods.contains(method)
    }
}

/// Builder for creating [`Schema`] instances.
#[derive(Debug)]
pub struct SchemaBuilder {
    id: String,
    plural_name: Option<String>,
    collection_methods: Vec<Method>,
    resource_methods: Vec<Method>,
}

impl SchemaBuilder {
    /// Creates a new schema builder. Both method lists default to `GET` only.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plural_name: None,
            collection_methods: vec![Method::GET],
            resource_methods: vec![Method::GET],
        }
    }

    /// Overrides the plural name (defaults to the id with an `s` appended).
    #[must_use]
    pub fn plural_name(mut self, plural: impl Into<String>) -> Self {
        self.plural_name = Some(plural.into());
        self
    }

    /// Sets the methods accepted on the collection.
    #[must_use]
    pub fn collection_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.collection_methods = methods.into_iter().collect();
        self
    }

    /// Sets the methods accepted on a single resource.
    #[must_use]
    pub fn resource_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.resource_methods = methods.into_iter().collect();
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        let plural_name = self
            .plural_name
            .unwrap_or_else(|| format!("{}s", self.id));
        Schema {
            id: self.id,
            plural_name,
            collection_methods: self.collection_methods,
            resource_methods: self.resource_methods,
        }
    }
}

/// Lookup of resource schemas by type name.
///
/// Registries are shared across concurrently handled requests, so
/// implementations must be `Send + Sync` and are expected to be read-mostly.
pub trait SchemaRegistry: fmt::Debug + Send + Sync {
    /// Returns the schema registered for `type_name`, if any.
    fn schema(&self, type_name: &str) -> Option<Arc<Schema>>;
}

impl<T: SchemaRegistry + ?Sized> SchemaRegistry for Arc<T> {
    fn schema(&self, type_name: &str) -> Option<Arc<Schema>> {
        (**self).schema(type_name)
    }
}

/// In-memory schema registry.
///
/// Lookups are case-insensitive and match either the schema id or its
/// plural name.
///
/// # Example
///
/// ```
/// use apiop_core::{Schema, SchemaRegistry, Schemas};
///
/// let mut schemas = Schemas::new();
/// schemas.add(Schema::builder("node").build());
///
/// assert_eq!(schemas.schema("node").unwrap().id(), "node");
/// assert_eq!(schemas.schema("Nodes").unwrap().id(), "node");
/// assert!(schemas.schema("pod").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schemas {
    by_name: HashMap<String, Arc<Schema>>,
    ids: Vec<String>,
}

impl Schemas {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, replacing any previous schema with the same id.
    pub fn add(&mut self, schema: Schema) -> &mut Self {
        let schema = Arc::new(schema);
        let id = schema.id().to_lowercase();
        if let Some(previous) = self.by_name.get(&id).cloned() {
            let plural = previous.plural_name().to_lowercase();
            // Only drop the alias while it still points at the replaced schema.
            if self
                .by_name
                .get(&plural)
                .is_some_and(|entry| Arc::ptr_eq(entry, &previous))
            {
                self.by_name.remove(&plural);
            }
        }
        if !self.ids.contains(&id) {
            self.ids.push(id.clone());
        }
        self.by_name
            .insert(schema.plural_name().to_lowercase(), Arc::clone(&schema));
        self.by_name.insert(id, schema);
        self
    }

    /// Registers a schema, builder style.
    #[must_use]
    pub fn with(mut self, schema: Schema) -> Self {
        self.add(schema);
        self
    }

    /// Returns the registered schema ids, in registration order.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns the number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no schemas are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl SchemaRegistry for Schemas {
    fn schema(&self, type_name: &str) -> Option<Arc<Schema>> {
        if type_name.is_empty() {
            return None;
        }
        self.by_name.get(&type_name.to_lowercase()).cloned()
    }
}
