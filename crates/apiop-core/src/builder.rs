//! Link construction for resolved operations.

use std::fmt;

/// Renders canonical URLs for resources relative to a path prefix.
///
/// A link-builder is attached to every normalized [`ApiOperation`](crate::ApiOperation)
/// so handlers can emit `self`, collection and action links without knowing
/// how the request reached them (proxies, prefixes, forwarded hosts).
pub trait UrlBuilder: fmt::Debug + Send + Sync {
    /// URL of the current request.
    fn current(&self) -> String;

    /// URL of the collection for `type_name`.
    fn collection(&self, type_name: &str) -> String;

    /// URL of the resource `name` of `type_name`.
    fn resource(&self, type_name: &str, name: &str) -> String;

    /// URL of the `link` relation of a resource.
    fn link(&self, type_name: &str, name: &str, link: &str) -> String;

    /// URL invoking `action` on a resource.
    fn action(&self, type_name: &str, name: &str, action: &str) -> String;
}
