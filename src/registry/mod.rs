#[cfg(target_os = "macos")]
pub mod launch_services;
pub mod memory;

use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// A concrete tag that may map onto a declared type identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    /// Filename extension without the leading dot, e.g. `txt`.
    Extension(String),
    /// Full MIME string, e.g. `text/plain`.
    MimeType(String),
}

/// The key a handler query is made against: either a probe URL (for
/// scheme-based lookups) or a declared type identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerQuery {
    Uri(Url),
    ContentType(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("the default-handler registry is not available on this platform")]
    Unsupported,
    #[error("the registry rejected the request (status {0})")]
    Rejected(i32),
    #[error("no bundle identifier found in {}", .0.display())]
    MissingBundleIdentifier(PathBuf),
}

/// Access to the OS table of type declarations and default-handler
/// assignments. One implementation talks to the live registry; the
/// in-memory one backs tests.
pub trait HandlerRegistry {
    /// Map a tag onto its declared type identifier. `Ok(None)` when no
    /// installed declaration covers the tag.
    fn type_for_tag(&self, tag: &TypeTag) -> Result<Option<String>, RegistryError>;

    /// Look up a type identifier's declaration. `Ok(None)` when the
    /// identifier is not declared by any installed bundle.
    fn declared_type(&self, identifier: &str) -> Result<Option<String>, RegistryError>;

    /// The single application the OS would hand the query to, if any.
    fn default_handler(&self, query: &HandlerQuery) -> Result<Option<PathBuf>, RegistryError>;

    /// Every application registered for the query, in registry order.
    fn all_handlers(&self, query: &HandlerQuery) -> Result<Vec<PathBuf>, RegistryError>;

    /// Register the application at `app_path` as the default handler.
    fn set_default_handler(
        &mut self,
        app_path: &Path,
        query: &HandlerQuery,
    ) -> Result<(), RegistryError>;
}

/// Open the platform registry.
#[cfg(target_os = "macos")]
pub fn platform() -> Result<Box<dyn HandlerRegistry>, RegistryError> {
    Ok(Box::new(launch_services::LaunchServicesRegistry::new()))
}

#[cfg(not(target_os = "macos"))]
pub fn platform() -> Result<Box<dyn HandlerRegistry>, RegistryError> {
    Err(RegistryError::Unsupported)
}
