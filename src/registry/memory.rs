#![cfg(test)]

use super::{HandlerQuery, HandlerRegistry, RegistryError, TypeTag};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// In-memory stand-in for the platform registry, used by unit tests.
///
/// Handler lists are ordered and the first entry is the default.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    types_by_extension: BTreeMap<String, String>,
    types_by_mime: BTreeMap<String, String>,
    declared_types: BTreeSet<String>,
    scheme_handlers: BTreeMap<String, Vec<PathBuf>>,
    type_handlers: BTreeMap<String, Vec<PathBuf>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type identifier together with the tags that map onto it.
    pub fn declare_type(&mut self, identifier: &str, extensions: &[&str], mime_types: &[&str]) {
        self.declared_types.insert(identifier.to_string());
        for extension in extensions {
            self.types_by_extension
                .insert((*extension).to_string(), identifier.to_string());
        }
        for mime_type in mime_types {
            self.types_by_mime
                .insert((*mime_type).to_string(), identifier.to_string());
        }
    }

    pub fn add_scheme_handler(&mut self, scheme: &str, app_path: &Path) {
        self.scheme_handlers
            .entry(scheme.to_string())
            .or_default()
            .push(app_path.to_path_buf());
    }

    pub fn add_type_handler(&mut self, identifier: &str, app_path: &Path) {
        self.type_handlers
            .entry(identifier.to_string())
            .or_default()
            .push(app_path.to_path_buf());
    }

    fn handlers_for(&self, query: &HandlerQuery) -> Vec<PathBuf> {
        let handlers = match query {
            HandlerQuery::Uri(url) => self.scheme_handlers.get(url.scheme()),
            HandlerQuery::ContentType(identifier) => self.type_handlers.get(identifier),
        };
        handlers.cloned().unwrap_or_default()
    }
}

impl HandlerRegistry for MemoryRegistry {
    fn type_for_tag(&self, tag: &TypeTag) -> Result<Option<String>, RegistryError> {
        let declared = match tag {
            TypeTag::Extension(extension) => self.types_by_extension.get(extension),
            TypeTag::MimeType(mime_type) => self.types_by_mime.get(mime_type),
        };
        Ok(declared.cloned())
    }

    fn declared_type(&self, identifier: &str) -> Result<Option<String>, RegistryError> {
        Ok(self.declared_types.get(identifier).cloned())
    }

    fn default_handler(&self, query: &HandlerQuery) -> Result<Option<PathBuf>, RegistryError> {
        Ok(self.handlers_for(query).into_iter().next())
    }

    fn all_handlers(&self, query: &HandlerQuery) -> Result<Vec<PathBuf>, RegistryError> {
        Ok(self.handlers_for(query))
    }

    fn set_default_handler(
        &mut self,
        app_path: &Path,
        query: &HandlerQuery,
    ) -> Result<(), RegistryError> {
        let handlers = match query {
            HandlerQuery::Uri(url) => self
                .scheme_handlers
                .entry(url.scheme().to_string())
                .or_default(),
            HandlerQuery::ContentType(identifier) => {
                self.type_handlers.entry(identifier.clone()).or_default()
            }
        };
        handlers.retain(|handler| handler != app_path);
        handlers.insert(0, app_path.to_path_buf());
        Ok(())
    }
}

mod tests {
    use super::*;
    use url::Url;

    fn uri_query(url: &str) -> HandlerQuery {
        HandlerQuery::Uri(Url::parse(url).unwrap())
    }

    #[test]
    fn test_unknown_tag_has_no_type() {
        let registry = MemoryRegistry::new();
        let declared = registry
            .type_for_tag(&TypeTag::Extension("txt".to_string()))
            .unwrap();
        assert_eq!(declared, None);
    }

    #[test]
    fn test_declared_type_lookup() {
        let mut registry = MemoryRegistry::new();
        registry.declare_type("public.plain-text", &["txt"], &["text/plain"]);

        assert_eq!(
            registry
                .type_for_tag(&TypeTag::Extension("txt".to_string()))
                .unwrap()
                .as_deref(),
            Some("public.plain-text")
        );
        assert_eq!(
            registry
                .type_for_tag(&TypeTag::MimeType("text/plain".to_string()))
                .unwrap()
                .as_deref(),
            Some("public.plain-text")
        );
        assert_eq!(
            registry.declared_type("public.plain-text").unwrap().as_deref(),
            Some("public.plain-text")
        );
        assert_eq!(registry.declared_type("public.unknown").unwrap(), None);
    }

    #[test]
    fn test_first_registered_handler_is_the_default() {
        let mut registry = MemoryRegistry::new();
        registry.add_scheme_handler("mailto", Path::new("/Applications/Mail.app"));
        registry.add_scheme_handler("mailto", Path::new("/Applications/Other.app"));

        let query = uri_query("mailto://");
        assert_eq!(
            registry.default_handler(&query).unwrap(),
            Some(PathBuf::from("/Applications/Mail.app"))
        );
        assert_eq!(registry.all_handlers(&query).unwrap().len(), 2);
    }

    #[test]
    fn test_set_default_moves_handler_to_the_front() {
        let mut registry = MemoryRegistry::new();
        registry.add_type_handler("public.plain-text", Path::new("/Applications/TextEdit.app"));
        registry.add_type_handler("public.plain-text", Path::new("/Applications/Editor.app"));

        let query = HandlerQuery::ContentType("public.plain-text".to_string());
        registry
            .set_default_handler(Path::new("/Applications/Editor.app"), &query)
            .unwrap();

        assert_eq!(
            registry.default_handler(&query).unwrap(),
            Some(PathBuf::from("/Applications/Editor.app"))
        );
        // Still two handlers, no duplicate entry.
        assert_eq!(registry.all_handlers(&query).unwrap().len(), 2);
    }

    #[test]
    fn test_no_handlers_registered() {
        let registry = MemoryRegistry::new();
        let query = uri_query("demo://");
        assert_eq!(registry.default_handler(&query).unwrap(), None);
        assert!(registry.all_handlers(&query).unwrap().is_empty());
    }
}
