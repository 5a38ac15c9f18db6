use crate::application::Application;
use crate::input::{InputKind, TypedInput};
use crate::registry::{self, HandlerQuery, HandlerRegistry, TypeTag};
use anyhow::{bail, Context, Result};
use std::fmt;
use url::Url;

/// Answers handler queries for classified inputs against a registry.
pub struct HandlerResolver {
    registry: Box<dyn HandlerRegistry>,
}

impl fmt::Debug for HandlerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerResolver").finish_non_exhaustive()
    }
}

impl HandlerResolver {
    pub fn new(registry: Box<dyn HandlerRegistry>) -> Self {
        HandlerResolver { registry }
    }

    /// Open a resolver backed by the OS registry.
    pub fn platform() -> Result<Self> {
        let registry =
            registry::platform().context("Failed to open the default-handler registry")?;
        Ok(Self::new(registry))
    }

    /// Translate a classified input into a registry query key.
    ///
    /// Failures here are user errors: tags and identifiers nothing
    /// declares, or a uri input that yields no usable probe URL.
    fn query_for(&self, input: &TypedInput) -> Result<HandlerQuery> {
        match input.kind {
            InputKind::Uri => {
                let Some(url) = probe_url(&input.raw) else {
                    bail!("Neither URL nor scheme: '{}'", input.raw);
                };
                Ok(HandlerQuery::Uri(url))
            }
            InputKind::Mime => {
                if input.raw.parse::<mime::Mime>().is_err() {
                    bail!("Unknown mime type '{}'", input.raw);
                }
                let tag = TypeTag::MimeType(input.raw.clone());
                match self.registry.type_for_tag(&tag)? {
                    Some(identifier) => Ok(HandlerQuery::ContentType(identifier)),
                    None => bail!("Unknown mime type '{}'", input.raw),
                }
            }
            InputKind::FileExtension => {
                let extension = input.raw.strip_prefix('.').unwrap_or(&input.raw);
                let tag = TypeTag::Extension(extension.to_string());
                match self.registry.type_for_tag(&tag)? {
                    Some(identifier) => Ok(HandlerQuery::ContentType(identifier)),
                    None => bail!("Unknown file extension '{}'", input.raw),
                }
            }
            InputKind::Identifier => match self.registry.declared_type(&input.raw)? {
                Some(identifier) => Ok(HandlerQuery::ContentType(identifier)),
                None => bail!("Unknown type identifier '{}'", input.raw),
            },
        }
    }

    /// The application the OS would open the input with, if any is
    /// registered.
    pub fn resolve_default(&self, input: &TypedInput) -> Result<Option<Application>> {
        let query = self.query_for(input)?;
        let handler = self.registry.default_handler(&query)?;
        Ok(handler.map(Application::new))
    }

    /// Every application registered for the input.
    pub fn resolve_all(&self, input: &TypedInput) -> Result<Vec<Application>> {
        let query = self.query_for(input)?;
        let handlers = self.registry.all_handlers(&query)?;
        Ok(handlers.into_iter().map(Application::new).collect())
    }

    /// Register `app` as the default handler for the input.
    pub fn set_default(&mut self, app: &Application, input: &TypedInput) -> Result<()> {
        let query = self.query_for(input)?;
        self.registry
            .set_default_handler(app.path(), &query)
            .with_context(|| {
                format!(
                    "Failed to register {} for {} '{}'",
                    app.name(),
                    input.kind,
                    input.raw
                )
            })
    }
}

/// Probe URL for a uri input: the input itself when it parses, otherwise
/// `<scheme>://` built from everything before the first colon.
fn probe_url(raw: &str) -> Option<Url> {
    if let Ok(url) = Url::parse(raw) {
        return Some(url);
    }
    let scheme: String = raw.chars().take_while(|c| *c != ':').collect();
    Url::parse(&format!("{scheme}://")).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::memory::MemoryRegistry;
    use crate::registry::RegistryError;
    use std::path::{Path, PathBuf};

    fn input(raw: &str) -> TypedInput {
        TypedInput::classify(raw).unwrap()
    }

    fn resolver_with(build: impl FnOnce(&mut MemoryRegistry)) -> HandlerResolver {
        let mut registry = MemoryRegistry::new();
        build(&mut registry);
        HandlerResolver::new(Box::new(registry))
    }

    #[test]
    fn test_default_for_scheme() {
        let resolver = resolver_with(|registry| {
            registry.add_scheme_handler("mailto", Path::new("/Applications/Mail.app"));
        });

        let found = resolver.resolve_default(&input("mailto:")).unwrap();
        assert_eq!(
            found.map(|app| app.path().to_path_buf()),
            Some(PathBuf::from("/Applications/Mail.app"))
        );
    }

    #[test]
    fn test_full_url_uses_its_scheme() {
        let resolver = resolver_with(|registry| {
            registry.add_scheme_handler("https", Path::new("/Applications/Safari.app"));
        });

        let found = resolver
            .resolve_default(&input("https://example.com"))
            .unwrap();
        assert_eq!(found.unwrap().name(), "Safari");
    }

    #[test]
    fn test_unusable_uri_fails_validation() {
        let resolver = resolver_with(|_| {});
        let error = resolver.resolve_default(&input("http:")).unwrap_err();
        assert_eq!(error.to_string(), "Neither URL nor scheme: 'http:'");
    }

    #[test]
    fn test_extension_resolves_through_its_declared_type() {
        let resolver = resolver_with(|registry| {
            registry.declare_type("public.plain-text", &["txt"], &["text/plain"]);
            registry.add_type_handler("public.plain-text", Path::new("/Applications/TextEdit.app"));
        });

        let found = resolver.resolve_default(&input(".txt")).unwrap();
        assert_eq!(found.unwrap().name(), "TextEdit");
    }

    #[test]
    fn test_extension_strips_a_single_leading_dot() {
        let resolver = resolver_with(|registry| {
            registry.declare_type("org.gnu.gnu-zip-tar-archive", &["tar.gz"], &[]);
            registry.add_type_handler(
                "org.gnu.gnu-zip-tar-archive",
                Path::new("/Applications/Archive Utility.app"),
            );
        });

        let found = resolver.resolve_default(&input(".tar.gz")).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn test_unknown_extension_fails_validation() {
        let resolver = resolver_with(|_| {});
        let error = resolver.resolve_default(&input(".zzz")).unwrap_err();
        assert_eq!(error.to_string(), "Unknown file extension '.zzz'");
    }

    #[test]
    fn test_unknown_mime_type_fails_validation() {
        let resolver = resolver_with(|_| {});
        let error = resolver
            .resolve_default(&input("image/x-unknown"))
            .unwrap_err();
        assert_eq!(error.to_string(), "Unknown mime type 'image/x-unknown'");
    }

    #[test]
    fn test_malformed_mime_type_fails_validation() {
        let resolver = resolver_with(|registry| {
            registry.declare_type("public.plain-text", &[], &["text/ plain"]);
        });
        // Registered or not, a string the MIME grammar rejects never
        // reaches the registry.
        let error = resolver.resolve_default(&input("text/ plain")).unwrap_err();
        assert_eq!(error.to_string(), "Unknown mime type 'text/ plain'");
    }

    #[test]
    fn test_unknown_identifier_fails_validation() {
        let resolver = resolver_with(|_| {});
        let error = resolver
            .resolve_default(&input("com.example.nope"))
            .unwrap_err();
        assert_eq!(error.to_string(), "Unknown type identifier 'com.example.nope'");
    }

    #[test]
    fn test_resolve_all_keeps_registry_order() {
        let resolver = resolver_with(|registry| {
            registry.add_scheme_handler("mailto", Path::new("/Applications/Mail.app"));
            registry.add_scheme_handler("mailto", Path::new("/Applications/Outlook.app"));
        });

        let found = resolver.resolve_all(&input("mailto:")).unwrap();
        let names: Vec<String> = found.iter().map(Application::name).collect();
        assert_eq!(names, ["Mail", "Outlook"]);
    }

    #[test]
    fn test_set_default_is_visible_to_the_next_query() {
        let mut resolver = resolver_with(|registry| {
            registry.add_scheme_handler("mailto", Path::new("/Applications/Mail.app"));
            registry.add_scheme_handler("mailto", Path::new("/Applications/Outlook.app"));
        });

        let outlook = Application::new(PathBuf::from("/Applications/Outlook.app"));
        resolver.set_default(&outlook, &input("mailto:")).unwrap();

        let found = resolver.resolve_default(&input("mailto:")).unwrap();
        assert_eq!(found.unwrap().name(), "Outlook");
    }

    #[test]
    fn test_rejected_registration_carries_context() {
        struct RejectingRegistry;

        impl crate::registry::HandlerRegistry for RejectingRegistry {
            fn type_for_tag(&self, _: &TypeTag) -> Result<Option<String>, RegistryError> {
                Ok(Some("public.plain-text".to_string()))
            }
            fn declared_type(&self, _: &str) -> Result<Option<String>, RegistryError> {
                Ok(None)
            }
            fn default_handler(
                &self,
                _: &HandlerQuery,
            ) -> Result<Option<PathBuf>, RegistryError> {
                Ok(None)
            }
            fn all_handlers(&self, _: &HandlerQuery) -> Result<Vec<PathBuf>, RegistryError> {
                Ok(Vec::new())
            }
            fn set_default_handler(
                &mut self,
                _: &Path,
                _: &HandlerQuery,
            ) -> Result<(), RegistryError> {
                Err(RegistryError::Rejected(-54))
            }
        }

        let mut resolver = HandlerResolver::new(Box::new(RejectingRegistry));
        let app = Application::new(PathBuf::from("/Applications/TextEdit.app"));
        let error = resolver.set_default(&app, &input(".txt")).unwrap_err();

        let chain = format!("{error:#}");
        assert!(chain.contains("Failed to register TextEdit for file extension '.txt'"));
        assert!(chain.contains("status -54"));
    }

    #[test]
    fn test_probe_url_accepts_a_bare_scheme() {
        assert_eq!(probe_url("mailto:").unwrap().scheme(), "mailto");
    }

    #[test]
    fn test_probe_url_falls_back_to_the_scheme_alone() {
        // The full input fails to parse; its scheme still yields a URL.
        assert_eq!(probe_url("demo://[invalid").unwrap().scheme(), "demo");
    }

    #[test]
    fn test_probe_url_rejects_a_schemeless_special_form() {
        assert!(probe_url("http:").is_none());
    }
}
