use super::{HandlerQuery, HandlerRegistry, RegistryError, TypeTag};
use crate::bundle_info::BundleInfo;
use core_foundation::array::CFArray;
use core_foundation::base::TCFType;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use core_foundation::url::CFURL;
use core_foundation_sys::array::CFArrayRef;
use core_foundation_sys::base::kCFAllocatorDefault;
use core_foundation_sys::dictionary::CFDictionaryRef;
use core_foundation_sys::error::CFErrorRef;
use core_foundation_sys::string::CFStringRef;
use core_foundation_sys::url::{CFURLCreateWithString, CFURLRef};
use log::debug;
use std::path::{Path, PathBuf};
use std::ptr;
use url::Url;

type OSStatus = i32;
type LSRolesMask = u32;

#[allow(non_upper_case_globals)]
const kLSRolesAll: LSRolesMask = 0xFFFF_FFFF;

#[allow(non_upper_case_globals, non_snake_case)]
#[link(name = "CoreServices", kind = "framework")]
extern "C" {
    static kUTTagClassFilenameExtension: CFStringRef;
    static kUTTagClassMIMEType: CFStringRef;

    fn UTTypeCreatePreferredIdentifierForTag(
        tag_class: CFStringRef,
        tag: CFStringRef,
        conforming_to: CFStringRef,
    ) -> CFStringRef;

    fn UTTypeCopyDeclaration(identifier: CFStringRef) -> CFDictionaryRef;

    fn LSCopyDefaultApplicationURLForURL(
        url: CFURLRef,
        roles: LSRolesMask,
        error: *mut CFErrorRef,
    ) -> CFURLRef;

    fn LSCopyApplicationURLsForURL(url: CFURLRef, roles: LSRolesMask) -> CFArrayRef;

    fn LSCopyDefaultApplicationURLForContentType(
        content_type: CFStringRef,
        roles: LSRolesMask,
        error: *mut CFErrorRef,
    ) -> CFURLRef;

    fn LSCopyAllRoleHandlersForContentType(
        content_type: CFStringRef,
        roles: LSRolesMask,
    ) -> CFArrayRef;

    fn LSCopyApplicationURLsForBundleIdentifier(
        bundle_identifier: CFStringRef,
        error: *mut CFErrorRef,
    ) -> CFArrayRef;

    fn LSSetDefaultHandlerForURLScheme(
        scheme: CFStringRef,
        bundle_identifier: CFStringRef,
    ) -> OSStatus;

    fn LSSetDefaultRoleHandlerForContentType(
        content_type: CFStringRef,
        roles: LSRolesMask,
        bundle_identifier: CFStringRef,
    ) -> OSStatus;
}

/// The live Launch Services registry.
#[derive(Debug, Default)]
pub struct LaunchServicesRegistry;

impl LaunchServicesRegistry {
    pub fn new() -> Self {
        LaunchServicesRegistry
    }
}

impl HandlerRegistry for LaunchServicesRegistry {
    fn type_for_tag(&self, tag: &TypeTag) -> Result<Option<String>, RegistryError> {
        let (class, value) = match tag {
            TypeTag::Extension(extension) => {
                (unsafe { kUTTagClassFilenameExtension }, extension)
            }
            TypeTag::MimeType(mime_type) => (unsafe { kUTTagClassMIMEType }, mime_type),
        };
        let tag_string = CFString::new(value);
        let raw = unsafe {
            UTTypeCreatePreferredIdentifierForTag(
                class,
                tag_string.as_concrete_TypeRef(),
                ptr::null(),
            )
        };
        if raw.is_null() {
            return Ok(None);
        }
        let identifier = unsafe { CFString::wrap_under_create_rule(raw) }.to_string();
        // For tags nothing declares, the registry synthesizes a dyn.*
        // placeholder rather than returning null.
        if identifier.starts_with("dyn.") {
            debug!("Tag '{value}' only maps onto the dynamic identifier {identifier}");
            return Ok(None);
        }
        debug!("Tag '{value}' maps onto {identifier}");
        Ok(Some(identifier))
    }

    fn declared_type(&self, identifier: &str) -> Result<Option<String>, RegistryError> {
        let uti = CFString::new(identifier);
        let raw = unsafe { UTTypeCopyDeclaration(uti.as_concrete_TypeRef()) };
        if raw.is_null() {
            return Ok(None);
        }
        let _declaration: CFDictionary = unsafe { CFDictionary::wrap_under_create_rule(raw) };
        Ok(Some(identifier.to_string()))
    }

    fn default_handler(&self, query: &HandlerQuery) -> Result<Option<PathBuf>, RegistryError> {
        let raw = match query {
            HandlerQuery::Uri(url) => {
                let Some(cf_url) = cf_url_from(url) else {
                    return Ok(None);
                };
                unsafe {
                    LSCopyDefaultApplicationURLForURL(
                        cf_url.as_concrete_TypeRef(),
                        kLSRolesAll,
                        ptr::null_mut(),
                    )
                }
            }
            HandlerQuery::ContentType(identifier) => {
                let uti = CFString::new(identifier);
                unsafe {
                    LSCopyDefaultApplicationURLForContentType(
                        uti.as_concrete_TypeRef(),
                        kLSRolesAll,
                        ptr::null_mut(),
                    )
                }
            }
        };
        if raw.is_null() {
            return Ok(None);
        }
        let app_url = unsafe { CFURL::wrap_under_create_rule(raw) };
        Ok(app_url.to_path())
    }

    fn all_handlers(&self, query: &HandlerQuery) -> Result<Vec<PathBuf>, RegistryError> {
        match query {
            HandlerQuery::Uri(url) => {
                let Some(cf_url) = cf_url_from(url) else {
                    return Ok(Vec::new());
                };
                let raw =
                    unsafe { LSCopyApplicationURLsForURL(cf_url.as_concrete_TypeRef(), kLSRolesAll) };
                if raw.is_null() {
                    return Ok(Vec::new());
                }
                let urls: CFArray<CFURL> = unsafe { CFArray::wrap_under_create_rule(raw) };
                Ok(urls.iter().filter_map(|url| url.to_path()).collect())
            }
            HandlerQuery::ContentType(identifier) => {
                let uti = CFString::new(identifier);
                let raw = unsafe {
                    LSCopyAllRoleHandlersForContentType(uti.as_concrete_TypeRef(), kLSRolesAll)
                };
                if raw.is_null() {
                    return Ok(Vec::new());
                }
                // This call reports bundle identifiers, not locations.
                let bundle_ids: CFArray<CFString> =
                    unsafe { CFArray::wrap_under_create_rule(raw) };
                let mut handlers = Vec::new();
                for bundle_id in bundle_ids.iter() {
                    if let Some(path) = first_location_of_bundle(&bundle_id) {
                        handlers.push(path);
                    } else {
                        debug!("No location found for bundle {}", *bundle_id);
                    }
                }
                Ok(handlers)
            }
        }
    }

    fn set_default_handler(
        &mut self,
        app_path: &Path,
        query: &HandlerQuery,
    ) -> Result<(), RegistryError> {
        let info = BundleInfo::load(app_path)
            .map_err(|_| RegistryError::MissingBundleIdentifier(app_path.to_path_buf()))?;
        let bundle_id = CFString::new(&info.identifier);
        let status = match query {
            HandlerQuery::Uri(url) => {
                let scheme = CFString::new(url.scheme());
                unsafe {
                    LSSetDefaultHandlerForURLScheme(
                        scheme.as_concrete_TypeRef(),
                        bundle_id.as_concrete_TypeRef(),
                    )
                }
            }
            HandlerQuery::ContentType(identifier) => {
                let uti = CFString::new(identifier);
                unsafe {
                    LSSetDefaultRoleHandlerForContentType(
                        uti.as_concrete_TypeRef(),
                        kLSRolesAll,
                        bundle_id.as_concrete_TypeRef(),
                    )
                }
            }
        };
        debug!("Registration of {} returned status {status}", info.identifier);
        if status != 0 {
            return Err(RegistryError::Rejected(status));
        }
        Ok(())
    }
}

fn cf_url_from(url: &Url) -> Option<CFURL> {
    let string = CFString::new(url.as_str());
    let raw = unsafe {
        CFURLCreateWithString(
            kCFAllocatorDefault,
            string.as_concrete_TypeRef(),
            ptr::null(),
        )
    };
    if raw.is_null() {
        return None;
    }
    Some(unsafe { CFURL::wrap_under_create_rule(raw) })
}

/// Where a bundle identifier is installed, preferring the copy the OS
/// would launch.
fn first_location_of_bundle(bundle_id: &CFString) -> Option<PathBuf> {
    let raw = unsafe {
        LSCopyApplicationURLsForBundleIdentifier(
            bundle_id.as_concrete_TypeRef(),
            ptr::null_mut(),
        )
    };
    if raw.is_null() {
        return None;
    }
    let urls: CFArray<CFURL> = unsafe { CFArray::wrap_under_create_rule(raw) };
    urls.iter().next().and_then(|url| url.to_path())
}
