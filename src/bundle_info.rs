use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// Decoded bundle metadata (`Contents/Info.plist`).
///
/// Only the keys relevant to handler registrations are decoded; everything
/// else in the plist is ignored. All sections are optional except the bundle
/// identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleInfo {
    #[serde(rename(deserialize = "CFBundleIdentifier"))]
    pub identifier: String,
    #[serde(rename(deserialize = "CFBundleName"))]
    pub name: Option<String>,
    #[serde(rename(deserialize = "CFBundlePackageType"))]
    pub package_type: Option<String>,
    #[serde(rename(deserialize = "CFBundleShortVersionString"))]
    pub version: Option<String>,
    #[serde(rename(deserialize = "CFBundleDocumentTypes"))]
    pub document_types: Option<Vec<DocumentType>>,
    #[serde(rename(deserialize = "CFBundleURLTypes"))]
    pub url_types: Option<Vec<UrlType>>,
    #[serde(rename(deserialize = "UTExportedTypeDeclarations"))]
    pub exported_types: Option<Vec<TypeDeclaration>>,
    #[serde(rename(deserialize = "UTImportedTypeDeclarations"))]
    pub imported_types: Option<Vec<TypeDeclaration>>,
}

impl BundleInfo {
    /// Read and decode the metadata file under a bundle root.
    pub fn load(bundle_path: &Path) -> Result<BundleInfo> {
        let plist_path = bundle_path.join("Contents/Info.plist");
        plist::from_file(&plist_path).with_context(|| {
            format!("Failed to read bundle metadata at {}", plist_path.display())
        })
    }
}

/// A `CFBundleDocumentTypes` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentType {
    #[serde(rename(deserialize = "CFBundleTypeName"))]
    pub name: Option<String>,
    #[serde(rename(deserialize = "CFBundleTypeIconFile"))]
    pub icon: Option<String>,
    #[serde(
        rename(deserialize = "LSItemContentTypes"),
        default,
        deserialize_with = "opt_one_or_many"
    )]
    pub content_type_identifiers: Option<Vec<String>>,
    #[serde(rename(deserialize = "CFBundleTypeRole"))]
    pub role: Option<TypeRole>,
    #[serde(rename(deserialize = "LSHandlerRank"))]
    pub handler_rank: Option<HandlerRank>,
    #[serde(rename(deserialize = "NSDocumentClass"))]
    pub cocoa_class: Option<String>,
}

/// A `CFBundleURLTypes` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlType {
    #[serde(rename(deserialize = "CFBundleURLName"))]
    pub identifier: Option<String>,
    #[serde(
        rename(deserialize = "CFBundleURLSchemes"),
        default,
        deserialize_with = "one_or_many"
    )]
    pub schemes: Vec<String>,
    #[serde(rename(deserialize = "CFBundleTypeRole"))]
    pub role: Option<TypeRole>,
    #[serde(rename(deserialize = "CFBundleURLIconFile"))]
    pub icon: Option<String>,
}

/// A `UTExportedTypeDeclarations` / `UTImportedTypeDeclarations` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    #[serde(rename(deserialize = "UTTypeIdentifier"))]
    pub identifier: Option<String>,
    #[serde(
        rename(deserialize = "UTTypeConformsTo"),
        default,
        deserialize_with = "opt_one_or_many"
    )]
    pub conforms_to: Option<Vec<String>>,
    #[serde(rename(deserialize = "UTTypeTagSpecification"))]
    pub tags: Option<TagSpecification>,
    #[serde(rename(deserialize = "UTTypeReferenceURL"))]
    pub reference_url: Option<String>,
    #[serde(rename(deserialize = "UTTypeDescription"))]
    pub description: Option<String>,
    #[serde(rename(deserialize = "UTTypeIcons"))]
    pub icons: Option<TypeIcons>,
    #[serde(rename(deserialize = "UTTypeIconFile"))]
    pub icon_legacy: Option<String>,
}

/// The `UTTypeTagSpecification` dictionary, mapping a declared type onto
/// filename extensions and MIME strings. Either key may hold a scalar or a
/// list; both decode to a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSpecification {
    #[serde(
        rename(deserialize = "public.filename-extension"),
        default,
        deserialize_with = "opt_one_or_many"
    )]
    pub extensions: Option<Vec<String>>,
    #[serde(
        rename(deserialize = "public.mime-type"),
        default,
        deserialize_with = "opt_one_or_many"
    )]
    pub mime_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeIcons {
    #[serde(rename(deserialize = "UTTypeIconBackgroundName"))]
    pub background_name: Option<String>,
    #[serde(rename(deserialize = "UTTypeIconBadgeName"))]
    pub badge_name: Option<String>,
    #[serde(rename(deserialize = "UTTypeIconText"))]
    pub text: Option<String>,
}

impl TypeIcons {
    pub fn is_empty(&self) -> bool {
        self.background_name.is_none() && self.badge_name.is_none() && self.text.is_none()
    }
}

/// `CFBundleTypeRole` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRole {
    Editor,
    Viewer,
    Shell,
    QuickLookGenerator,
    None,
}

impl TypeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeRole::Editor => "Editor",
            TypeRole::Viewer => "Viewer",
            TypeRole::Shell => "Shell",
            TypeRole::QuickLookGenerator => "QuickLookGenerator",
            TypeRole::None => "None",
        }
    }
}

impl fmt::Display for TypeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `LSHandlerRank` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerRank {
    Owner,
    Default,
    Alternate,
    None,
}

impl HandlerRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerRank::Owner => "Owner",
            HandlerRank::Default => "Default",
            HandlerRank::Alternate => "Alternate",
            HandlerRank::None => "None",
        }
    }
}

impl fmt::Display for HandlerRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accept a bare string where a list is expected.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

fn opt_one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    one_or_many(deserializer).map(Some)
}
