use crate::application::Application;
use crate::bundle_info::{BundleInfo, DocumentType, TypeDeclaration, UrlType};
use std::path::Path;

/// Which metadata sections a detail report includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailSections {
    pub documents: bool,
    pub exported_types: bool,
    pub imported_types: bool,
    pub urls: bool,
}

impl DetailSections {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        DetailSections {
            documents: true,
            exported_types: true,
            imported_types: true,
            urls: true,
        }
    }

    pub fn any(&self) -> bool {
        self.documents || self.exported_types || self.imported_types || self.urls
    }
}

/// Render an application's detail report: a header block, then one block
/// per selected section the metadata actually declares. Without metadata
/// only a degraded header renders.
pub fn render_application(
    app: &Application,
    info: Option<&BundleInfo>,
    sections: DetailSections,
) -> String {
    let mut blocks = vec![header_block(app, info)];
    if let Some(info) = info {
        if sections.exported_types {
            if let Some(types) = &info.exported_types {
                blocks.push(type_declarations_block("Exported Types", types));
            }
        }
        if sections.imported_types {
            if let Some(types) = &info.imported_types {
                blocks.push(type_declarations_block("Imported Types", types));
            }
        }
        if sections.documents {
            if let Some(types) = &info.document_types {
                blocks.push(document_types_block(types));
            }
        }
        if sections.urls {
            if let Some(types) = &info.url_types {
                blocks.push(url_types_block(types));
            }
        }
    }
    blocks.join("\n\n")
}

/// Render registered handlers as a marked list, one entry per handler,
/// with the OS default (when present among them) marked.
pub fn render_handler_list(
    handlers: &[(Application, Option<BundleInfo>)],
    default_path: Option<&Path>,
) -> String {
    let mut lines = Vec::new();
    let mut marked = false;
    for (index, (app, info)) in handlers.iter().enumerate() {
        let is_default = default_path == Some(app.path());
        let prefix = if is_default {
            marked = true;
            "★ "
        } else {
            "  "
        };
        lines.push(format!("{prefix}{}", app.name()));
        lines.push(format!("    Path: {}", app.path().display()));
        if let Some(info) = info {
            lines.push(format!("    Identifier: {}", info.identifier));
            if let Some(version) = &info.version {
                lines.push(format!("    Version: {version}"));
            }
        }
        if index < handlers.len() - 1 {
            lines.push(String::new());
        }
    }
    if marked {
        lines.push(String::new());
        lines.push("Legend: ★=Default  (space)=Available".to_string());
    }
    lines.join("\n")
}

/// JSON view of an application and its metadata.
pub fn application_json(app: &Application, info: Option<&BundleInfo>) -> serde_json::Value {
    serde_json::json!({
        "name": app.name(),
        "path": app.path(),
        "info": info,
    })
}

fn header_block(app: &Application, info: Option<&BundleInfo>) -> String {
    let mut lines = Vec::new();
    match info {
        Some(info) => {
            let title = info.name.as_deref().unwrap_or(&info.identifier);
            lines.push(format!("Application: {title}"));
            lines.push(format!("  Path: '{}'", app.path().display()));
            lines.push(format!("  Identifier: '{}'", info.identifier));
            if let Some(name) = &info.name {
                lines.push(format!("  Display Name: '{name}'"));
            }
            if let Some(version) = &info.version {
                lines.push(format!("  Version: '{version}'"));
            }
        }
        None => {
            lines.push("Application".to_string());
            lines.push(format!("  Path: '{}'", app.path().display()));
            lines.push("  Metadata: unavailable".to_string());
        }
    }
    lines.join("\n")
}

fn type_declarations_block(label: &str, types: &[TypeDeclaration]) -> String {
    let mut lines = vec![format!("{label}:")];
    for declaration in types {
        let title = declaration
            .description
            .as_deref()
            .or(declaration.identifier.as_deref())
            .unwrap_or("Unknown");
        lines.push(format!("  {title}:"));
        lines.push(format!(
            "    Identifier: '{}'",
            declaration.identifier.as_deref().unwrap_or("-")
        ));
        if let Some(icon) = &declaration.icon_legacy {
            lines.push(format!("    Icon (legacy): '{icon}'"));
        }
        if let Some(icons) = &declaration.icons {
            if !icons.is_empty() {
                lines.push("    Icons:".to_string());
                if let Some(background) = &icons.background_name {
                    lines.push(format!("      Background: '{background}'"));
                }
                if let Some(badge) = &icons.badge_name {
                    lines.push(format!("      Badge: '{badge}'"));
                }
                if let Some(text) = &icons.text {
                    lines.push(format!("      Text: '{text}'"));
                }
            }
        }
        match declaration.conforms_to.as_deref() {
            None | Some([]) => lines.push("    Conforming Types: None".to_string()),
            Some([only]) => lines.push(format!("    Conforming Type: '{only}'")),
            Some(many) => {
                lines.push("    Conforming Types:".to_string());
                for conforming in many {
                    lines.push(format!("      - '{conforming}'"));
                }
            }
        }
        if let Some(tags) = &declaration.tags {
            push_value_lines(&mut lines, "Extensions", tags.extensions.as_deref());
            push_value_lines(&mut lines, "Mime-Types", tags.mime_types.as_deref());
        }
    }
    lines.join("\n")
}

fn document_types_block(types: &[DocumentType]) -> String {
    let mut lines = vec!["Document Types:".to_string()];
    for document in types {
        let first_content_type = document
            .content_type_identifiers
            .as_deref()
            .and_then(<[String]>::first)
            .map(String::as_str);
        let title = document
            .name
            .as_deref()
            .or(first_content_type)
            .unwrap_or("Unnamed");
        lines.push(format!("  {title}:"));
        lines.push(format!(
            "    Name: '{}'",
            document.name.as_deref().unwrap_or("")
        ));
        lines.push(format!(
            "    Handler Role: '{}'",
            document.role.map(|role| role.as_str()).unwrap_or("-")
        ));
        lines.push(format!(
            "    Handler Rank: '{}'",
            document
                .handler_rank
                .map(|rank| rank.as_str())
                .unwrap_or("-")
        ));
        if let Some(icon) = &document.icon {
            lines.push(format!("    Icon: {icon}"));
        }
        match document.content_type_identifiers.as_deref() {
            None | Some([]) => lines.push("    Type Identifiers: -".to_string()),
            Some([only]) => lines.push(format!("    Type Identifiers: '{only}'")),
            Some(many) => {
                lines.push("    Type Identifiers:".to_string());
                for identifier in many {
                    lines.push(format!("      - '{identifier}'"));
                }
            }
        }
    }
    lines.join("\n")
}

fn url_types_block(types: &[UrlType]) -> String {
    let mut lines = vec!["URL Types:".to_string()];
    for url_type in types {
        let title = url_type
            .identifier
            .as_deref()
            .or_else(|| url_type.schemes.first().map(String::as_str))
            .unwrap_or("Unnamed");
        lines.push(format!("  {title}:"));
        lines.push(format!(
            "    Identifier: '{}'",
            url_type.identifier.as_deref().unwrap_or("-")
        ));
        lines.push(format!(
            "    Handler Role: '{}'",
            url_type.role.map(|role| role.as_str()).unwrap_or("-")
        ));
        if let Some(icon) = &url_type.icon {
            lines.push(format!("    Icon: {icon}"));
        }
        match url_type.schemes.as_slice() {
            [] => lines.push("    Schemes: -".to_string()),
            [only] => lines.push(format!("    Schemes: '{only}'")),
            many => {
                lines.push("    Schemes:".to_string());
                for scheme in many {
                    lines.push(format!("      - '{scheme}'"));
                }
            }
        }
    }
    lines.join("\n")
}

fn push_value_lines(lines: &mut Vec<String>, label: &str, values: Option<&[String]>) {
    match values {
        None | Some([]) => {}
        Some([only]) => lines.push(format!("    {label}: '{only}'")),
        Some(many) => {
            lines.push(format!("    {label}:"));
            for value in many {
                lines.push(format!("      - '{value}'"));
            }
        }
    }
}
