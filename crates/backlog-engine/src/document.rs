//! Document codec: a YAML header between `---` lines followed by free text.
//!
//! ```text
//! ---
//! id: 1
//! title: Fix bug
//! status: Open
//! epic: 1
//! estimate: 3
//! ---
//!
//! Body text.
//! ```

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use backlog_common_core::{Entity, Error, Result};

const MARKER: &str = "---";

fn document_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)(.*)\z")
            .expect("document pattern is valid")
    })
}

/// Split a document into its decoded header and trimmed body.
///
/// Fails with [`Error::InvalidDocumentFormat`] when the opening and closing
/// markers are not both present. The error carries no path; callers that
/// read from disk attribute it with [`Error::in_file`].
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<(T, String)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let captures = document_pattern()
        .captures(text)
        .ok_or_else(|| Error::invalid_document(""))?;
    let header = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());

    let header: T = serde_yaml::from_str(header)?;
    Ok((header, body.trim().to_string()))
}

/// Render a header and body back into document text.
pub fn generate<T: Serialize>(header: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(header)?;

    let mut out = String::with_capacity(yaml.len() + body.len() + 16);
    out.push_str(MARKER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(MARKER);
    out.push_str("\n\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Parse a document into a validated entity with its body attached.
pub fn parse_entity<E: Entity>(text: &str) -> Result<E> {
    let (mut entity, body): (E, String) = parse(text)?;
    entity.validate()?;
    entity.set_content(body);
    Ok(entity)
}

/// Render an entity, header and body.
pub fn render_entity<E: Entity>(entity: &E) -> Result<String> {
    generate(entity, entity.content())
}
