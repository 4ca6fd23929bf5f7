/*!
 * Recomposition of a single layer into a standalone drawing.
 *
 * The composite is a fixed SVG header, the markup of the selected layer and
 * a fixed trailer. When no layer matches, the body is empty and the result is
 * still a well-formed, blank drawing.
 */

use std::fmt;

use log::debug;

use crate::svg_document::SvgDocument;

/// Header written before the layer markup
pub const SVG_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.0//EN" "http://www.w3.org/TR/2001/REC-SVG-20010904/DTD/svg10.dtd">
<svg width="23.838" height="23.838" xmlns="http://www.w3.org/2000/svg" xmlns:svg="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:slic3r="http://slic3r.org/namespaces/slic3r">
"#;

/// Trailer written after the layer markup
pub const SVG_TRAILER: &str = "\n</svg>";

/// Namespace bindings declared by [`SVG_HEADER`], as `(prefix, uri)`
pub const HEADER_NAMESPACES: [(Option<&str>, &str); 4] = [
    (None, "http://www.w3.org/2000/svg"),
    (Some("svg"), "http://www.w3.org/2000/svg"),
    (Some("xlink"), "http://www.w3.org/1999/xlink"),
    (Some("slic3r"), "http://slic3r.org/namespaces/slic3r"),
];

/// A drawing containing at most one layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeDocument {
    layer: i32,
    body: Option<String>,
}

impl CompositeDocument {
    /// Composite with an empty body for `layer`
    pub fn blank(layer: i32) -> Self {
        Self { layer, body: None }
    }

    /// Requested layer id
    pub fn layer(&self) -> i32 {
        self.layer
    }

    /// Markup of the selected layer, empty when nothing matched
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Whether no layer matched
    pub fn is_blank(&self) -> bool {
        self.body.is_none()
    }

    /// Full document text
    pub fn to_svg_string(&self) -> String {
        let body = self.body();
        let mut svg = String::with_capacity(SVG_HEADER.len() + body.len() + SVG_TRAILER.len());
        svg.push_str(SVG_HEADER);
        svg.push_str(body);
        svg.push_str(SVG_TRAILER);
        svg
    }

    /// Full document as UTF-8 bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_svg_string().into_bytes()
    }
}

impl fmt::Display for CompositeDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}{}", SVG_HEADER, self.body(), SVG_TRAILER)
    }
}

/// Compose `current_layer` of `document`
///
/// Layers are matched by id, not position; the first group carrying the id
/// wins.
pub fn compose(document: &SvgDocument, current_layer: i32) -> CompositeDocument {
    match document.find_layer(current_layer) {
        Some(layer) => {
            debug!("Composing layer {} ({} bytes)", current_layer, layer.markup().len());
            CompositeDocument {
                layer: current_layer,
                body: Some(layer.markup().to_string()),
            }
        }
        None => {
            debug!("No layer {} in {}", current_layer, document.source_file().display());
            CompositeDocument::blank(current_layer)
        }
    }
}
