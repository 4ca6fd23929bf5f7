/*!
 * Loading of layered drawings.
 *
 * A layered drawing is an SVG document in which every unprefixed `g`
 * element is one selectable layer, labelled `id="layer<N>"`. Loading collects
 * every such group in document order, nested groups included.
 *
 * A group's markup is kept exactly as it appears in the source, unless the
 * source text cannot stand on its own under the composite header: when the
 * document declares entities, or binds namespaces the header does not, the
 * group is re-serialized from the parsed tree instead.
 */

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Node, NodeType, NS_XML_URI};
use serde::Serialize;

use crate::compositor::HEADER_NAMESPACES;
use crate::errors::LoadError;

/// Tag of the elements treated as layers
pub const LAYER_TAG: &str = "g";

/// Prefix stripped from a layer group's id to obtain its number
pub const LAYER_ID_PREFIX: &str = "layer";

// @const: Layer id label, the prefix followed by a signed integer
static LAYER_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{}([+-]?\d+)$", regex::escape(LAYER_ID_PREFIX))).unwrap()
});

// @struct: Namespace binding in scope, `(prefix, uri)`
type Binding = (Option<String>, String);

/// One addressable layer of a drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerNode {
    id: i32,
    markup: String,
}

impl LayerNode {
    pub fn new(id: i32, markup: impl Into<String>) -> Self {
        Self {
            id,
            markup: markup.into(),
        }
    }

    /// Numeric id parsed from the `layer<N>` label
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Markup of the layer group, including its own tags
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Parse a `layer<N>` label into its number
    ///
    /// Surrounding whitespace is ignored. Returns `None` when the prefix is
    /// missing or the remainder is not an `i32`.
    pub fn parse_id(raw: &str) -> Option<i32> {
        LAYER_ID_REGEX
            .captures(raw.trim())
            .and_then(|caps| caps[1].parse().ok())
    }
}

/// Ordered layers of one drawing file
///
/// A document is never modified after loading; a reload produces a new one.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    source_file: PathBuf,
    layers: Vec<LayerNode>,
}

/// Diagnostic view of a loaded document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub source_file: PathBuf,
    pub layer_count: usize,
    pub layer_ids: Vec<i32>,
    pub duplicate_ids: Vec<i32>,
}

impl SvgDocument {
    /// Build a document from already extracted layers
    pub fn from_layers(source_file: PathBuf, layers: Vec<LayerNode>) -> Self {
        Self { source_file, layers }
    }

    /// Read and parse a drawing file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let document = Self::parse_str(&content, path)?;
        info!("Loaded {} layers from {}", document.layer_count(), path.display());
        Ok(document)
    }

    /// Parse drawing markup; `source_file` is only used for reporting
    pub fn parse_str<P: AsRef<Path>>(content: &str, source_file: P) -> Result<Self, LoadError> {
        let source_file = source_file.as_ref().to_path_buf();

        // Slicer output carries a DOCTYPE, which roxmltree refuses by default
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;

        let tree = roxmltree::Document::parse_with_options(content, options)
            .map_err(|e| LoadError::Format {
                path: source_file.clone(),
                message: e.to_string(),
            })?;

        // Entity references in the source would be undefined in a composite
        let declares_entities = content[..tree.root_element().range().start].contains("<!ENTITY");

        let mut layers = Vec::new();
        let groups = tree.descendants()
            .filter(|node| node.is_element() && is_layer_group(&content[node.range()]));

        for (position, node) in groups.enumerate() {
            let raw = node.attribute("id");
            let id = raw.and_then(LayerNode::parse_id).ok_or_else(|| LoadError::LayerId {
                path: source_file.clone(),
                position,
                raw: raw.map(str::to_string),
            })?;

            let markup = if declares_entities || !binds_only_header_namespaces(node) {
                debug!("Re-serializing layer {} from the parsed tree", id);
                serialize_layer(node)
            } else {
                content[node.range()].to_string()
            };
            layers.push(LayerNode::new(id, markup));
        }

        let document = Self { source_file, layers };

        let duplicates = document.duplicate_ids();
        if !duplicates.is_empty() {
            warn!(
                "Drawing {} repeats layer ids {:?}; only the first group of each is selectable",
                document.source_file.display(), duplicates
            );
        }
        debug!("Layer ids in document order: {:?}", document.layer_ids());

        Ok(document)
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn layers(&self) -> &[LayerNode] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// First layer whose id equals `id`
    pub fn find_layer(&self, id: i32) -> Option<&LayerNode> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Layer ids in document order
    pub fn layer_ids(&self) -> Vec<i32> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    /// Ids that label more than one group, ascending
    pub fn duplicate_ids(&self) -> Vec<i32> {
        let mut seen = HashSet::new();
        let duplicates: BTreeSet<i32> = self.layers.iter()
            .map(|layer| layer.id)
            .filter(|id| !seen.insert(*id))
            .collect();
        duplicates.into_iter().collect()
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            source_file: self.source_file.clone(),
            layer_count: self.layer_count(),
            layer_ids: self.layer_ids(),
            duplicate_ids: self.duplicate_ids(),
        }
    }
}

// @checks: Element source starts with the unprefixed layer tag
fn is_layer_group(markup: &str) -> bool {
    markup.strip_prefix('<')
        .and_then(|rest| rest.strip_prefix(LAYER_TAG))
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
}

fn is_header_binding(prefix: Option<&str>, uri: &str) -> bool {
    HEADER_NAMESPACES.iter().any(|(p, u)| *p == prefix && *u == uri)
}

fn scope_of(node: Node) -> Vec<Binding> {
    node.namespaces()
        .filter(|ns| ns.uri() != NS_XML_URI)
        .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
        .collect()
}

fn binds_only_header_namespaces(node: Node) -> bool {
    node.namespaces()
        .filter(|ns| ns.uri() != NS_XML_URI)
        .all(|ns| is_header_binding(ns.name(), ns.uri()))
}

/// Write a layer group from the parsed tree, with entities expanded and
/// every namespace the header lacks declared on the group itself
fn serialize_layer(node: Node) -> String {
    let outer: Vec<Binding> = HEADER_NAMESPACES.iter()
        .map(|(prefix, uri)| (prefix.map(str::to_string), uri.to_string()))
        .collect();
    let mut out = String::new();
    write_node(node, &outer, &mut out);
    out
}

fn write_node(node: Node, outer: &[Binding], out: &mut String) {
    match node.node_type() {
        NodeType::Element => write_element(node, outer, out),
        NodeType::Text => escape_into(node.text().unwrap_or_default(), false, out),
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(node.text().unwrap_or_default());
            out.push_str("-->");
        }
        NodeType::PI => {
            if let Some(pi) = node.pi() {
                out.push_str("<?");
                out.push_str(pi.target);
                if let Some(value) = pi.value {
                    out.push(' ');
                    out.push_str(value);
                }
                out.push_str("?>");
            }
        }
        NodeType::Root => {}
    }
}

fn write_element(node: Node, outer: &[Binding], out: &mut String) {
    let scope = scope_of(node);
    let tag = node.tag_name();
    let name = qualified_name(tag.namespace(), tag.name(), &scope, true);

    out.push('<');
    out.push_str(&name);

    for (prefix, uri) in scope.iter().filter(|binding| !outer.contains(binding)) {
        match prefix {
            Some(prefix) => {
                out.push_str(" xmlns:");
                out.push_str(prefix);
            }
            None => out.push_str(" xmlns"),
        }
        out.push_str("=\"");
        escape_into(uri, true, out);
        out.push('"');
    }

    for attribute in node.attributes() {
        out.push(' ');
        out.push_str(&qualified_name(attribute.namespace(), attribute.name(), &scope, false));
        out.push_str("=\"");
        escape_into(attribute.value(), true, out);
        out.push('"');
    }

    if !node.has_children() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    for child in node.children() {
        write_node(child, &scope, out);
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

// @returns: Name with the prefix bound to its namespace in `scope`
fn qualified_name(namespace: Option<&str>, local: &str, scope: &[Binding], is_element: bool) -> String {
    let Some(uri) = namespace else {
        return local.to_string();
    };
    if uri == NS_XML_URI {
        return format!("xml:{}", local);
    }
    // Attributes never take the default namespace
    if is_element && scope.iter().any(|(prefix, u)| prefix.is_none() && u == uri) {
        return local.to_string();
    }

    match scope.iter().find(|(prefix, u)| prefix.is_some() && u == uri) {
        Some((Some(prefix), _)) => format!("{}:{}", prefix, local),
        _ => local.to_string(),
    }
}

fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
