//! Layer-name classification.
//!
//! Turns a raw layer name into a [`NodeDescriptor`] by peeling off, in
//! order: the shared prefix, the no-export suffix, one role suffix
//! (loader/input/rich-text/image), a nine-slice directive, and finally a
//! component prefix. All conventions except the nine-slice syntax come from
//! [`NamingRules`]. Classification is a pure function of its inputs.

mod nine_slice;

use crate::types::{
    BorderOrder, LayerKind, NamingRules, NodeDescriptor, NodeFlags, NodeType,
};

pub use nine_slice::{extract_nine_slice, has_directive_marker, DIRECTIVE_MARKER};

/// Role suffixes are mutually exclusive; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Plain,
    Loader,
    Input,
    RichText,
    Img,
}

/// Classify a layer name under the given rules.
pub fn classify(
    raw_name: &str,
    kind: LayerKind,
    rules: &NamingRules,
    order: BorderOrder,
) -> NodeDescriptor {
    let mut flags = NodeFlags::default();
    let mut name = raw_name.trim();

    if let Some(rest) = strip_prefix_rule(name, &rules.common_prefix) {
        flags.common = true;
        name = rest;
    }

    if let Some(rest) = strip_suffix_rule(name, &rules.no_export_suffix) {
        flags.no_export = true;
        name = rest;
    }

    let role_suffixes = [
        (&rules.loader_suffix, Role::Loader),
        (&rules.input_suffix, Role::Input),
        (&rules.rich_text_suffix, Role::RichText),
        (&rules.image_suffix, Role::Img),
    ];
    let mut role = Role::Plain;
    for (suffix, candidate) in role_suffixes {
        if let Some(rest) = strip_suffix_rule(name, suffix) {
            role = candidate;
            name = rest;
            break;
        }
    }
    flags.img = role == Role::Img;

    let (remainder, nine_slice) = match extract_nine_slice(name, order) {
        Some((stripped, slice)) => (stripped, Some(slice)),
        None => (name.to_string(), None),
    };

    for (prefix, rule) in rules.component_prefixes() {
        let Some(rest) = remainder
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix('$'))
        else {
            continue;
        };

        flags.exported = true;
        let pascal = format!("{}{}", pascal_case(&rule.tag), pascal_case(rest));
        let export_name = if flags.common {
            format!("{}{}", rules.common_file_prefix, pascal)
        } else {
            pascal.clone()
        };

        return NodeDescriptor {
            export_name,
            instance_name: camel_case(&pascal),
            node_type: NodeType::Component {
                engine_type: rule.engine_type.clone(),
                tag: rule.tag.clone(),
            },
            flags,
            nine_slice,
        };
    }

    let mut export_name = sanitize(&remainder);
    if export_name.is_empty() {
        export_name = "unnamed".to_string();
    }

    let node_type = match (kind, role) {
        (LayerKind::Text, Role::Input) => NodeType::InputText,
        (LayerKind::Text, Role::RichText) => NodeType::RichText,
        (LayerKind::Text, _) => NodeType::Text,
        (_, Role::Loader) => NodeType::Loader,
        (LayerKind::Group, Role::Img) => NodeType::Image,
        (LayerKind::Group, _) => NodeType::Group,
        _ => NodeType::Image,
    };

    NodeDescriptor {
        instance_name: export_name.clone(),
        export_name,
        node_type,
        flags,
        nine_slice,
    }
}

fn strip_prefix_rule<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    name.strip_prefix(prefix).map(str::trim_start)
}

fn strip_suffix_rule<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() {
        return None;
    }
    name.strip_suffix(suffix).map(str::trim_end)
}

/// Replace characters that are invalid in file names and collapse whitespace.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join("_")
}

fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// `start game` -> `StartGame`. Inner capitals are preserved.
pub fn pascal_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in words(s) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// `StartGame` -> `startGame`.
pub fn camel_case(s: &str) -> String {
    let pascal = pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
