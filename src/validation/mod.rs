//! Pre-flight validation of a decoded document.
//!
//! Walks the same layers the exporter would and reports everything it would
//! skip or mangle, without touching any output. Used by `layerport
//! validate` and by `layerport export --validate`.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::classify::classify;
use crate::layout::BoundsResolver;
use crate::types::{BorderOrder, Document, LayerNode, NamingRules, MAX_DEPTH};

use checks::LayerContext;

/// Check every exported layer of `document`.
pub fn validate_document(document: &Document, rules: &NamingRules, order: BorderOrder) -> ValidationResult {
    let resolver = BoundsResolver::new(rules, order);
    let mut found = Vec::new();
    for layer in &document.layers {
        visit(layer, "", 0, rules, order, &resolver, &mut found);
    }

    let mut result = ValidationResult::new();
    for diagnostic in found {
        result.push(diagnostic);
    }
    result
}

fn visit(
    layer: &LayerNode,
    parent: &str,
    depth: usize,
    rules: &NamingRules,
    order: BorderOrder,
    resolver: &BoundsResolver,
    out: &mut Vec<Diagnostic>,
) {
    let path = if parent.is_empty() {
        layer.name.clone()
    } else {
        format!("{}/{}", parent, layer.name)
    };

    if depth > MAX_DEPTH {
        out.push(
            Diagnostic::error(
                "layerport::validate::depth",
                &path,
                format!("groups are nested deeper than {} levels", MAX_DEPTH),
            )
            .with_help("Flatten some of the enclosing groups"),
        );
        return;
    }

    let descriptor = classify(&layer.name, layer.kind, rules, order);
    if !layer.visible || descriptor.is_excluded() {
        return;
    }

    let ctx = LayerContext {
        layer,
        descriptor: &descriptor,
        path: &path,
    };
    checks::check_nine_slice_syntax(&ctx, out);
    checks::check_nine_slice_fit(&ctx, out);
    checks::check_raster(&ctx, out);
    // Deep trees are reported once, from the walk itself.
    if depth + layer_height(layer) <= MAX_DEPTH {
        checks::check_component(&ctx, resolver, out);
    }

    for child in &layer.children {
        visit(child, &path, depth + 1, rules, order, resolver, out);
    }
}

/// Levels of nesting below `layer`, capped just past the limit.
fn layer_height(layer: &LayerNode) -> usize {
    fn height(layer: &LayerNode, budget: usize) -> usize {
        if budget == 0 {
            return 0;
        }
        layer
            .children
            .iter()
            .map(|c| 1 + height(c, budget - 1))
            .max()
            .unwrap_or(0)
    }
    height(layer, MAX_DEPTH + 1)
}

/// Print diagnostics and a summary to stderr.
pub fn print_diagnostics(result: &ValidationResult) {
    for d in result.iter() {
        eprintln!("  {}", d);
        if let Some(help) = &d.help {
            eprintln!("    help: {}", help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();
    if errors > 0 {
        eprintln!("Validation failed: {} error(s), {} warning(s)", errors, warnings);
    } else if warnings > 0 {
        eprintln!("Validation passed ({} warning(s))", warnings);
    } else {
        eprintln!("Validation passed.");
    }
}
