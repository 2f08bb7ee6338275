//! Inspect command: show how layer names classify without exporting.

use std::path::PathBuf;

use clap::Args;

use crate::classify::classify;
use crate::discovery::load_document;
use crate::error::Result;
use crate::types::{BorderOrder, LayerNode, NamingRules, NodeDescriptor};

use super::ConfigArgs;

/// Print how each layer name is classified
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Decoded document
    pub document: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Include hidden layers and excluded subtrees
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: InspectArgs) -> Result<()> {
    let config = args.config.resolve(&PathBuf::from("."))?;
    let document = load_document(&args.document)?;

    println!("{} ({}x{})", document.name, document.width, document.height);
    for line in describe_layers(&document.layers, &config.naming, config.format.border_order(), args.all) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per layer, indented by depth.
pub fn describe_layers(layers: &[LayerNode], rules: &NamingRules, order: BorderOrder, all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack: Vec<(&LayerNode, usize)> = layers.iter().rev().map(|l| (l, 0)).collect();

    while let Some((layer, depth)) = stack.pop() {
        let descriptor = classify(&layer.name, layer.kind, rules, order);
        let shown = all || (layer.visible && !descriptor.is_excluded());
        if !shown {
            continue;
        }
        lines.push(format!("{}{}", "  ".repeat(depth + 1), describe(layer, &descriptor)));
        stack.extend(layer.children.iter().rev().map(|c| (c, depth + 1)));
    }
    lines
}

fn describe(layer: &LayerNode, d: &NodeDescriptor) -> String {
    let mut out = format!("{} -> {} [{}]", layer.name, d.export_name, d.node_type);
    if d.instance_name != d.export_name {
        out.push_str(&format!(" as {}", d.instance_name));
    }

    let flags: Vec<&str> = [
        (d.flags.common, "common"),
        (d.flags.exported, "exported"),
        (d.flags.no_export, "skip"),
        (d.flags.img, "img"),
        (!layer.visible, "hidden"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, name)| *name)
    .collect();
    if !flags.is_empty() {
        out.push_str(&format!(" {{{}}}", flags.join(", ")));
    }

    if let Some(slice) = d.nine_slice {
        let b = slice.border;
        out.push_str(&format!(
            " 9-slice {}x{} t{} r{} b{} l{}",
            slice.width, slice.height, b.top, b.right, b.bottom, b.left
        ));
    }
    out
}
