//! Sideways text diagram of a tree.
//!
//! Larger keys print above smaller ones and each child hangs off its parent
//! on a `/` or `\` diagonal, so reading the output with the head tilted left
//! shows the tree's shape.
//!
//! ```text
//! +----UPPER-+
//! |     /-30 |
//! | -20      |
//! |     \-10 |
//! +----LOWER-+
//! ```

use std::fmt::{Display, Write};

use crate::tree::{AvlTree, NodeId};

/// Columns of indentation per tree level.
const INDENT: usize = 4;

/// Narrowest frame drawn, so the border labels always fit.
const MIN_FRAME_WIDTH: usize = 5;

/// Options controlling [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Number of levels drawn; deeper nodes are elided.
    pub max_depth: u32,
    /// Box the diagram between UPPER and LOWER borders.
    pub frame: bool,
    /// Print each node's value after its key.
    pub show_values: bool,
    /// Widest framed line, in characters.
    pub max_width: usize,
}

impl RenderOptions {
    /// Default number of levels drawn.
    pub const DEFAULT_MAX_DEPTH: u32 = 7;
    /// Default frame width cap.
    pub const DEFAULT_MAX_WIDTH: usize = 160;
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            frame: true,
            show_values: false,
            max_width: Self::DEFAULT_MAX_WIDTH,
        }
    }
}

/// Render `tree` as a sideways diagram.
#[must_use]
pub fn render<K, V>(tree: &AvlTree<K, V>, options: &RenderOptions) -> String
where
    K: Display,
    V: Display,
{
    let lines = diagram_lines(tree, options);
    if options.frame {
        framed(&lines, options.max_width)
    } else {
        lines.join("\n")
    }
}

/// One subtree's diagram: lines above the node, the node's own line, and
/// lines below it.
struct Block {
    up: Vec<String>,
    mid: String,
    down: Vec<String>,
}

impl Block {
    fn leaf(mid: &str) -> Self {
        Self {
            up: Vec::new(),
            mid: mid.to_string(),
            down: Vec::new(),
        }
    }
}

fn diagram_lines<K, V>(tree: &AvlTree<K, V>, options: &RenderOptions) -> Vec<String>
where
    K: Display,
    V: Display,
{
    let Some(root) = tree.root else {
        return vec!["- EMPTY".to_string()];
    };

    let Block { mut up, mid, down } = subtree(tree, root, options.max_depth.max(1), options);
    up.push(mid);
    up.extend(down);
    up
}

/// Lay out the subtree under `id`, drawing `levels` levels before eliding.
///
/// The right subtree goes above the node and the left subtree below it. A
/// `/` or `\` diagonal runs from the node's line to each child's line.
fn subtree<K, V>(
    tree: &AvlTree<K, V>,
    id: NodeId,
    levels: u32,
    options: &RenderOptions,
) -> Block
where
    K: Display,
    V: Display,
{
    if levels == 0 {
        return Block::leaf("- ...");
    }

    let node = &tree.nodes[id];
    let mut block = Block::leaf(&format!("-{}", node.key));
    if options.show_values {
        let _ = write!(block.mid, " (Val= {})", node.value);
    }

    if let Some(right) = node.right {
        let child = subtree(tree, right, levels - 1, options);
        let below = child.down.len();
        let pad = " ".repeat(below + INDENT);
        block.up.extend(child.up.iter().map(|line| format!("{pad}{line}")));
        block.up.push(format!("{pad}/{}", child.mid));
        block.up.extend(child.down.iter().enumerate().map(|(i, line)| {
            format!("{}/{}{line}", " ".repeat(below - i + INDENT - 1), " ".repeat(i + 1))
        }));
    }

    if let Some(left) = node.left {
        let child = subtree(tree, left, levels - 1, options);
        let above = child.up.len();
        let pad = " ".repeat(above + INDENT);
        block.down.extend(child.up.iter().enumerate().map(|(i, line)| {
            format!("{}\\{}{line}", " ".repeat(i + INDENT), " ".repeat(above - i))
        }));
        block.down.push(format!("{pad}\\{}", child.mid));
        block.down.extend(child.down.iter().map(|line| format!("{pad}{line}")));
    }

    block
}

fn framed(lines: &[String], max_width: usize) -> String {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = longest.min(max_width).max(MIN_FRAME_WIDTH);

    let mut out = String::new();
    let _ = writeln!(out, "+-{:->width$}-+", "UPPER");
    for line in lines {
        let clipped: String = line.chars().take(width).collect();
        let _ = writeln!(out, "| {clipped:<width$} |");
    }
    let _ = writeln!(out, "+-{:->width$}-+", "LOWER");
    out
}
