//! Human-readable text rendering of [`ValidationResult`]s and lineage trees.
//!
//! The output is stable plain text for terminals and logs. It is not a
//! canonical format; only the JSON forms are normative.

use crate::genetics::LineageNode;
use crate::result::ValidationResult;

/// Render a validation result, one error per line with aligned columns.
///
/// ```text
/// INVALID  2 errors
/// ─────────────────
/// thc_range                                 OUT_OF_RANGE     min 25 exceeds max 20
/// genetics_profile.sources[0].confidence    INVALID_ENUM     "sure" is not allowed; ...
/// ```
pub fn render_result(result: &ValidationResult) -> String {
    if result.is_valid() {
        return "VALID\n".to_string();
    }

    let errors = result.errors();
    let header = format!(
        "INVALID  {} error{}",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    let rule = "─".repeat(header.chars().count());
    let mut out = format!("{header}\n{rule}\n");

    let path_width = errors.iter().map(|e| e.path().chars().count()).max().unwrap_or(0);
    let code_width = errors.iter().map(|e| e.code().as_str().len()).max().unwrap_or(0);
    for e in errors {
        out.push_str(&format!(
            "{:path_width$}  {:code_width$}  {}\n",
            e.path(),
            e.code().as_str(),
            e.message()
        ));
    }
    out
}

/// Render a lineage forest as an indented tree, roots first.
///
/// ```text
/// Blueberry  mother, gen 0
/// ├── Afghani  parent, gen 1  [2 sources]
/// └── Thai  parent, gen 1
/// ```
pub fn render_lineage(roots: &[LineageNode]) -> String {
    let mut out = String::new();
    // (node, indent carried by ancestors, connector for this line)
    let mut stack: Vec<(&LineageNode, String, &str)> =
        roots.iter().rev().map(|r| (r, String::new(), "")).collect();

    while let Some((node, indent, connector)) = stack.pop() {
        out.push_str(&indent);
        out.push_str(connector);
        out.push_str(&node_label(node));
        out.push('\n');

        let child_indent = match connector {
            "" => indent,
            "└── " => format!("{indent}    "),
            _ => format!("{indent}│   "),
        };
        let last = node.children().len().saturating_sub(1);
        for (i, child) in node.children().iter().enumerate().rev() {
            let connector = if i == last { "└── " } else { "├── " };
            stack.push((child, child_indent.clone(), connector));
        }
    }
    out
}

// --- helpers -----------------------------------------------------------------

fn node_label(node: &LineageNode) -> String {
    let mut label = format!(
        "{}  {}, gen {}",
        node.strain_ref(),
        node.relationship(),
        node.generation_depth()
    );
    match node.sources().len() {
        0 => {}
        1 => label.push_str("  [1 source]"),
        n => label.push_str(&format!("  [{n} sources]")),
    }
    label
}

// --- tests -------------------------------------------------------------------
