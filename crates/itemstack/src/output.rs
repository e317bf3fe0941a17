//! Terminal rendering of the stack plan.

use std::fmt::Write;

use anyhow::Result;

use itemstack_core::stack::{EdgeKind, Stack};

/// Tokyo Night color palette
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const TKN_GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const TKN_YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const TKN_BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
    pub const TKN_CYAN: &str = "\x1b[38;2;125;207;255m"; // #7dcfff
}

fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, colors::RESET)
}

/// Prints the plan. `anstream` strips the colors when stdout is not a
/// terminal.
pub fn print_plan(stack: &Stack) -> Result<()> {
    anstream::print!("{}", render_plan(stack)?);
    Ok(())
}

/// Resources in creation order, each followed by its direct dependencies.
pub fn render_plan(stack: &Stack) -> Result<String> {
    let graph = stack.graph()?;
    let order = stack.creation_order()?;

    let mut out = String::new();
    writeln!(
        out,
        "{} {}",
        paint(colors::TKN_BLUE, "Stack"),
        stack.config().stack_name
    )?;

    for (position, resource) in order.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {} {}",
            position + 1,
            paint(colors::TKN_GREEN, &resource.logical_id),
            paint(colors::TKN_CYAN, resource.resource.type_name())
        )?;

        for (dependency, kind) in graph.dependencies_of(&resource.logical_id)? {
            let label = match kind {
                EdgeKind::Explicit => paint(colors::TKN_YELLOW, "DependsOn"),
                EdgeKind::Implicit => "ref".to_string(),
            };
            writeln!(out, "       <- {dependency} ({label})")?;
        }
    }

    Ok(out)
}
