use colored::Colorize;
use packtree::Tree;

/// One line per entry in pre-order, directories suffixed with `/` and
/// highlighted, followed by a summary line.
pub fn render(tree: &Tree) -> Vec<String> {
    let mut lines: Vec<String> = tree
        .walk()
        .map(|node| {
            if node.is_directory() {
                format!("{}/", node.full_path()).blue().bold().to_string()
            } else {
                format!("{}  {}", node.full_path(), format_size(node.size()))
            }
        })
        .collect();

    let root = tree.root();
    lines.push(
        format!(
            "{} entries, {}",
            tree.len() - 1,
            format_size(root.total_size())
        )
        .dimmed()
        .to_string(),
    );
    lines
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
