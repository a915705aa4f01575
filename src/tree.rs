//! Requirement tree visualization.
//!
//! `kiln tree` prints each recipe with its declared requirements. Disabled
//! entries are listed too, dimmed, so they can be found without reading the
//! manifest.
//!
//! ```text
//! compressor (Compressor)
//! ├── quill 10.0.1
//! ├── tomlplusplus 3.4.0
//! ├── assimp 6.0.2 (disabled)
//! └── glm 1.0.1 (disabled)
//! ```

use crate::recipe::Recipe;
use colored::*;

pub fn render_tree(recipe: &Recipe) -> String {
    let mut out = format!(
        "{} ({})\n",
        recipe.name().bold().cyan(),
        recipe.source_dir().display()
    );

    let reqs = recipe.requirements();
    if reqs.is_empty() {
        out.push_str("└── (no requirements)\n");
        return out;
    }

    for (i, req) in reqs.iter().enumerate() {
        let prefix = if i == reqs.len() - 1 { "└──" } else { "├──" };
        if req.active {
            out.push_str(&format!("{} {} {}\n", prefix, req.name.bold(), req.version.green()));
        } else {
            let line = format!("{} {} (disabled)", req.name, req.version);
            out.push_str(&format!("{} {}\n", prefix, line.dimmed()));
        }
    }
    out
}

pub fn print_tree(recipes: &[Recipe]) {
    for (i, recipe) in recipes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", render_tree(recipe));
    }
}
