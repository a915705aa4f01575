//! `kiln requires` handler.

use anyhow::Result;
use colored::*;
use serde::Serialize;

use crate::config::Workspace;
use crate::recipe::Recipe;
use crate::ui;

#[derive(Debug, Serialize, PartialEq)]
pub struct RequirementListing {
    pub recipe: String,
    pub active: Vec<String>,
    pub disabled: Vec<String>,
}

impl From<&Recipe> for RequirementListing {
    fn from(recipe: &Recipe) -> Self {
        Self {
            recipe: recipe.name().to_string(),
            active: recipe.active_requirements().map(|r| r.reference()).collect(),
            disabled: recipe.disabled_requirements().map(|r| r.reference()).collect(),
        }
    }
}

pub fn list_requirements(ws: &Workspace, recipe: Option<&str>, json: bool) -> Result<()> {
    let recipes = match recipe {
        Some(name) => vec![ws.recipe(name)?],
        None => ws.recipes()?,
    };

    if json {
        let listings: Vec<RequirementListing> = recipes.iter().map(RequirementListing::from).collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    let mut table = ui::Table::new(&["Recipe", "Requirement", "Status"]);
    for recipe in &recipes {
        for req in recipe.requirements() {
            let status = if req.active {
                "active".green().to_string()
            } else {
                "disabled".dimmed().to_string()
            };
            table.add_row(vec![recipe.name().to_string(), req.reference(), status]);
        }
    }

    if table.is_empty() {
        println!("{} No requirements declared.", "ℹ".blue());
    } else {
        table.print();
    }
    Ok(())
}
