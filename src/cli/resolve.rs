//! `starter resolve`: compute the required closure of a local catalog.
//!
//! Useful for checking a template repository before publishing it. Output
//! lists the required units by kind and any circular dependencies found;
//! `--tree` shows how each root reaches its dependencies.
//!
//! ```bash
//! starter resolve --catalog ./templates.json
//! starter resolve --catalog ./templates.json --root stencils/web --tree
//! starter resolve --catalog ./templates.json --format json
//! ```

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::core::{QualifiedName, UnitKind};
use crate::resolver::{
    Closure, DependencyGraph, compute_required_closure, initial_unit_names,
};

/// Output formats for `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// The closure as JSON
    Json,
}

/// Resolve the required closure of a template catalog.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Path to `templates.json`.
    #[arg(long)]
    catalog: PathBuf,

    /// Resolve from these units instead of every stencil with `min_usage > 0`.
    #[arg(long = "root", value_name = "TYPE/NAME")]
    roots: Vec<String>,

    /// Print each root's dependency tree.
    #[arg(long)]
    tree: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Fail when the catalog has circular dependencies.
    #[arg(long)]
    deny_cycles: bool,
}

impl ResolveCommand {
    /// Run the command.
    pub fn execute(self, quiet: bool) -> Result<()> {
        let catalog = Catalog::load(&self.catalog)?;
        let roots = self.roots(&catalog)?;

        let mut closure = compute_required_closure(&catalog, &roots)?;
        if self.deny_cycles {
            closure = closure.deny_cycles()?;
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&closure)?),
            OutputFormat::Text if !quiet => {
                if self.tree {
                    print_trees(&catalog, &closure)?;
                }
                print_closure(&closure);
            }
            OutputFormat::Text => {}
        }

        Ok(())
    }

    fn roots(&self, catalog: &Catalog) -> Result<Vec<QualifiedName>> {
        if self.roots.is_empty() {
            return Ok(initial_unit_names(catalog));
        }

        let mut roots = Vec::with_capacity(self.roots.len());
        for raw in &self.roots {
            let root = QualifiedName::parse(raw)?;
            catalog.dependencies_of(&root)?;
            roots.push(root);
        }
        Ok(roots)
    }
}

fn print_trees(catalog: &Catalog, closure: &Closure) -> Result<()> {
    let graph = DependencyGraph::from_catalog(catalog)?;
    for root in &closure.roots {
        print!("{}", graph.to_tree_string(root));
        println!();
    }
    Ok(())
}

fn print_closure(closure: &Closure) {
    println!(
        "{} {} required unit(s) from {} root(s)",
        "Resolved".green().bold(),
        closure.len(),
        closure.roots.len()
    );

    for kind in UnitKind::ALL {
        let names: Vec<&str> = closure.required_of(kind).map(QualifiedName::name).collect();
        if names.is_empty() {
            continue;
        }
        println!("\n{}:", kind.prefix().bold());
        for name in names {
            println!("  {name}");
        }
    }

    if !closure.cycles.is_empty() {
        println!();
        for cycle in &closure.cycles {
            println!("{} {cycle}", "warning:".yellow());
        }
    }
}
