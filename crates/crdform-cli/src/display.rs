//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Validation issues grouped by configuration file
//! - Plans with colored line diffs
//! - Field trees of resource schemas

use console::style;
use crdform_core::{FieldSchema, Shape, ValidationIssue};
use crdform_provider::{DiffContent, LineType, Plan};

/// Validation issues for one configuration file
#[derive(Debug)]
pub struct ValidationReport<'a> {
    pub file: String,
    pub issues: &'a [ValidationIssue],
}

impl<'a> ValidationReport<'a> {
    pub fn new(file: impl Into<String>, issues: &'a [ValidationIssue]) -> Self {
        Self {
            file: file.into(),
            issues,
        }
    }

    /// Display issues under the file name
    pub fn display(&self) {
        println!();
        println!("{}", style(&self.file).cyan().bold());

        for issue in self.issues {
            println!(
                "  {} {} at {}",
                style("✗").red(),
                issue.message,
                style(&issue.path).dim()
            );
        }
    }

    /// Print summary line
    pub fn print_summary(&self) {
        println!(
            "{} Found {}",
            style("✗").red().bold(),
            pluralize(self.issues.len(), "error", "errors")
        );
    }
}

/// Print a plan for one address
pub fn display_plan(address: &str, plan: &Plan) {
    match plan {
        Plan::Create { manifest } => {
            println!("{} {} will be created", style("+").green().bold(), style(address).bold());
            for line in manifest.lines() {
                println!("  {}", style(format!("+ {}", line)).green());
            }
        }
        Plan::NoChange => {
            println!("{} {} is up to date", style("✓").green(), style(address).bold());
        }
        Plan::Update { diff, .. } => {
            println!("{} {} will be updated", style("~").yellow().bold(), style(address).bold());
            display_diff(diff);
        }
    }
}

/// Print a line diff, colored by line type
pub fn display_diff(diff: &DiffContent) {
    for line in &diff.lines {
        match line.line_type {
            LineType::Added => println!("  {}", style(format!("+ {}", line.content)).green()),
            LineType::Removed => println!("  {}", style(format!("- {}", line.content)).red()),
            LineType::Context => println!("  {}", style(format!("  {}", line.content)).dim()),
        }
    }
}

/// Print the field tree of a schema
pub fn display_fields(fields: &[FieldSchema], depth: usize) {
    for field in fields {
        let mut flags = Vec::new();
        if field.required {
            flags.push("required");
        }
        if field.nullable {
            flags.push("nullable");
        }

        let key = if field.key() != field.name {
            format!(" ({})", field.key())
        } else {
            String::new()
        };
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        println!(
            "{}{}{}: {}{}",
            "  ".repeat(depth + 1),
            style(&field.name).bold(),
            style(key).dim(),
            style(field.shape.describe()).cyan(),
            style(flags).yellow()
        );

        if let Some(nested) = object_fields(&field.shape) {
            display_fields(nested, depth + 1);
        }
    }
}

/// Fields of an object, looking through lists and maps
fn object_fields(shape: &Shape) -> Option<&[FieldSchema]> {
    match shape {
        Shape::Object { fields } => Some(fields),
        Shape::List { items } => object_fields(items),
        Shape::Map { values } => object_fields(values),
        _ => None,
    }
}

/// Format count with proper pluralization
pub fn pluralize(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
