//! Actions command implementation

use anyhow::Result;
use quill::actions;

pub fn execute() -> Result<()> {
    println!("\nKnown Actions:");
    println!("{}", "=".repeat(40));
    for action in actions::ALL {
        println!("{}", action);
    }
    println!("\nTotal: {} action(s)", actions::ALL.len());
    Ok(())
}
