//! Import command implementation

use std::path::Path;

use anyhow::Result;

use super::read_table;

pub fn cmd_import(file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let (_, summary) = read_table(file)?;

    println!("   Rows:       {}", summary.rows);
    println!("   Months:     {}", summary.months_detected);
    println!("   Categories: {}", summary.categories_detected);
    println!("✅ File is ready for analysis");

    Ok(())
}
