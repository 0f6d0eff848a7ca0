//! The `mdexam init` command.

use std::path::Path;

use anyhow::{Context, Result};

use mdexam_core::config::default_config_toml;

pub fn execute() -> Result<()> {
    if Path::new("mdexam.toml").exists() {
        println!("mdexam.toml already exists, skipping.");
    } else {
        std::fs::write("mdexam.toml", default_config_toml())
            .context("failed to write mdexam.toml")?;
        println!("Created mdexam.toml");
    }

    std::fs::create_dir_all("exams").context("failed to create exams/")?;
    let sample_path = Path::new("exams/sample.md");
    if sample_path.exists() {
        println!("exams/sample.md already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_EXAM).context("failed to write exams/sample.md")?;
        println!("Created exams/sample.md");
    }

    println!("\nNext steps:");
    println!("  1. Run: mdexam validate exams/sample.md");
    println!("  2. Run: mdexam add exams/sample.md");
    println!("  3. Run: mdexam take \"Sample Exam\"");

    Ok(())
}

const SAMPLE_EXAM: &str = r#"# Sample Exam
Time: 00:10:00

## Which planet is closest to the sun?
- [x] Mercury
- [ ] Venus
- [ ] Mars

## Which of these are prime numbers?
- [x] 2
- [x] 3
- [ ] 4
- [x] 5

## What does HTTP stand for?
- [ ] High Transfer Text Protocol
- [x] HyperText Transfer Protocol
- [ ] Hyperlink Text Transport Process
"#;
