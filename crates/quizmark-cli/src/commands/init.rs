//! The `quizmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizmark.toml").exists() {
        println!("quizmark.toml already exists, skipping.");
    } else {
        std::fs::write("quizmark.toml", SAMPLE_CONFIG)?;
        println!("Created quizmark.toml");
    }

    std::fs::create_dir_all("suites")?;
    let example_path = std::path::Path::new("suites/example.json");
    if example_path.exists() {
        println!("suites/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SUITE)?;
        println!("Created suites/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit suites/example.json with your own questions");
    println!("  2. Run: quizmark validate --suite suites/example.json");
    println!("  3. Run: quizmark play --suite suites/example.json --select 0:1:B --select 0:2:A");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

output_dir = "./quizmark-results"

# Merged over the conf of every test in a suite.
[test_defaults]
stopOnSuccess = true
digits = 2
precision = 2
"#;

const EXAMPLE_SUITE: &str = r#"{
  "tests": [
    {
      "conf": { "digits": 2, "precision": 2, "stopOnSuccess": true, "charset": "utf-8" },
      "questions": [
        {
          "conf": { "num": 1, "solution": 2, "txt": "How many magnitudes appear in Ohm's law?" },
          "answers": [
            { "name": "A", "txt": "One" },
            { "name": "B", "txt": "Three" },
            { "name": "C", "txt": "Zero" }
          ]
        },
        {
          "conf": { "num": 2, "solution": 1, "txt": "Which expression is Ohm's law?" },
          "answers": [
            { "name": "A", "txt": "V = I * R" },
            { "name": "B", "txt": "I = V * R" },
            { "name": "C", "txt": "V = I / R" }
          ]
        }
      ]
    }
  ]
}
"#;
