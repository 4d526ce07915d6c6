//! The `preptest init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("preptest.toml").exists() {
        println!("preptest.toml already exists, skipping.");
    } else {
        std::fs::write("preptest.toml", SAMPLE_CONFIG)?;
        println!("Created preptest.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY or edit preptest.toml");
    println!("  2. Run: preptest check-config");
    println!("  3. Run: preptest test --topic \"Kinematics\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# preptest configuration

# Fetch the key from a config endpoint returning {"geminiApiKey": "..."}
# config_endpoint = "http://localhost:3000/api/config"

fade_out_ms = 500
fade_in_delay_ms = 50
sanitize_feedback = false

[gemini]
api_key = "${GEMINI_API_KEY}"
# model = "gemini-1.5-flash-latest"

[test]
default_subject = "Physics"
default_difficulty = "medium"
default_duration_minutes = 30
"#;
