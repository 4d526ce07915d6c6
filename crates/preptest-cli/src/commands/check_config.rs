//! The `preptest check-config` command.

use std::path::PathBuf;

use anyhow::Result;

use preptest_providers::config::{load_config_from, resolve_api_key};
use preptest_providers::gemini::DEFAULT_MODEL;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    println!(
        "Model: {}",
        config.gemini.model.as_deref().unwrap_or(DEFAULT_MODEL)
    );
    if let Some(base_url) = &config.gemini.base_url {
        println!("Base URL: {base_url}");
    }
    match &config.config_endpoint {
        Some(endpoint) => println!("Key source: {endpoint}"),
        None => println!("Key source: config file / GEMINI_API_KEY"),
    }
    println!(
        "Defaults: {} / {} / {} min",
        config.test.default_subject.as_deref().unwrap_or("(none)"),
        config.test.default_difficulty,
        config.test.default_duration_minutes
    );
    println!(
        "Feedback: {}",
        if config.sanitize_feedback {
            "escaped"
        } else {
            "html"
        }
    );

    resolve_api_key(&config).await.map_err(|e| {
        let message = e.user_message();
        anyhow::Error::new(e).context(message)
    })?;
    println!("API key: OK");

    Ok(())
}
