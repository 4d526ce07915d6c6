//! The `preptest generate` command: an untimed practice set with solutions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use preptest_core::error::EngineError;
use preptest_core::practice::{parse_practice_set, PracticeQuestion, PracticeRequest};
use preptest_core::traits::QuestionService;
use preptest_providers::config::{create_service, load_config_from, resolve_api_key};
use preptest_providers::mock::MockService;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    subject: Option<String>,
    topic: String,
    exam: String,
    count: usize,
    solutions: bool,
    mock: bool,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let request = PracticeRequest::new(
        subject
            .or_else(|| config.test.default_subject.clone())
            .unwrap_or_default(),
        topic,
        exam,
        count,
    );
    request.validate()?;

    let service: Arc<dyn QuestionService> = if mock {
        Arc::new(MockService::new())
    } else {
        let key = resolve_api_key(&config).await.map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        })?;
        create_service(&config, &key)?
    };

    eprintln!(
        "Generating {} {} questions on {} / {}...",
        request.count, request.exam, request.subject, request.topic
    );

    let text = service
        .generate_practice(&request)
        .await
        .map_err(|e| {
            let e = EngineError::from_service(e);
            let message = match e {
                EngineError::NoContent(_) => {
                    "No content received from API. It may have been blocked."
                }
                _ => "Failed to generate questions. Please try again.",
            };
            anyhow::Error::new(e).context(message)
        })?;
    let questions = parse_practice_set(&text)?;
    tracing::info!(
        service = service.name(),
        requested = request.count,
        received = questions.len(),
        "practice set generated"
    );

    print_practice_set(&questions, solutions);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&questions)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write practice set: {}", path.display()))?;
        eprintln!("Saved practice set: {}", path.display());
    }

    Ok(())
}

fn print_practice_set(questions: &[PracticeQuestion], solutions: bool) {
    for q in questions {
        println!("\nQuestion {}", q.number);
        println!("{}", plain_text(&q.body));
        match (&q.solution, solutions) {
            (Some(solution), true) => println!("\nAnswer\n{}", plain_text(solution)),
            (Some(_), false) => println!("(answer hidden, rerun with --solutions)"),
            (None, _) => println!("(no solution given)"),
        }
    }
}

/// Drop markdown emphasis markers for terminal output.
fn plain_text(text: &str) -> String {
    text.replace("**", "").replace('`', "")
}
