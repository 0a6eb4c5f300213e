use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader};

use founder_onboard::api::{BackendApi, HttpBackend, SessionToken};
use founder_onboard::config::{DraftPolicy, OnboardConfig};
use founder_onboard::dashboard::Dashboard;
use founder_onboard::submit::{SubmissionCheckpoint, SubmissionOrchestrator, SubmissionOutcome};
use founder_onboard::upload::FileUploadManager;
use founder_onboard::wizard::{
    DraftStore, FieldKind, FieldValue, StepController, StepDefinition, StepId, validate_step,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = OnboardConfig::from_env()?;

    let token = SessionToken::from_env("ONBOARD_SESSION_TOKEN").unwrap_or_else(|_| {
        eprintln!("Error: ONBOARD_SESSION_TOKEN not set");
        eprintln!("  export ONBOARD_SESSION_TOKEN=sess-...");
        std::process::exit(1);
    });

    eprintln!("🏦 Founder Onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base_url);
    eprintln!(
        "   Uploads: max {} files, {} MiB each",
        config.max_files_per_step,
        config.per_file_limit_bytes / (1024 * 1024)
    );
    eprintln!("   Type 'help' for commands. Ctrl-C aborts an in-flight submit.\n");

    let backend: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(&config, token)?);
    let uploader = FileUploadManager::new(&config);
    let orchestrator = SubmissionOrchestrator::new(Arc::clone(&backend), &config);
    let dashboard = Dashboard::new(Arc::clone(&backend));

    // Abort in-flight submission on Ctrl-C instead of killing the process.
    let abort = orchestrator.abort_handle();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            eprintln!("\n⚠️  Abort requested");
            abort.abort();
        }
    });

    let mut draft = match &config.draft_policy {
        DraftPolicy::File(path) => match DraftStore::load_from(path).await? {
            Some(saved) => {
                eprintln!("   Draft: resumed from {}", path.display());
                saved
            }
            None => DraftStore::new(),
        },
        DraftPolicy::Memory => DraftStore::new(),
    };
    let mut controller = StepController::new();
    let mut checkpoint = SubmissionCheckpoint::new();

    let stdin = tokio::io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    print_step(&controller, &draft);
    eprint!("> ");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        let mut parts = line.splitn(3, ' ');
        let command = parts.next().unwrap_or_default();

        match command {
            "help" => print_help(),
            "show" => print_step(&controller, &draft),
            "set" => {
                let (field, value) = (parts.next(), parts.next());
                match (controller.current_step(), field, value) {
                    (Some(step), Some(field), Some(value)) => {
                        set_field(&mut draft, step, field, value);
                        print_step(&controller, &draft);
                    }
                    (None, ..) => eprintln!("Already submitted."),
                    _ => eprintln!("Usage: set <field> <value>"),
                }
            }
            "unset" => match (controller.current_step(), parts.next()) {
                (Some(step), Some(field)) => {
                    draft.remove_field(step, field);
                    print_step(&controller, &draft);
                }
                _ => eprintln!("Usage: unset <field>"),
            },
            "next" => match controller.go_next(&draft) {
                Ok(_) => print_step(&controller, &draft),
                Err(e) => eprintln!("❌ {e}"),
            },
            "back" => match controller.go_back() {
                Ok(_) => print_step(&controller, &draft),
                Err(e) => eprintln!("❌ {e}"),
            },
            "goto" => match parts.next().and_then(StepId::parse) {
                Some(step) => match controller.go_to(step, &draft) {
                    Ok(_) => print_step(&controller, &draft),
                    Err(e) => eprintln!("❌ {e}"),
                },
                None => eprintln!("Usage: goto <company-info|kyc|financials|documents|review>"),
            },
            "attach" => match parts.next() {
                Some(path) => {
                    let accepted = draft.documents().len();
                    match uploader.screen_path(std::path::Path::new(path), accepted).await {
                        Ok(candidate) => {
                            let name = candidate.file_name.clone();
                            match draft.attach_document(candidate) {
                                Ok(()) => eprintln!("📎 Attached {name}"),
                                Err(e) => eprintln!("❌ {e}"),
                            }
                        }
                        Err(e) => eprintln!("❌ Could not read {path}: {e}"),
                    }
                }
                None => eprintln!("Usage: attach <path>"),
            },
            "detach" => match parts.next() {
                Some(name) if draft.detach_document(name) => eprintln!("Removed {name}"),
                Some(name) => eprintln!("No attached file named {name}"),
                None => eprintln!("Usage: detach <file-name>"),
            },
            "submit" => {
                if controller.is_submitted() {
                    eprintln!("Already submitted.");
                } else {
                    submit(&orchestrator, &mut draft, &mut controller, &mut checkpoint).await;
                }
            }
            "score" => match dashboard.fetch_score().await {
                Ok(Some(score)) => {
                    eprintln!("📈 Investability score: {}/100", score.score);
                    for component in &score.components {
                        eprintln!("   {} → {}", component.name, component.score);
                    }
                }
                Ok(None) => eprintln!("No score yet — complete onboarding first."),
                Err(e) => eprintln!("❌ {e}"),
            },
            "docs" => match dashboard.list_documents().await {
                Ok(docs) if docs.is_empty() => eprintln!("No documents uploaded yet."),
                Ok(docs) => {
                    for doc in docs {
                        eprintln!("   {} ({} bytes)", doc.file_name, doc.size_bytes);
                    }
                }
                Err(e) => eprintln!("❌ {e}"),
            },
            "inbox" => match dashboard.fetch_notifications().await {
                Ok(notifications) if notifications.is_empty() => eprintln!("Inbox empty."),
                Ok(notifications) => {
                    for n in notifications {
                        let marker = if n.read { " " } else { "•" };
                        eprintln!(" {marker} {}", n.message);
                    }
                }
                Err(e) => eprintln!("❌ {e}"),
            },
            "save" => match &config.draft_policy {
                DraftPolicy::File(path) => {
                    draft.save_to(path).await?;
                    eprintln!("💾 Draft saved to {}", path.display());
                }
                DraftPolicy::Memory => {
                    eprintln!("Draft policy is in-memory; set ONBOARD_DRAFT_PATH to save.")
                }
            },
            "reset" => {
                draft.reset();
                controller = StepController::new();
                checkpoint = SubmissionCheckpoint::new();
                eprintln!("Draft cleared.");
                print_step(&controller, &draft);
            }
            "quit" | "exit" => break,
            other => eprintln!("Unknown command: {other} (try 'help')"),
        }
        eprint!("> ");
    }

    // Persist the draft on exit when configured to.
    if let DraftPolicy::File(path) = &config.draft_policy {
        if !draft.is_empty() {
            draft.save_to(path).await?;
            eprintln!("💾 Draft saved to {}", path.display());
        }
    }

    Ok(())
}

/// Parse and store one field according to its declared kind.
fn set_field(draft: &mut DraftStore, step: StepId, field: &str, raw: &str) {
    let definition = StepDefinition::for_step(step);
    let Some(schema) = definition.fields.iter().find(|f| f.name == field) else {
        eprintln!("No field '{field}' on step {step}");
        return;
    };
    let value = match schema.kind {
        FieldKind::Number => match Decimal::from_str(raw) {
            Ok(n) => FieldValue::Number(n),
            Err(_) => {
                eprintln!("'{raw}' is not a number");
                return;
            }
        },
        FieldKind::Choice => FieldValue::choice(raw),
        FieldKind::Text | FieldKind::Date => FieldValue::text(raw),
    };
    draft.set_field(step, field, value);
}

async fn submit(
    orchestrator: &SubmissionOrchestrator,
    draft: &mut DraftStore,
    controller: &mut StepController,
    checkpoint: &mut SubmissionCheckpoint,
) {
    eprintln!("⏳ Submitting...");
    let snapshot = draft.snapshot();
    match orchestrator.submit(&snapshot, checkpoint).await {
        Ok(report) => {
            for outcome in &report.documents {
                match &outcome.result {
                    Ok(_) => eprintln!("   ✅ {}", outcome.file_name),
                    Err(e) => eprintln!("   ❌ {}: {e}", outcome.file_name),
                }
            }
            match report.outcome {
                SubmissionOutcome::Complete => {
                    controller.mark_submitted();
                    draft.reset();
                    eprintln!("🎉 Onboarding submitted. Check 'score' once the backend has rated you.");
                }
                SubmissionOutcome::Failed { failed_at } => {
                    if let Some(e) = &report.error {
                        eprintln!("❌ Failed at {failed_at}: {e}");
                    } else {
                        eprintln!("❌ Failed at {failed_at}");
                    }
                    eprintln!("   Completed so far: {}", stage_list(&report.succeeded));
                    eprintln!("   Your draft is intact — fix the issue and 'submit' again.");
                }
                SubmissionOutcome::Cancelled { during } => {
                    eprintln!("⚠️  Aborted during {during}; nothing further was sent.");
                    eprintln!("   Completed so far: {}", stage_list(&report.succeeded));
                }
            }
        }
        Err(e) => eprintln!("❌ {e}"),
    }
}

fn stage_list(stages: &[founder_onboard::submit::SubmitStage]) -> String {
    if stages.is_empty() {
        "none".to_string()
    } else {
        stages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn print_step(controller: &StepController, draft: &DraftStore) {
    let Some(step) = controller.current_step() else {
        eprintln!("✔ Onboarding submitted.");
        return;
    };
    let definition = StepDefinition::for_step(step);
    let errors = validate_step(step, draft);

    eprintln!("\n── {} ({step}) ──", definition.title);
    for schema in definition.fields {
        let value = draft
            .field(step, schema.name)
            .and_then(|v| v.as_text().map(str::to_string).or_else(|| v.as_number().map(|n| n.to_string())))
            .unwrap_or_default();
        let marker = match errors.get(schema.name) {
            Some(message) => format!("✗ {message}"),
            None if value.is_empty() && !schema.required => "·".to_string(),
            None => "✓".to_string(),
        };
        eprintln!("   {:<24} {:<28} {marker}", schema.name, value);
    }
    if step == StepId::Documents {
        if draft.documents().is_empty() {
            eprintln!("   (no documents attached — use 'attach <path>')");
        } else {
            for doc in draft.documents() {
                eprintln!("   📎 {} ({} bytes)", doc.file_name, doc.size_bytes);
            }
        }
        if let Some(message) = errors.get("documents") {
            eprintln!("   ✗ {message}");
        }
    }
    if step == StepId::Review {
        for prior in StepId::Review.predecessors() {
            let done = StepDefinition::for_step(*prior).is_complete(draft);
            eprintln!("   {} {prior}", if done { "✅" } else { "❌" });
        }
        eprintln!("   Type 'submit' when everything is green.");
    }
}

fn print_help() {
    eprintln!("Commands:");
    eprintln!("  show                     redisplay the current step");
    eprintln!("  set <field> <value>      fill a field on the current step");
    eprintln!("  unset <field>            clear a field");
    eprintln!("  next / back              move through the wizard");
    eprintln!("  goto <step>              jump to a step (predecessors must be complete)");
    eprintln!("  attach <path>            screen and attach a document");
    eprintln!("  detach <file-name>       remove an attached document");
    eprintln!("  submit                   send the draft to the backend");
    eprintln!("  score / docs / inbox     dashboard reads");
    eprintln!("  save / reset / quit");
}
