use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_editor::config::Config;
use resume_editor::document::sample::placeholder_resume;
use resume_editor::editor::command::{read_line_lossy, HELP};
use resume_editor::editor::{view, Editor, Notice, NoticeLevel};
use resume_editor::preview::PdfFilePreview;
use resume_editor::remote_client::ApiClient;
use resume_editor::ResumeDocument;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logs go to stderr; stdout belongs to the editor view.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_editor={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume editor v{}", env!("CARGO_PKG_VERSION"));

    let document = load_document(&config).await?;
    info!("Opened resume with {} fields", document.len());

    let client = Arc::new(ApiClient::new(config.api_base_url.clone(), config.http_timeout)?);
    info!("Remote service: {}", client.base_url());

    let mut editor = Editor::new(
        document,
        config.default_filename.clone(),
        client.clone(),
        client,
        config.export_dir.clone(),
    );

    if let Some(path) = &config.preview_path {
        editor.load_preview(Arc::new(PdfFilePreview::new(path)));
    }

    println!("{}\n", view::render_document(&editor));
    println!("{HELP}");

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut pending = Vec::new();
    loop {
        tokio::select! {
            line = read_line_lossy(&mut stdin, &mut pending) => {
                let Some(line) = line.context("Could not read input")? else { break };
                let outcome = editor.handle_line(&line);
                if let Some(output) = outcome.output {
                    println!("{output}");
                }
                outcome.notices.iter().for_each(print_notice);
                if outcome.quit {
                    break;
                }
            }
            Some(completion) = editor.next_completion() => {
                print_notice(&editor.apply(completion));
            }
        }
    }

    info!("Editor closed");
    Ok(())
}

async fn load_document(config: &Config) -> Result<ResumeDocument> {
    match &config.resume_path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Could not read {}", path.display()))?;
            ResumeDocument::from_json_str(&text)
                .with_context(|| format!("Could not import {}", path.display()))
        }
        None => Ok(placeholder_resume()),
    }
}

fn print_notice(notice: &Notice) {
    let tag = match notice.level {
        NoticeLevel::Info => "..",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "!!",
    };
    println!("[{tag}] {}", notice.message);
}
