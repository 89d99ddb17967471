//! The once-per-interval pipeline.
//!
//! load history → tail → compose prompt → generate → normalize → append →
//! email. Steps run strictly in order and the first failure aborts the run.
//! The record is appended before the email is sent, so a delivery failure
//! never loses the day's question.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::generate::ResponsesClient;
use crate::history::{HistoryRecord, HistoryStore, tail};
use crate::normalize::normalize;
use crate::notify::{self, Notifier};
use crate::prompt;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Generate and normalize only: nothing is appended or sent.
    pub dry_run: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The normalized question block.
    pub question: String,
    pub subject: String,
    /// Whether the record was appended to history.
    pub recorded: bool,
    /// Whether the email was accepted by the API.
    pub delivered: bool,
}

/// Execute one run as of `now`.
pub async fn run(config: &Config, now: DateTime<Utc>, options: RunOptions) -> Result<RunOutcome> {
    let generator = ResponsesClient::new(&config.generation)?;
    let notifier = Notifier::new(&config.email)?;
    let store = HistoryStore::new(&config.history_path);

    let history = store.load()?;
    let recent = tail(&history, config.history_tail);
    info!(
        "Loaded {} history record(s) from {}, {} in context",
        history.len(),
        store.path().display(),
        recent.len()
    );

    let prompt = prompt::compose(config.variant, now.date_naive(), recent);
    info!(
        "Requesting {} question from {}",
        config.variant,
        generator.model()
    );
    let raw = generator.generate(&prompt).await?;

    let question = normalize(&raw, config.variant.line_count())?;
    let subject = notify::subject(&config.subject_prefix, now, config.timezone);

    if options.dry_run {
        info!("Dry run: history and email skipped");
        return Ok(RunOutcome {
            question,
            subject,
            recorded: false,
            delivered: false,
        });
    }

    store.append(&HistoryRecord::stamped(now, question.as_str()))?;
    info!("Recorded question in {}", store.path().display());

    notifier.send(&subject, &notify::body(&question)).await?;
    info!("Sent \"{subject}\" to {}", config.email.recipient.email);

    Ok(RunOutcome {
        question,
        subject,
        recorded: true,
        delivered: true,
    })
}
