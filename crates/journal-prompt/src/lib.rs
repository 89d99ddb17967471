//! Daily journaling question: generate, record, and deliver.
//!
//! `journal-prompt` runs once per scheduling interval. Each run asks a
//! language model for the next question in a long-running journaling
//! sequence, checks the answer against a strict line format, appends it to an
//! append-only history file, and emails it.
//!
//! ```ignore
//! use journal_prompt::{Config, RunOptions, run};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), journal_prompt::Error> {
//!     let config = Config::from_env()?;
//!     let outcome = run(&config, chrono::Utc::now(), RunOptions::default()).await?;
//!     println!("{}", outcome.question);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`history`] | Append-only JSONL [`HistoryStore`] and [`tail`] |
//! | [`prompt`] | Instruction and context text for the generation call |
//! | [`generate`] | [`ResponsesClient`] for the model's responses endpoint |
//! | [`normalize`] | Line-count and punctuation repair of model output |
//! | [`notify`] | Subject formatting and the [`Notifier`] email client |
//! | [`run`](mod@run) | The sequential pipeline tying it all together |
//! | [`config`] | [`Config`] built once from the environment |

pub mod config;
pub mod error;
pub mod generate;
pub mod history;
pub mod normalize;
pub mod notify;
pub mod prompt;
pub mod run;

use std::fmt;

pub use config::{Config, ConfigError, EmailConfig, GenerationConfig};
pub use error::{Error, Result};
pub use generate::{GenerationError, ResponsesClient};
pub use history::{HistoryRecord, HistoryStore, StorageError, tail};
pub use normalize::{ValidationError, normalize};
pub use notify::{Contact, DeliveryError, Notifier};
pub use prompt::Prompt;
pub use run::{RunOptions, RunOutcome, run};

// ── Question variants ──────────────────────────────────────────────

/// Languages of the multilingual question block, in output order.
pub const LANGUAGES: [&str; 5] = [
    "Serbian (Latin script)",
    "Turkish",
    "French",
    "Russian",
    "English",
];

/// Which question contract a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Variant {
    /// One English question on one line.
    Single,
    /// The same question in every entry of [`LANGUAGES`], one per line.
    #[default]
    Multilingual,
}

impl Variant {
    /// Number of lines a valid question block has.
    pub fn line_count(self) -> usize {
        match self {
            Variant::Single => 1,
            Variant::Multilingual => LANGUAGES.len(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Single => "single",
            Variant::Multilingual => "multilingual",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
