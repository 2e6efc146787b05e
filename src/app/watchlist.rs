//! Add/remove against the backend watchlist.
//!
//! The outcome is reported explicitly so the UI can tell "removed" apart from
//! "removal failed". Whatever happened, the poller follows every attempted
//! mutation with one refresh scan, which is what shows the new watchlist.

use log::{info, warn};

use crate::request::ScannerApi;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Nothing was sent, input was empty
    Skipped,
    Succeeded,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    pub kind: MutationKind,
    pub ticker: String,
    pub outcome: MutationOutcome,
}

impl Mutation {
    pub fn attempted(&self) -> bool {
        self.outcome != MutationOutcome::Skipped
    }

    /// One-line notice for the footer.
    pub fn notice(&self) -> Option<String> {
        let (done, verb) = match self.kind {
            MutationKind::Add => ("Added", "Adding"),
            MutationKind::Remove => ("Removed", "Removal of"),
        };
        match &self.outcome {
            MutationOutcome::Skipped => None,
            MutationOutcome::Succeeded => Some(format!("{} {}", done, self.ticker)),
            MutationOutcome::Failed(reason) => {
                Some(format!("{} {} failed: {}", verb, self.ticker, reason))
            }
        }
    }
}

pub fn validate_ticker(input: &str) -> Option<String> {
    let ticker = input.trim();
    (!ticker.is_empty()).then(|| ticker.to_string())
}

pub async fn add_coin(api: &dyn ScannerApi, input: &str) -> Mutation {
    let Some(ticker) = validate_ticker(input) else {
        return Mutation {
            kind: MutationKind::Add,
            ticker: input.to_string(),
            outcome: MutationOutcome::Skipped,
        };
    };
    let outcome = into_outcome(MutationKind::Add, &ticker, api.add(&ticker).await);
    Mutation {
        kind: MutationKind::Add,
        ticker,
        outcome,
    }
}

/// Only called after the user confirmed the removal.
pub async fn remove_coin(api: &dyn ScannerApi, ticker: &str) -> Mutation {
    let outcome = into_outcome(MutationKind::Remove, ticker, api.remove(ticker).await);
    Mutation {
        kind: MutationKind::Remove,
        ticker: ticker.to_string(),
        outcome,
    }
}

fn into_outcome(
    kind: MutationKind,
    ticker: &str,
    result: crate::error::Result<()>,
) -> MutationOutcome {
    match result {
        Ok(()) => {
            info!("{:?} {} accepted", kind, ticker);
            MutationOutcome::Succeeded
        }
        Err(e) => {
            warn!("{:?} {} failed: {}", kind, ticker, e);
            MutationOutcome::Failed(e.to_string())
        }
    }
}
