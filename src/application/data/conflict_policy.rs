use std::io;

use clap::ValueEnum;

use crate::materializer::{ConflictDecision, ConflictResolver, FixedPolicy, PromptResolver};

/// How conflicts with existing files are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ConflictPolicy {
    /// Ask on the terminal for each conflict
    #[default]
    Ask,
    Overwrite,
    Skip,
    /// Stop at the first conflict
    Cancel,
}

impl ConflictPolicy {
    pub fn resolver(self) -> Box<dyn ConflictResolver> {
        match self {
            ConflictPolicy::Ask => Box::new(PromptResolver::new(io::stdin().lock(), io::stdout())),
            ConflictPolicy::Overwrite => Box::new(FixedPolicy(ConflictDecision::Overwrite)),
            ConflictPolicy::Skip => Box::new(FixedPolicy(ConflictDecision::Skip)),
            ConflictPolicy::Cancel => Box::new(FixedPolicy(ConflictDecision::Cancel)),
        }
    }
}
