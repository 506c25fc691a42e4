//! Transcript marker rules.
//!
//! The agent CLI reports its outcome only by writing recognizable text. A
//! finished agent is classified by evaluating an ordered list of rules
//! against the full transcript; the first rule that matches decides.
//!
//! | Order | Rule          | Status       | Derived field      |
//! |-------|---------------|--------------|--------------------|
//! | 1     | roadblock     | `roadblock`  | `roadblockReason`  |
//! | 2     | pull request  | `completed`  | `pullRequestUrl`   |
//! | 3     | auth failure  | `auth_error` | `errorDetails`     |
//! | last  | none matched  | `completed`  |                    |

use anyhow::{Context, Result};
use regex::Regex;

use super::models::AgentStatus;
use crate::config::MarkersSection;

/// What a rule derives from the text it matched.
#[derive(Debug, Clone)]
enum Matcher {
    /// Regex whose first capture group is the pull request URL.
    PullRequest(Regex),
    /// Regex whose first capture group is the roadblock reason.
    Roadblock(Regex),
    /// Any of these phrases; the containing line becomes the error details.
    AuthFailure(Vec<String>),
}

/// Terminal classification of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: AgentStatus,
    pub pull_request_url: Option<String>,
    pub roadblock_reason: Option<String>,
    pub error_details: Option<String>,
}

impl Classification {
    fn completed(pull_request_url: Option<String>) -> Self {
        Self {
            status: AgentStatus::Completed,
            pull_request_url,
            roadblock_reason: None,
            error_details: None,
        }
    }
}

/// Ordered marker rules; first match wins.
#[derive(Debug, Clone)]
pub struct MarkerRules {
    rules: Vec<Matcher>,
}

impl MarkerRules {
    /// Compile the rules from configuration.
    pub fn from_config(markers: &MarkersSection) -> Result<Self> {
        let pull_request = Regex::new(&markers.pull_request)
            .with_context(|| format!("Invalid pull_request marker: {}", markers.pull_request))?;
        let roadblock = Regex::new(&markers.roadblock)
            .with_context(|| format!("Invalid roadblock marker: {}", markers.roadblock))?;
        let phrases: Vec<String> = markers
            .auth_failures
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect();

        let mut rules = vec![Matcher::Roadblock(roadblock), Matcher::PullRequest(pull_request)];
        if !phrases.is_empty() {
            rules.push(Matcher::AuthFailure(phrases));
        }
        Ok(Self { rules })
    }

    /// Rules compiled from the built-in marker patterns.
    pub fn builtin() -> Result<Self> {
        Self::from_config(&MarkersSection::default())
    }

    /// Classify a finished agent's transcript. Never fails: text matching no
    /// rule (including empty or truncated text) is `completed`.
    pub fn classify(&self, transcript: &str) -> Classification {
        for rule in &self.rules {
            match rule {
                Matcher::PullRequest(re) => {
                    if let Some(url) = first_capture(re, transcript) {
                        return Classification::completed(Some(url));
                    }
                }
                Matcher::Roadblock(re) => {
                    if let Some(reason) = first_capture(re, transcript) {
                        return Classification {
                            status: AgentStatus::Roadblock,
                            pull_request_url: None,
                            roadblock_reason: Some(reason),
                            error_details: None,
                        };
                    }
                }
                Matcher::AuthFailure(phrases) => {
                    if let Some(line) = transcript
                        .lines()
                        .find(|line| phrases.iter().any(|p| line.contains(p.as_str())))
                    {
                        return Classification {
                            status: AgentStatus::AuthError,
                            pull_request_url: None,
                            roadblock_reason: None,
                            error_details: Some(line.trim().to_string()),
                        };
                    }
                }
            }
        }
        Classification::completed(None)
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
