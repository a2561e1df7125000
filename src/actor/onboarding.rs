//! The message the onboarding page's injected script posts back to the page.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

pub const GUIDE_MESSAGE_SOURCE: &str = "wxt-onboarding-injected";
pub const GUIDE_MESSAGE_TYPE: &str = "wxt-guide-copy-markdown";
pub const GUIDE_TOAST_MESSAGE: &str =
    "The injected script sent the markdown to the guide page and it was logged.";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideSource {
    #[serde(rename = "wxt-onboarding-injected")]
    OnboardingInjected,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GuideMessage {
    #[serde(rename = "wxt-guide-copy-markdown")]
    CopyMarkdown {
        source: GuideSource,
        #[serde(default)]
        markdown: String,
    },
}

impl GuideMessage {
    pub fn copy_markdown(markdown: impl Into<String>) -> Self {
        GuideMessage::CopyMarkdown {
            source: GuideSource::OnboardingInjected,
            markdown: markdown.into(),
        }
    }

    /// Accepts a posted payload only if both the source and type match.
    pub fn parse(payload: &Value) -> Option<Self> {
        match serde_json::from_value(payload.clone()) {
            Ok(message) => Some(message),
            Err(err) => {
                trace!(%err, "ignoring foreign message");
                None
            }
        }
    }

    pub fn markdown(&self) -> &str {
        match self {
            GuideMessage::CopyMarkdown { markdown, .. } => markdown,
        }
    }
}

/// Handles a posted payload, returning the toast to show if it was ours.
pub fn receive(payload: &Value) -> Option<&'static str> {
    let message = GuideMessage::parse(payload)?;
    debug!(markdown = message.markdown(), "markdown from injected script");
    Some(GUIDE_TOAST_MESSAGE)
}
