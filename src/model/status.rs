use serde::Serialize;

use crate::sys::geometry::Rect;

/// Outcome of the most recent apply, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "key", rename_all = "camelCase")]
pub enum Status {
    MissingWindow,
    Applied { detail: AppliedDetail },
    ApplyFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDetail {
    pub window_size: String,
    pub system_size: String,
}

impl Status {
    pub fn applied(window: Option<&Rect>, system: Option<&Rect>) -> Self {
        Status::Applied {
            detail: AppliedDetail {
                window_size: format_size(window),
                system_size: format_size(system),
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            Status::MissingWindow => "No window found to resize".to_string(),
            Status::ApplyFailed => "Failed to apply. Please try again.".to_string(),
            Status::Applied { detail } => {
                format!("Applied: {} / {}", detail.window_size, detail.system_size)
            }
        }
    }
}

/// `"W × H"` with rounded dimensions, or `"-"` when there is no rect.
pub fn format_size(rect: Option<&Rect>) -> String {
    match rect {
        Some(r) => format!("{} × {}", r.width.round(), r.height.round()),
        None => "-".to_string(),
    }
}
