//! Apprise notifier — the reqwest implementation of
//! [`Notifier`](vigil_core::notify::Notifier).
//!
//! Delivery is best-effort by contract: the tracker logs whatever this
//! returns and moves on. When no endpoint is configured the notifier is
//! disabled and every call is a silent no-op.

use std::time::Duration;

use serde::Serialize;
use vigil_core::{
  app::VersionChange,
  notify::{Notifier, NotifyError},
};

/// Longest release-notes excerpt included in a single-change notification.
const MAX_NOTES_LEN: usize = 500;
/// Most change lines listed in a batch notification body.
const MAX_BATCH_LINES: usize = 10;

// ─── Notifier ────────────────────────────────────────────────────────────────

/// Posts change summaries to an Apprise-compatible endpoint.
#[derive(Clone)]
pub struct AppriseNotifier {
  endpoint: Option<String>,
  http:     reqwest::Client,
}

impl AppriseNotifier {
  /// `endpoint = None` builds a disabled notifier.
  pub fn new(endpoint: Option<String>) -> Result<Self, NotifyError> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| NotifyError::Transport(e.to_string()))?;

    Ok(Self { endpoint, http })
  }

  pub fn is_enabled(&self) -> bool {
    self.endpoint.is_some()
  }
}

#[derive(Serialize)]
struct ApprisePayload<'a> {
  title: &'a str,
  body:  &'a str,
  #[serde(rename = "type")]
  kind:  &'a str,
}

impl Notifier for AppriseNotifier {
  async fn notify_batch(&self, changes: &[VersionChange]) -> Result<(), NotifyError> {
    let Some(endpoint) = &self.endpoint else {
      return Ok(());
    };
    if changes.is_empty() {
      return Ok(());
    }

    let title = render_title(changes);
    let body = render_body(changes);
    let payload = ApprisePayload {
      title: &title,
      body:  &body,
      kind:  if changes.len() == 1 { "info" } else { "success" },
    };

    let resp = self
      .http
      .post(endpoint)
      .json(&payload)
      .send()
      .await
      .map_err(|e| NotifyError::Transport(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
      return Err(NotifyError::Status(status.as_u16()));
    }

    tracing::info!(changes = changes.len(), "notification sent");
    Ok(())
  }
}

// ─── Message rendering ───────────────────────────────────────────────────────

fn render_title(changes: &[VersionChange]) -> String {
  match changes {
    [only] => format!("{} Updated", only.name),
    _ => format!("{} App Updates Detected", changes.len()),
  }
}

fn render_body(changes: &[VersionChange]) -> String {
  if let [only] = changes {
    let mut body = format!("Version {} → {}", only.old_version, only.new_version);
    if !only.release_notes.is_empty() {
      body.push_str("\n\n");
      body.push_str(&truncate(&only.release_notes, MAX_NOTES_LEN));
    }
    return body;
  }

  let mut lines: Vec<String> = changes
    .iter()
    .take(MAX_BATCH_LINES)
    .map(|c| format!("• {}: {} → {}", c.name, c.old_version, c.new_version))
    .collect();

  if changes.len() > MAX_BATCH_LINES {
    lines.push(format!("... and {} more", changes.len() - MAX_BATCH_LINES));
  }

  lines.join("\n")
}

/// Cut `s` to at most `max` bytes on a char boundary, marking the cut.
fn truncate(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_owned();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}...", &s[..end])
}

// ─── Tests ───────────────────────────────────────────────────────────────────
