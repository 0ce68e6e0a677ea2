//! One-shot subcommand implementations.

use std::time::Duration;

use chrono::Utc;

use crate::AppTracker;

pub async fn add(tracker: &AppTracker, bundle_id: &str) -> anyhow::Result<()> {
  let app = tracker.track(bundle_id).await?;
  println!("Tracking {} ({}) at version {}", app.name, app.bundle_id, app.version);
  Ok(())
}

pub async fn remove(tracker: &AppTracker, bundle_id: &str) -> anyhow::Result<()> {
  if tracker.remove(bundle_id).await? {
    println!("Removed {bundle_id}");
  } else {
    println!("{bundle_id} is not tracked");
  }
  Ok(())
}

pub async fn list(tracker: &AppTracker) -> anyhow::Result<()> {
  let apps = tracker.tracked_apps().await?;
  if apps.is_empty() {
    println!("No apps tracked. Add one with `vigil add <bundle-id>`.");
    return Ok(());
  }
  for app in apps {
    println!(
      "{:<40} {:<12} last checked {}",
      app.bundle_id,
      app.version,
      app.last_checked.format("%Y-%m-%d %H:%M UTC"),
    );
  }
  Ok(())
}

pub async fn history(tracker: &AppTracker, bundle_id: &str) -> anyhow::Result<()> {
  let changes = tracker.history(bundle_id).await?;
  if changes.is_empty() {
    println!("No version changes recorded for {bundle_id}");
    return Ok(());
  }
  for change in changes {
    println!(
      "{}  {} -> {}",
      change.detected_at.format("%Y-%m-%d %H:%M UTC"),
      change.old_version,
      change.new_version,
    );
  }
  Ok(())
}

pub async fn recent(tracker: &AppTracker, window: Duration) -> anyhow::Result<()> {
  let cutoff = Utc::now() - chrono::Duration::from_std(window)?;
  let changes = tracker.changes_since(cutoff).await?;
  if changes.is_empty() {
    println!("No changes in the last {}", humantime::format_duration(window));
    return Ok(());
  }
  for change in changes {
    println!(
      "{}  {}: {} -> {}",
      change.detected_at.format("%Y-%m-%d %H:%M UTC"),
      change.name,
      change.old_version,
      change.new_version,
    );
  }
  Ok(())
}

pub async fn check(tracker: &AppTracker) -> anyhow::Result<()> {
  let changes = tracker.check_all().await?;
  if changes.is_empty() {
    println!("All apps up to date, no updates detected.");
    return Ok(());
  }
  println!("{} update(s) detected:", changes.len());
  for change in &changes {
    println!("  {}: {} -> {}", change.name, change.old_version, change.new_version);
  }
  Ok(())
}

pub async fn search(
  tracker: &AppTracker,
  term: &str,
  limit: Option<u32>,
) -> anyhow::Result<()> {
  let results = tracker.search(term, limit).await?;
  if results.is_empty() {
    println!("No results for \"{term}\"");
    return Ok(());
  }
  for app in results {
    println!("{:<40} {:<12} {}", app.bundle_id, app.version, app.name);
  }
  Ok(())
}
