//! CLI command implementations — the terminal session driver

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mnema_lib::capture::{CaptureContext, CaptureRequest};
use mnema_lib::memory::{MemoryRecord, MemoryStatus, Rating, StatsSnapshot};
use mnema_lib::scheduler::{format_interval, preview_intervals, ReviewSession, Scheduler};
use mnema_lib::storage::{ExportData, FileStore};

/// Open the scheduler over the file store at `data_dir` (or the default)
pub fn open_scheduler(data_dir: Option<PathBuf>) -> Result<Scheduler<FileStore>> {
    let base_path = match data_dir {
        Some(path) => path,
        None => FileStore::default_data_dir().context("Failed to determine data directory")?,
    };
    Ok(Scheduler::new(FileStore::new(base_path)))
}

/// Resolve "-" as the contents of `input` (stdin) for the back text
fn resolve_back<R: io::Read>(back: Option<String>, input: &mut R) -> Result<Option<String>> {
    match back.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            input
                .read_to_string(&mut buf)
                .context("Failed to read back text from stdin")?;
            let trimmed = buf.trim();
            Ok(if trimmed.is_empty() { None } else { Some(trimmed.to_string()) })
        }
        _ => Ok(back),
    }
}

fn parse_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

pub async fn capture(
    scheduler: &Scheduler<FileStore>,
    front: String,
    back: Option<String>,
    tags: Option<String>,
    url: Option<String>,
    title: Option<String>,
    surrounding: Option<String>,
) -> Result<()> {
    let context = CaptureContext {
        url,
        title,
        timestamp: Some(Utc::now()),
        surrounding_text: surrounding,
        ..Default::default()
    };

    let mut request = CaptureRequest::new(front)
        .with_tags(parse_tags(tags))
        .with_context(context);
    request.back = resolve_back(back, &mut io::stdin())?;

    let record = scheduler.capture(request, Utc::now()).await?;
    println!("Captured memory {} ({})", record.id, record.front);
    Ok(())
}

/// Listing filter: tags, and (for `--due`) only memories review would select
fn should_list(record: &MemoryRecord, tag: Option<&str>, due_only: bool, now: DateTime<Utc>) -> bool {
    if let Some(tag) = tag {
        if !record.tags.iter().any(|t| t == tag) {
            return false;
        }
    }
    if due_only {
        return record.status == MemoryStatus::Active && record.is_due(now);
    }
    true
}

pub async fn list(scheduler: &Scheduler<FileStore>, tag: Option<&str>, due_only: bool) -> Result<()> {
    let now = Utc::now();
    let records = scheduler.list().await?;

    let mut shown = 0;
    for record in &records {
        if !should_list(record, tag, due_only, now) {
            continue;
        }

        let due = if record.status == MemoryStatus::Archived {
            "archived".to_string()
        } else if record.is_due(now) {
            "due".to_string()
        } else {
            format!("due in {}", format_interval((record.next_review - now).num_days() as i32 + 1))
        };
        let tags = if record.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", record.tags.join(", "))
        };
        println!("{}  {}  ({}, {} reviews){}", record.id, record.front, due, record.review_count, tags);
        shown += 1;
    }

    if shown == 0 {
        println!("No memories to show.");
    }
    Ok(())
}

pub async fn review(
    scheduler: &Scheduler<FileStore>,
    seed: Option<u64>,
    limit: Option<usize>,
) -> Result<()> {
    let now = Utc::now();
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut due = scheduler.due_records(now).await?;
    if let Some(limit) = limit {
        due.truncate(limit);
    }
    let mut session = ReviewSession::new(due, &mut rng);

    if session.is_empty() {
        println!("No memories to review right now!");
        return Ok(());
    }
    println!("Reviewing {} memories. enter = show answer, s = skip, d = delete, q = quit.", session.len());

    let stdin = io::stdin();
    'session: while let Some(record) = session.current().cloned() {
        let (done, total) = session.progress();
        println!("\n[{}/{}] {}", done + 1, total, record.front);
        print!("> ");
        io::stdout().flush()?;

        let line = match read_line(&stdin)? {
            Some(line) => line,
            None => break,
        };
        match line.trim() {
            "q" => break,
            "s" => {
                session.advance();
                continue;
            }
            "d" => {
                scheduler.delete(&record.id).await?;
                println!("Deleted.");
                session.remove_current();
                continue;
            }
            _ => {}
        }

        println!("{}", record.back);
        if let Some(url) = &record.context.url {
            println!("Source: {}", url);
        }

        let previews = preview_intervals(&record);
        println!(
            "  1) Again ({})  2) Hard ({})  3) Good ({})  4) Easy ({})",
            format_interval(previews[0]),
            format_interval(previews[1]),
            format_interval(previews[2]),
            format_interval(previews[3]),
        );

        loop {
            print!("rating > ");
            io::stdout().flush()?;
            let line = match read_line(&stdin)? {
                Some(line) => line,
                None => break 'session,
            };
            match line.trim() {
                "q" => break 'session,
                "s" => {
                    session.advance();
                    break;
                }
                input => match input.parse::<u8>().ok().and_then(|v| Rating::try_from(v).ok()) {
                    Some(rating) => {
                        let updated = scheduler.apply_rating(&record.id, rating, Utc::now()).await?;
                        println!("Next review in {}", format_interval(updated.interval));
                        session.advance();
                        break;
                    }
                    None => println!("Enter 1-4, s to skip, or q to quit."),
                },
            }
        }
    }

    let (done, total) = session.progress();
    if session.is_complete() {
        println!("\nReview complete! {} memories reviewed.", total);
    } else {
        println!("\nSession ended early: {}/{} memories reviewed.", done, total);
    }
    Ok(())
}

/// Read one line from stdin; None on EOF
fn read_line(stdin: &io::Stdin) -> Result<Option<String>> {
    let mut buf = String::new();
    let read = stdin.lock().read_line(&mut buf)?;
    if read == 0 {
        Ok(None)
    } else {
        Ok(Some(buf))
    }
}

pub async fn stats(scheduler: &Scheduler<FileStore>) -> Result<()> {
    let snapshot: StatsSnapshot = scheduler.stats_snapshot(Utc::now()).await?;

    println!("Memories:     {}", snapshot.total_memories);
    println!("Due now:      {}", snapshot.due_memories);
    println!(
        "Stages:       {} new, {} learning, {} mature, {} relapsed",
        snapshot.new_memories,
        snapshot.learning_memories,
        snapshot.mature_memories,
        snapshot.relapsed_memories
    );
    println!("Reviews:      {}", snapshot.aggregate.reviewed);
    println!("Streak:       {}", snapshot.aggregate.streak);
    match snapshot.aggregate.last_review_date {
        Some(date) => println!("Last review:  {}", date.format("%Y-%m-%d %H:%M")),
        None => println!("Last review:  Never"),
    }

    let ratings = snapshot.ratings;
    if ratings.total() > 0 {
        println!(
            "Last ratings: {} again, {} hard, {} good, {} easy",
            ratings.again, ratings.hard, ratings.good, ratings.easy
        );
    }
    Ok(())
}

pub async fn delete(scheduler: &Scheduler<FileStore>, id: &str) -> Result<()> {
    scheduler.delete(id).await?;
    println!("Deleted memory {}", id);
    Ok(())
}

pub async fn archive(scheduler: &Scheduler<FileStore>, id: &str) -> Result<()> {
    let record = scheduler.archive(id).await?;
    println!("Archived memory {} ({})", record.id, record.front);
    Ok(())
}

pub async fn export(scheduler: &Scheduler<FileStore>, path: &Path) -> Result<()> {
    let data = scheduler.export().await?;
    let json = serde_json::to_string_pretty(&data)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported {} memories to {}", data.memories.len(), path.display());
    Ok(())
}

pub async fn import(scheduler: &Scheduler<FileStore>, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data: ExportData =
        serde_json::from_str(&content).context("Invalid export document")?;

    let count = scheduler.import(data).await?;
    println!("Imported {} memories from {}", count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that always fails, standing in for a broken stdin pipe
    struct FailingReader;

    impl io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_resolve_back_reads_dash_from_input() {
        let mut input = io::Cursor::new("  the answer  \n");
        let back = resolve_back(Some("-".into()), &mut input).unwrap();
        assert_eq!(back, Some("the answer".to_string()));

        let mut empty = io::Cursor::new("   \n");
        assert_eq!(resolve_back(Some("-".into()), &mut empty).unwrap(), None);

        let mut unused = io::Cursor::new("ignored");
        assert_eq!(
            resolve_back(Some("literal".into()), &mut unused).unwrap(),
            Some("literal".to_string())
        );
        assert_eq!(resolve_back(None, &mut unused).unwrap(), None);
    }

    #[test]
    fn test_resolve_back_propagates_read_failure() {
        let result = resolve_back(Some("-".into()), &mut FailingReader);
        assert!(result.is_err());
    }

    #[test]
    fn test_should_list_excludes_archived_from_due() {
        let now = Utc::now();
        let mut record =
            MemoryRecord::new("1".into(), CaptureRequest::new("q"), now).unwrap();
        record.tags = vec!["rust".into()];

        assert!(should_list(&record, None, true, now));
        assert!(should_list(&record, Some("rust"), false, now));
        assert!(!should_list(&record, Some("other"), false, now));

        // Archived memories are never "due", matching due-set selection
        record.status = MemoryStatus::Archived;
        assert!(!should_list(&record, None, true, now));
        assert!(should_list(&record, None, false, now));
    }
}
