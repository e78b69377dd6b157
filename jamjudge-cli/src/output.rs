/// Output formatting: terminal tables and JSON.
use jamjudge_core::{Entry, NextPrompt, RankedEntry, RankingStats, SessionProgress};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedEntry<'a> {
    rank: usize,
    id: &'a str,
    title: &'a str,
    score: f64,
}

#[derive(Serialize)]
struct JsonRankings<'a> {
    jam: &'a str,
    entries: Vec<JsonRankedEntry<'a>>,
    stats: &'a RankingStats,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonPrompt<'a> {
    Pair {
        entry_a: &'a Entry,
        entry_b: &'a Entry,
        progress: &'a SessionProgress,
        session_complete: bool,
    },
    AllPairsExhausted { progress: &'a SessionProgress },
    NotEnoughEntries,
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn describe_entry(entry: &Entry) -> String {
    let mut line = format!("[{}] {}", entry.id, entry.title);
    if let Some(ref author) = entry.author {
        line.push_str(&format!(" by {author}"));
    }
    line
}

pub fn print_progress(progress: &SessionProgress) {
    println!(
        "Session progress: {}/{} ({} session{} completed)",
        progress.completed_in_session,
        progress.session_size,
        progress.sessions_completed,
        if progress.sessions_completed == 1 { "" } else { "s" },
    );
}

/// Print the next-pair result for a judge.
pub fn print_prompt(prompt: &NextPrompt) {
    match prompt {
        NextPrompt::Pair { pair, progress } => {
            if progress.is_session_boundary() {
                println!("Session {} complete. Keep going or stop here.\n", progress.sessions_completed);
            }
            println!("A: {}", describe_entry(&pair.entry_a));
            for url in [&pair.entry_a.demo_url, &pair.entry_a.video_url].into_iter().flatten() {
                println!("   {url}");
            }
            println!("B: {}", describe_entry(&pair.entry_b));
            for url in [&pair.entry_b.demo_url, &pair.entry_b.video_url].into_iter().flatten() {
                println!("   {url}");
            }
            println!();
            print_progress(progress);
        }
        NextPrompt::Exhausted { progress } => {
            println!("You have judged every pair in this jam. Thanks!");
            print_progress(progress);
        }
        NextPrompt::InsufficientEntries => {
            println!("Not enough entries for comparison (need at least 2).");
        }
    }
}

pub fn print_prompt_json(prompt: &NextPrompt) -> anyhow::Result<()> {
    let json = match prompt {
        NextPrompt::Pair { pair, progress } => JsonPrompt::Pair {
            entry_a: &pair.entry_a,
            entry_b: &pair.entry_b,
            progress,
            session_complete: progress.is_session_boundary(),
        },
        NextPrompt::Exhausted { progress } => JsonPrompt::AllPairsExhausted { progress },
        NextPrompt::InsufficientEntries => JsonPrompt::NotEnoughEntries,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Print results as a formatted terminal table, followed by statistics.
pub fn print_table(jam: &str, window: Option<&str>, rankings: &[RankedEntry], stats: &RankingStats) {
    let title_width = rankings.iter()
        .map(|r| r.entry.title.chars().count().min(30))
        .max()
        .unwrap_or(5)
        .max(5); // at least "Title"
    let id_width = rankings.iter()
        .map(|r| r.entry.id.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);

    println!("\nRankings for {jam}");
    if let Some(window) = window {
        println!("Comparisons: {window}");
    }
    println!();

    println!(" Rank | Score | {:<id_width$} | {:<title_width$} | Author", "ID", "Title");
    println!("------|-------|-{}-|-{}-|-------", "-".repeat(id_width), "-".repeat(title_width));

    for r in rankings {
        println!(
            " {:>4} | {:>5.1} | {:<id_width$} | {:<title_width$} | {}",
            r.rank,
            r.score,
            r.entry.id,
            truncate(&r.entry.title, 30),
            r.entry.author.as_deref().unwrap_or(""),
        );
    }

    println!("\nStatistics:");
    println!("  Total judges: {}", stats.total_judges);
    println!("  Total comparisons: {}", stats.total_comparisons);
    println!("  Skipped: {}", stats.skipped_count);
    println!("  Coverage: {:.0}% of pairs have at least one comparison", stats.coverage_percent);
}

/// Print results as JSON.
pub fn print_json(jam: &str, rankings: &[RankedEntry], stats: &RankingStats) -> anyhow::Result<()> {
    let entries = rankings
        .iter()
        .map(|r| JsonRankedEntry {
            rank: r.rank,
            id: &r.entry.id,
            title: &r.entry.title,
            score: r.score,
        })
        .collect();

    let output = JsonRankings { jam, entries, stats };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_titles() {
        assert_eq!(truncate("Cairo Kart", 30), "Cairo Kart");
        let long = "A Very Long Title That Goes On And On";
        let cut = truncate(long, 30);
        assert_eq!(cut.chars().count(), 30);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_describe_entry_with_author() {
        let mut entry = Entry::new("42", "On-Chain Chess");
        assert_eq!(describe_entry(&entry), "[42] On-Chain Chess");
        entry.author = Some("octocat".to_string());
        assert_eq!(describe_entry(&entry), "[42] On-Chain Chess by octocat");
    }
}
