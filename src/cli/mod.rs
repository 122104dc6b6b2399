//! CLI mode - prints a bucket listing to the terminal.

mod progress;

use std::fmt;

use chrono::{DateTime, Utc};
use console::style;

use crate::{AppConfig, FileRecord, NodeId, Session, Tree, format_age, format_size};

use progress::{SpinnerProgress, print_summary};

/// What to print once the listing is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// The directory tree; `all` ignores collapsed directories.
    Tree { all: bool },
    /// Files whose path contains the query.
    Search(String),
    /// Files modified within the recency window.
    Recent,
}

/// One rendered line of terminal output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Nesting depth.
    pub depth: usize,
    /// Name, path, or directory heading.
    pub label: String,
    /// Size and age for files.
    pub detail: Option<String>,
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.label, indent = self.depth * 2)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

fn file_detail(file: &FileRecord, now: DateTime<Utc>) -> String {
    format!(
        "{}, {}",
        format_size(file.size),
        format_age(file.last_modified, now)
    )
}

/// Renders the tree. A directory's contents are listed only while it is
/// expanded, unless `all` is set.
#[must_use]
pub fn render_tree(tree: &Tree, all: bool, now: DateTime<Utc>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut stack = vec![(NodeId::ROOT, 0)];

    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else { continue };
        match &node.file {
            Some(file) => lines.push(Line {
                depth,
                label: node.name.clone(),
                detail: Some(file_detail(file, now)),
            }),
            None => {
                let expanded = all || node.show;
                let marker = if expanded { '▾' } else { '▸' };
                lines.push(Line {
                    depth,
                    label: format!("{marker} {}/", node.name),
                    detail: None,
                });
                if expanded {
                    stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
                }
            }
        }
    }

    lines
}

/// Renders a flat list of files by full path.
#[must_use]
pub fn render_files(files: &[&FileRecord], now: DateTime<Utc>) -> Vec<Line> {
    files
        .iter()
        .map(|file| Line {
            depth: 0,
            label: file.path.clone(),
            detail: Some(file_detail(file, now)),
        })
        .collect()
}

fn print_lines(lines: &[Line]) {
    for line in lines {
        let head = format!("{:indent$}{}", "", line.label, indent = line.depth * 2);
        match &line.detail {
            Some(detail) => println!("{head} {}", style(format!("({detail})")).dim()),
            None => println!("{}", style(head).bold()),
        }
    }
}

/// Loads the configured listing and prints it.
///
/// # Errors
///
/// Returns an error if the configuration names no bucket or the listing
/// cannot be fetched.
pub async fn run(config: &AppConfig, mode: &Mode) -> crate::Result<()> {
    config.validate()?;

    let spinner = SpinnerProgress::new(&config.listing.bucket);
    let result = Session::fetch(&config.listing, &spinner).await;
    spinner.finish();
    let session = result?;
    let now = Utc::now();

    println!("{}", style(session.title()).cyan().bold());
    match mode {
        Mode::Tree { all } => print_lines(&render_tree(session.tree(), *all, now)),
        Mode::Search(query) => {
            let hits = session.search(query);
            if hits.is_empty() {
                println!("No files match {query:?}.");
            }
            print_lines(&render_files(&hits, now));
        }
        Mode::Recent => {
            let recent = session.recent();
            if recent.is_empty() {
                println!("No files modified recently.");
            }
            print_lines(&render_files(&recent, now));
        }
    }
    print_summary(&session);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_tree;
    use crate::tree::tests::file;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap()
    }

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn renders_collapsed_releases() {
        let files: Vec<_> = ["opx/1.0/a.bin", "opx/2.0/a.bin", "tools/t.sh"]
            .into_iter()
            .map(file)
            .collect();
        let tree = build_tree(&files, "bucket");

        assert_eq!(
            plain(&render_tree(&tree, false, now())),
            vec![
                "▾ bucket/",
                "  ▾ opx/",
                "    ▾ 2.0/",
                "      a.bin (1 B, 2 days ago)",
                "    ▸ 1.0/",
                "  ▾ tools/",
                "    t.sh (1 B, 2 days ago)",
            ]
        );
    }

    #[test]
    fn all_flag_expands_everything() {
        let files: Vec<_> = ["opx/1.0/a.bin", "opx/2.0/a.bin"]
            .into_iter()
            .map(file)
            .collect();
        let tree = build_tree(&files, "bucket");
        let lines = plain(&render_tree(&tree, true, now()));
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|l| !l.contains('▸')));
    }

    #[test]
    fn collapsed_root_hides_contents() {
        let mut tree = build_tree(&[file("a/b")], "bucket");
        tree.set_show(NodeId::ROOT, false);
        assert_eq!(plain(&render_tree(&tree, false, now())), vec!["▸ bucket/"]);
    }

    #[test]
    fn renders_file_paths() {
        let mut recent = file("a/b.txt");
        recent.last_modified = now() - Duration::hours(3);
        recent.size = 2048;
        assert_eq!(
            plain(&render_files(&[&recent], now())),
            vec!["a/b.txt (2.00 KB, 3 hours ago)"]
        );
    }
}
