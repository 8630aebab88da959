use std::fs;
use std::path::{Path, PathBuf};

const NOTE_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

pub fn get_note_files(notes_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if notes_dir.is_dir()
        && let Ok(entries) = fs::read_dir(notes_dir)
    {
        for entry in entries.flatten() {
            let path = entry.path();
            if let Some(ext) = path.extension().and_then(|e| e.to_str())
                && NOTE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
            {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Drops a leading `---` front matter block.
pub fn strip_front_matter(text: &str) -> &str {
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return text;
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        if line.trim_end() == "---" {
            return &rest[offset..];
        }
    }
    text
}

pub fn load_note(path: &Path) -> std::io::Result<String> {
    let content = fs::read_to_string(path)?;
    Ok(strip_front_matter(&content).to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteSection {
    pub heading: String,
    /// Section text including its heading line.
    pub text: String,
}

fn heading_title(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        let rest = &trimmed[hashes..];
        if rest.is_empty() || rest.starts_with(' ') {
            return Some(rest.trim());
        }
    }
    None
}

/// Splits markdown into heading-delimited sections. Text before the first
/// heading becomes an untitled section. Sections with no content besides the
/// heading are dropped.
pub fn split_sections(text: &str) -> Vec<NoteSection> {
    let mut sections = Vec::new();
    let mut heading = String::from("(untitled)");
    let mut lines: Vec<&str> = Vec::new();
    let mut has_body = false;
    let mut in_code = false;

    let mut push = |heading: &str, lines: &[&str], has_body: bool| {
        if has_body {
            sections.push(NoteSection {
                heading: heading.to_string(),
                text: lines.join("\n").trim().to_string(),
            });
        }
    };

    for line in text.lines() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
        }
        if !in_code
            && let Some(title) = heading_title(line)
        {
            push(&heading, &lines, has_body);
            heading = if title.is_empty() {
                "(untitled)".to_string()
            } else {
                title.to_string()
            };
            lines = vec![line];
            has_body = false;
            continue;
        }
        if !line.trim().is_empty() {
            has_body = true;
        }
        lines.push(line);
    }
    push(&heading, &lines, has_body);

    sections
}
