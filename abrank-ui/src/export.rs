//! Export layer
//!
//! Renders the annotations for the current filtered view as JSON, CSV, or
//! Markdown, and can materialize a shareable static HTML snapshot under a
//! random key. All renderers are pure functions of (filtered list,
//! restricted annotation map); only the snapshot variant touches storage.

use abrank_common::config::StoragePaths;
use abrank_common::db::{Annotation, AnnotationLabel, Question};
use abrank_common::Result;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use std::collections::BTreeMap;

/// One annotated question of the filtered view, in filtered-list order
pub struct ExportEntry<'a> {
    pub question: &'a Question,
    pub annotation: &'a Annotation,
}

/// Pair filtered questions with their annotations, skipping unannotated ones
pub fn restrict<'a>(
    filtered: &[&'a Question],
    annotations: &'a BTreeMap<i64, Annotation>,
) -> Vec<ExportEntry<'a>> {
    filtered
        .iter()
        .filter_map(|q| {
            annotations.get(&q.id).map(|annotation| ExportEntry {
                question: q,
                annotation,
            })
        })
        .collect()
}

/// Pretty-printed JSON object keyed by question id (as string)
pub fn to_json(entries: &[ExportEntry<'_>]) -> String {
    let map: BTreeMap<String, &Annotation> = entries
        .iter()
        .map(|e| (e.question.id.to_string(), e.annotation))
        .collect();
    // BTreeMap serialization cannot fail
    serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
}

/// CSV with one row per annotated question, standard double-quote escaping
pub fn to_csv(entries: &[ExportEntry<'_>]) -> String {
    let mut out = String::from("Question ID,Answer,Comments,Timestamp\n");
    for entry in entries {
        out.push_str(&format!(
            "{},{},{},{}\n",
            entry.question.id,
            csv_field(entry.annotation.answer.as_str()),
            csv_field(entry.annotation.comments.as_deref().unwrap_or("")),
            csv_field(&entry.annotation.timestamp),
        ));
    }
    out
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Markdown document: heading + question text + label-dependent body per
/// annotated question; a placeholder document when nothing is annotated
pub fn to_markdown(entries: &[ExportEntry<'_>]) -> String {
    let mut out = String::from("# Annotation Results\n\n");

    if entries.is_empty() {
        out.push_str("No annotations yet.\n");
        return out;
    }

    for entry in entries {
        let q = entry.question;
        out.push_str(&format!("## Question {} ({})\n\n", q.id, q.model_name));
        out.push_str(&format!("{}\n\n", q.question));

        match entry.annotation.answer {
            AnnotationLabel::BothCorrect => {
                out.push_str(&format!("**Answer A**\n\n{}\n\n", q.answer_a));
                out.push_str(&format!("**Answer B**\n\n{}\n\n", q.answer_b));
            }
            AnnotationLabel::ABetter => {
                out.push_str(&format!("**Answer A**\n\n{}\n\n", q.answer_a));
            }
            AnnotationLabel::BBetter => {
                out.push_str(&format!("**Answer B**\n\n{}\n\n", q.answer_b));
            }
            AnnotationLabel::NotSure => {
                let comments = entry.annotation.comments.as_deref().unwrap_or("");
                out.push_str(&format!("**Comments**: {}\n\n", escape_markdown(comments)));
            }
        }
    }

    out
}

/// Backslash-escape markdown special characters in free text
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '_' | '`' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wrap a markdown rendering in a minimal static HTML page with
/// client-side markdown/math rendering
pub fn shareable_html(markdown: &str) -> String {
    // JSON-escape the markdown so it can be embedded as a JS string
    let source = serde_json::to_string(markdown).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Annotation Results</title>
<style>
body {{ max-width: 48rem; margin: 2rem auto; padding: 0 1rem;
       font-family: system-ui, sans-serif; line-height: 1.6; color: #222; }}
h1, h2 {{ border-bottom: 1px solid #ddd; padding-bottom: 0.3rem; }}
</style>
<script src="https://cdn.jsdelivr.net/npm/marked/marked.min.js"></script>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css">
<script src="https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.js"></script>
</head>
<body>
<div id="content"></div>
<script>
const source = {source};
document.getElementById('content').innerHTML = marked.parse(source);
</script>
</body>
</html>
"#,
        source = source
    )
}

/// Store a shareable snapshot under a fresh random key and return its
/// URL path.
///
/// The key combines a random alphanumeric suffix with a millisecond
/// timestamp, which is unique enough for the lifetime of the preview store.
pub fn store_snapshot(paths: &StoragePaths, html: &str) -> Result<String> {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let key = format!(
        "annotation_preview_{}{}",
        suffix,
        Utc::now().timestamp_millis()
    );

    let file = paths.previews_dir().join(format!("{}.html", key));
    std::fs::write(file, html)?;

    Ok(format!("/preview/{}", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, model: &str) -> Question {
        Question {
            id,
            question: format!("What is {}?", id),
            answer_a: format!("answer a{}", id),
            answer_b: format!("answer b{}", id),
            model_name: model.to_string(),
        }
    }

    fn annotation(label: AnnotationLabel, comments: Option<&str>) -> Annotation {
        Annotation {
            answer: label,
            comments: comments.map(str::to_string),
            timestamp: "2026-08-30T12:00:00.000000Z".to_string(),
        }
    }

    fn setup() -> (Vec<Question>, BTreeMap<i64, Annotation>) {
        let questions = vec![question(1, "X"), question(2, "Y"), question(3, "X")];
        let mut annotations = BTreeMap::new();
        annotations.insert(1, annotation(AnnotationLabel::ABetter, Some("clearer")));
        annotations.insert(3, annotation(AnnotationLabel::NotSure, Some("both *bad*")));
        (questions, annotations)
    }

    #[test]
    fn test_restrict_keeps_filtered_order_and_skips_unannotated() {
        let (questions, annotations) = setup();
        let filtered: Vec<&Question> = questions.iter().collect();
        let entries = restrict(&filtered, &annotations);

        let ids: Vec<i64> = entries.iter().map(|e| e.question.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_json_round_trip() {
        let (questions, annotations) = setup();
        let filtered: Vec<&Question> = questions.iter().collect();
        let entries = restrict(&filtered, &annotations);

        let parsed: BTreeMap<i64, Annotation> =
            serde_json::from_str(&to_json(&entries)).unwrap();
        assert_eq!(parsed, annotations);
    }

    #[test]
    fn test_json_empty_map_is_valid() {
        let parsed: BTreeMap<i64, Annotation> = serde_json::from_str(&to_json(&[])).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_csv_one_row_per_annotated_question() {
        let (questions, annotations) = setup();
        let filtered: Vec<&Question> = questions.iter().collect();
        let entries = restrict(&filtered, &annotations);

        let csv = to_csv(&entries);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Question ID,Answer,Comments,Timestamp");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,\"a_better\",\"clearer\""));
        assert!(lines[2].starts_with("3,\"not_sure\",\"both *bad*\""));
    }

    #[test]
    fn test_csv_doubles_embedded_quotes() {
        let q = question(1, "X");
        let a = annotation(AnnotationLabel::ABetter, Some("said \"wrong\""));
        let entries = vec![ExportEntry {
            question: &q,
            annotation: &a,
        }];

        let csv = to_csv(&entries);
        assert!(csv.contains("\"said \"\"wrong\"\"\""));
    }

    #[test]
    fn test_csv_empty_is_header_only() {
        assert_eq!(to_csv(&[]), "Question ID,Answer,Comments,Timestamp\n");
    }

    #[test]
    fn test_markdown_placeholder_when_empty() {
        let md = to_markdown(&[]);
        assert!(md.contains("# Annotation Results"));
        assert!(md.contains("No annotations yet."));
    }

    #[test]
    fn test_markdown_label_dependent_bodies() {
        let q = question(1, "X");

        let both = annotation(AnnotationLabel::BothCorrect, None);
        let md = to_markdown(&[ExportEntry {
            question: &q,
            annotation: &both,
        }]);
        assert!(md.contains("answer a1"));
        assert!(md.contains("answer b1"));

        let a_better = annotation(AnnotationLabel::ABetter, None);
        let md = to_markdown(&[ExportEntry {
            question: &q,
            annotation: &a_better,
        }]);
        assert!(md.contains("answer a1"));
        assert!(!md.contains("answer b1"));

        let not_sure = annotation(AnnotationLabel::NotSure, Some("under_score and *stars*"));
        let md = to_markdown(&[ExportEntry {
            question: &q,
            annotation: &not_sure,
        }]);
        assert!(!md.contains("answer a1"));
        assert!(md.contains("under\\_score and \\*stars\\*"));
    }

    #[test]
    fn test_markdown_skips_unannotated_questions() {
        let (questions, annotations) = setup();
        let filtered: Vec<&Question> = questions.iter().collect();
        let entries = restrict(&filtered, &annotations);

        let md = to_markdown(&entries);
        assert!(md.contains("## Question 1"));
        assert!(!md.contains("## Question 2"));
        assert!(md.contains("## Question 3"));
    }

    #[test]
    fn test_shareable_html_embeds_markdown() {
        let html = shareable_html("# Title\n\nwith \"quotes\" and <tags>");
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("marked.min.js"));
        assert!(html.contains("katex"));
        // Embedded as a JSON string, so quotes are escaped
        assert!(html.contains("with \\\"quotes\\\""));
    }

    #[test]
    fn test_store_snapshot_writes_unique_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = StoragePaths::new(dir.path());
        paths.ensure_directories().unwrap();

        let first = store_snapshot(&paths, "<html>1</html>").unwrap();
        let second = store_snapshot(&paths, "<html>2</html>").unwrap();

        assert!(first.starts_with("/preview/annotation_preview_"));
        assert_ne!(first, second);

        let key = first.strip_prefix("/preview/").unwrap();
        let stored =
            std::fs::read_to_string(paths.previews_dir().join(format!("{}.html", key))).unwrap();
        assert_eq!(stored, "<html>1</html>");
    }
}
