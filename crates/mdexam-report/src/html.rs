//! HTML results export.
//!
//! Produces a self-contained HTML file with all CSS inlined: one section per
//! exam with a score-trend chart, the attempt table and the missed questions
//! of every attempt.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use mdexam_core::history::ExamResultLog;
use mdexam_core::import::replace_image_tokens;
use mdexam_core::report::AttemptReview;
use mdexam_core::statistics::{compute_trend, trend_points, TrendPoint};

/// Image maps of stored exams, keyed by exam id.
pub type ImageMaps = HashMap<Uuid, BTreeMap<String, String>>;

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Inverse of [`html_escape`].
fn html_unescape(s: &str) -> String {
    s.replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Escape a prompt and turn known `![[name]]` tokens into `<img>` tags.
///
/// Tokens are found in the escaped text, so names are unescaped before the
/// image lookup.
fn render_prompt(prompt: &str, images: Option<&BTreeMap<String, String>>) -> String {
    let escaped = html_escape(prompt);
    let Some(images) = images else {
        return escaped;
    };
    replace_image_tokens(&escaped, |name| {
        images.get(&html_unescape(name)).map(|src| {
            format!("<img src=\"{}\" alt=\"{name}\">", html_escape(src))
        })
    })
}

/// Generate the results page for a set of exam logs, in the order given.
pub fn generate_html(logs: &[ExamResultLog], images: &ImageMaps) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>mdexam results</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n<h1>mdexam results</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} exams | {} attempts | exported {}</p>\n",
        logs.len(),
        logs.iter().map(|l| l.results.len()).sum::<usize>(),
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    if logs.iter().all(ExamResultLog::is_empty) {
        html.push_str("<p>No results yet.</p>\n");
    }

    for log in logs.iter().filter(|l| !l.is_empty()) {
        html.push_str(&exam_section(log, images.get(&log.exam_id)));
    }

    html.push_str("</body>\n</html>");
    html
}

fn exam_section(log: &ExamResultLog, images: Option<&BTreeMap<String, String>>) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<section class=\"exam\" id=\"exam-{}\">\n<h2>{}</h2>\n",
        log.exam_id,
        html_escape(log.title())
    ));

    if let Some(trend) = compute_trend(log) {
        let change = match trend.change {
            Some(delta) => format!(" | change {delta:+}"),
            None => String::new(),
        };
        html.push_str(&format!(
            "<p class=\"meta\">{} attempts | latest {}% | best {}% | worst {}% | mean {:.1}%{change}</p>\n",
            trend.attempts, trend.latest, trend.best, trend.worst, trend.mean
        ));
    }

    html.push_str(&generate_line_chart(&trend_points(log)));

    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Attempt</th><th>Date</th><th>Score</th><th>Percent</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for record in &log.results {
        let class = if record.score == record.total { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}/{}</td><td>{}%</td></tr>\n",
            record.attempt_number,
            record.date.format("%Y-%m-%d %H:%M"),
            record.score,
            record.total,
            record.score_percent
        ));
    }
    html.push_str("</tbody></table>\n");

    for record in &log.results {
        let review = AttemptReview::from_record(record);
        let missed = review.missed();
        html.push_str(&format!(
            "<details>\n<summary>Attempt {}: {} missed</summary>\n",
            review.attempt_number,
            missed.len()
        ));
        if missed.is_empty() {
            html.push_str("<p>Nothing missed.</p>\n");
        }
        for question in missed {
            html.push_str(&format!(
                "<div class=\"question\">\n<p><strong>{}.</strong> {}</p>\n<ul>\n",
                question.number,
                render_prompt(&question.prompt, images)
            ));
            for choice in &question.choices {
                let class = match (choice.is_correct, choice.selected) {
                    (true, _) => "correct",
                    (false, true) => "wrong",
                    (false, false) => "",
                };
                let mark = if choice.selected { "&#x2611;" } else { "&#x2610;" };
                html.push_str(&format!(
                    "<li class=\"{class}\">{mark} {}</li>\n",
                    html_escape(&choice.text)
                ));
            }
            html.push_str("</ul>\n</div>\n");
        }
        html.push_str("</details>\n");
    }

    html.push_str("</section>\n");
    html
}

/// Write the results page to a file.
pub fn write_html_report(logs: &[ExamResultLog], images: &ImageMaps, path: &Path) -> Result<()> {
    let html = generate_html(logs, images);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// Score percent per attempt as an SVG line chart.
fn generate_line_chart(points: &[TrendPoint]) -> String {
    let width = 640usize;
    let height = 260usize;
    let left = 50usize;
    let right = 20usize;
    let top = 20usize;
    let bottom = 40usize;
    let plot_w = width - left - right;
    let plot_h = height - top - bottom;

    let x_at = |i: usize| -> f64 {
        if points.len() <= 1 {
            (left + plot_w / 2) as f64
        } else {
            left as f64 + i as f64 * plot_w as f64 / (points.len() - 1) as f64
        }
    };
    let y_at = |percent: u8| -> f64 {
        top as f64 + (100.0 - f64::from(percent)) / 100.0 * plot_h as f64
    };

    let mut svg = format!(
        "<svg class=\"chart\" width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );

    for tick in [0u8, 25, 50, 75, 100] {
        let y = y_at(tick);
        svg.push_str(&format!(
            "  <line x1=\"{left}\" y1=\"{y:.1}\" x2=\"{}\" y2=\"{y:.1}\" stroke=\"currentColor\" stroke-opacity=\"0.15\"/>\n",
            left + plot_w
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{y:.1}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{tick}%</text>\n",
            left - 8
        ));
    }

    let path: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", x_at(i), y_at(p.percent)))
        .collect();
    if points.len() > 1 {
        svg.push_str(&format!(
            "  <polyline points=\"{}\" fill=\"none\" stroke=\"#3b82f6\" stroke-width=\"2\"/>\n",
            path.join(" ")
        ));
    }

    for (i, point) in points.iter().enumerate() {
        let (x, y) = (x_at(i), y_at(point.percent));
        svg.push_str(&format!(
            "  <circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"4\" fill=\"#3b82f6\"><title>{}: {}%</title></circle>\n",
            html_escape(&point.label),
            point.percent
        ));
        svg.push_str(&format!(
            "  <text x=\"{x:.1}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            height - bottom + 18,
            html_escape(&point.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
li.correct { font-weight: bold; }
li.wrong { text-decoration: line-through; }
.question img { max-width: 100%; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
