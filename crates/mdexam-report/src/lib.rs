//! mdexam-report: self-contained HTML export of exam result history.

pub mod html;

pub use html::{generate_html, write_html_report, ImageMaps};
