//! Import adapter: turns a set of files into exam text plus an image map.
//!
//! The first `.md` file is the exam; every other file is an image that
//! `![[file name]]` tokens in the text may refer to. Tokens stay in the stored
//! text and are resolved when the exam is shown.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::ExamRecord;
use crate::parser::is_markdown;

const TOKEN_OPEN: &str = "![[";
const TOKEN_CLOSE: &str = "]]";

/// Exam text and the images that came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBundle {
    pub source: PathBuf,
    pub text: String,
    /// File name to absolute path.
    pub images: BTreeMap<String, String>,
}

impl ImportBundle {
    /// Classify `paths` and read the exam text.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let source = paths
            .iter()
            .map(|p| p.as_ref())
            .find(|p| is_markdown(p))
            .context("no .md file among the imported files")?
            .to_path_buf();

        let text = std::fs::read_to_string(&source)
            .with_context(|| format!("failed to read exam {}", source.display()))?;

        let mut images = BTreeMap::new();
        for path in paths.iter().map(|p| p.as_ref()).filter(|p| *p != source.as_path()) {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let absolute = std::fs::canonicalize(path)
                .with_context(|| format!("failed to resolve image {}", path.display()))?;
            images.insert(name, absolute.to_string_lossy().into_owned());
        }

        let unknown: Vec<String> = image_tokens(&text)
            .into_iter()
            .filter(|name| !images.contains_key(name))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(images = ?unknown, "exam refers to images that were not imported");
        }

        Ok(Self {
            source,
            text,
            images,
        })
    }

    pub fn into_record(self) -> ExamRecord {
        ExamRecord::new(self.text, self.images)
    }
}

/// Names inside `![[...]]` tokens, in order of appearance.
pub fn image_tokens(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_OPEN) {
        let after = &rest[start + TOKEN_OPEN.len()..];
        let Some(end) = after.find(TOKEN_CLOSE) else {
            break;
        };
        names.push(after[..end].to_string());
        rest = &after[end + TOKEN_CLOSE.len()..];
    }
    names
}

/// Replace every `![[name]]` token that `resolver` knows. Unknown tokens are
/// left as they are.
pub fn replace_image_tokens(text: &str, resolver: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_OPEN) {
        let after = &rest[start + TOKEN_OPEN.len()..];
        let Some(end) = after.find(TOKEN_CLOSE) else {
            break;
        };
        let name = &after[..end];
        let token_len = TOKEN_OPEN.len() + end + TOKEN_CLOSE.len();

        out.push_str(&rest[..start]);
        match resolver(name) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(&rest[start..start + token_len]),
        }
        rest = &rest[start + token_len..];
    }
    out.push_str(rest);
    out
}

/// Rewrite tokens as markdown image links using a record's image map.
pub fn resolve_images(text: &str, images: &BTreeMap<String, String>) -> String {
    replace_image_tokens(text, |name| {
        images.get(name).map(|path| format!("![{name}]({path})"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_in_order() {
        assert_eq!(
            image_tokens("See ![[a.png]] and ![[b c.jpg]]. ![[broken"),
            vec!["a.png", "b c.jpg"]
        );
        assert!(image_tokens("no images").is_empty());
    }

    #[test]
    fn replace_known_tokens_only() {
        let out = replace_image_tokens("x ![[a.png]] y ![[b.png]] z", |name| {
            (name == "a.png").then(|| "<A>".to_string())
        });
        assert_eq!(out, "x <A> y ![[b.png]] z");
    }

    #[test]
    fn unterminated_token_is_kept() {
        let text = "start ![[a.png] end";
        assert_eq!(replace_image_tokens(text, |_| Some("X".into())), text);
    }

    #[test]
    fn resolve_images_writes_markdown_links() {
        let images: BTreeMap<String, String> =
            [("diagram.png".to_string(), "/tmp/diagram.png".to_string())].into();
        assert_eq!(
            resolve_images("Look: ![[diagram.png]]", &images),
            "Look: ![diagram.png](/tmp/diagram.png)"
        );
    }

    #[test]
    fn bundle_picks_first_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("net.png");
        let exam = dir.path().join("exam.MD");
        let other = dir.path().join("second.md");
        std::fs::write(&image, [0u8, 1, 2]).unwrap();
        std::fs::write(&exam, "# Net\n## Which? ![[net.png]]\n- [x] this").unwrap();
        std::fs::write(&other, "# Other").unwrap();

        let bundle = ImportBundle::from_paths(&[image.clone(), exam.clone(), other]).unwrap();
        assert_eq!(bundle.source, exam);
        assert!(bundle.text.starts_with("# Net"));
        assert!(bundle.images.contains_key("net.png"));
        assert!(bundle.images.contains_key("second.md"));

        let record = bundle.into_record();
        assert_eq!(record.title, "Net");
        assert_eq!(record.images.len(), 2);
    }

    #[test]
    fn bundle_without_markdown_fails() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("only.png");
        std::fs::write(&image, [0u8]).unwrap();
        let err = ImportBundle::from_paths(&[image]).unwrap_err();
        assert!(err.to_string().contains("no .md file"));
    }
}
