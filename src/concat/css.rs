//! Stylesheet rewriting for concatenation.
//!
//! A stylesheet moved into a `/_static/` response loses its base URL, so
//! relative `url()` targets and `@import` rules are made site-absolute.
//! `@charset` and `@import` must precede every other rule, so they are lifted
//! out of each body into a [`Preamble`] shared by the batch.
//!
//! Bodies are rewritten as bytes: a stylesheet in a legacy charset passes
//! through with every byte outside the rewritten rules untouched.

use crate::utils::path::{dir_prefix, is_external_link, url_dirname};
use regex::bytes::{Captures, Regex};
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)\burl\(\s*(?:"([^"]*)"|'([^']*)'|([^'"\s)][^)]*?))\s*\)"#)
        .expect("url() pattern is valid")
});

static CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)@charset\s+['"][^'"]+['"];"#).expect("@charset pattern is valid")
});

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?i-u)(?P<pre>@import\b\s*(?:url\s*\()?['"\s]*)"#,
        r#"(?P<path>[^'"\s](?:https?://.+/?)?.+?)"#,
        r#"(?P<post>['"\s)]*(?:\W|screen|print|all);)"#,
    ))
    .expect("@import pattern is valid")
});

/// UTF-8 byte order mark.
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Rules hoisted to the top of a concatenated stylesheet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Preamble {
    /// First `@charset` rule seen in the batch.
    pub charset: Option<Vec<u8>>,
    /// `@import` rules in encounter order.
    pub imports: Vec<Vec<u8>>,
}

impl Preamble {
    pub fn is_empty(&self) -> bool {
        self.charset.is_none() && self.imports.is_empty()
    }

    /// Charset line, then import lines, each newline-terminated.
    pub fn render(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for rule in self.charset.iter().chain(&self.imports) {
            out.extend_from_slice(rule);
            out.push(b'\n');
        }
        out
    }
}

/// Directory prefix (with trailing `/`) that relative references resolve against.
///
/// `("", "/theme/style.css")` -> `/theme/`, `("/blog", "/style.css")` -> `/blog/`
pub fn resource_dir(subdir_prefix: &str, requested_path: &str) -> String {
    let rooted;
    let path = if requested_path.starts_with('/') {
        requested_path
    } else {
        rooted = format!("/{requested_path}");
        &rooted
    };
    let dir = url_dirname(path);
    if dir == "/" {
        dir_prefix(&format!("{subdir_prefix}/"))
    } else {
        dir_prefix(&format!("{subdir_prefix}{dir}"))
    }
}

/// Whether a `url()` or `@import` target resolves against the stylesheet.
fn is_relative_target(target: &[u8]) -> bool {
    !(target.is_empty()
        || target.starts_with(b"/")
        || target.starts_with(b"#")
        || target.starts_with(b"%23")
        || is_external_link(&String::from_utf8_lossy(target)))
}

/// Rewrite relative `url()` targets, keeping the original quoting.
pub fn rewrite_urls(css: &[u8], dir: &str) -> Vec<u8> {
    URL_RE
        .replace_all(css, |caps: &Captures| {
            let (quote, target) = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(m), _, _) => (b"\"".as_slice(), m.as_bytes()),
                (_, Some(m), _) => (b"'".as_slice(), m.as_bytes()),
                (_, _, Some(m)) => (b"".as_slice(), m.as_bytes()),
                _ => return caps[0].to_vec(),
            };
            let target = target.trim_ascii();
            if is_relative_target(target) {
                let parts: [&[u8]; 6] = [b"url(", quote, dir.as_bytes(), target, quote, b")"];
                parts.concat()
            } else {
                caps[0].to_vec()
            }
        })
        .into_owned()
}

/// Remove `@charset` rules, keeping the first one of the batch.
fn hoist_charset(css: Vec<u8>, preamble: &mut Preamble) -> Vec<u8> {
    if !css.starts_with(b"@charset") {
        return css;
    }
    CHARSET_RE
        .replace_all(&css, |caps: &Captures| {
            if preamble.charset.is_none() {
                preamble.charset = Some(caps[0].to_vec());
            }
            Vec::new()
        })
        .into_owned()
}

/// Remove `@import` rules into the preamble, resolving relative targets.
fn hoist_imports(css: Vec<u8>, dir: &str, preamble: &mut Preamble) -> Vec<u8> {
    IMPORT_RE
        .replace_all(&css, |caps: &Captures| {
            let path = &caps["path"];
            let rule = if path.starts_with(b"http") || path.starts_with(b"/") {
                caps[0].to_vec()
            } else {
                [&caps["pre"], dir.as_bytes(), path, &caps["post"]].concat()
            };
            preamble.imports.push(rule);
            Vec::new()
        })
        .into_owned()
}

/// Rewrite one stylesheet of a batch.
///
/// A leading byte order mark is dropped so it never lands mid-response.
/// `dir` comes from [`resource_dir`]. Hoisted rules accumulate in `preamble`.
pub fn rewrite(css: &[u8], dir: &str, preamble: &mut Preamble) -> Vec<u8> {
    let css = css.strip_prefix(BOM).unwrap_or(css);
    let css = rewrite_urls(css, dir);
    let css = hoist_charset(css, preamble);
    hoist_imports(css, dir, preamble)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    fn urls(css: &str, dir: &str) -> String {
        text(rewrite_urls(css.as_bytes(), dir))
    }

    fn imports(preamble: &Preamble) -> Vec<String> {
        preamble.imports.iter().map(|i| text(i.clone())).collect()
    }

    #[test]
    fn test_resource_dir() {
        assert_eq!(resource_dir("", "/theme/style.css"), "/theme/");
        assert_eq!(resource_dir("", "/style.css"), "/");
        assert_eq!(resource_dir("", "style.css"), "/");
        assert_eq!(resource_dir("", "theme/a/b.css"), "/theme/a/");
        assert_eq!(resource_dir("/blog", "/style.css"), "/blog/");
        assert_eq!(resource_dir("/blog", "/theme/style.css"), "/blog/theme/");
    }

    #[test]
    fn test_rewrite_relative_urls() {
        let css = r#"a{background:url(img/x.png)}b{background:url("img/y.png")}c{background:url('../z.png')}"#;
        assert_eq!(
            urls(css, "/theme/"),
            r#"a{background:url(/theme/img/x.png)}b{background:url("/theme/img/y.png")}c{background:url('/theme/../z.png')}"#
        );
    }

    #[test]
    fn test_rewrite_leaves_absolute_urls() {
        let css = concat!(
            "a{background:url(data:image/png;base64,AAAA)}",
            "b{background:url(/abs/x.png)}",
            "c{background:url(//cdn.example.com/x.png)}",
            "d{background:url(https://example.com/x.png)}",
            "e{filter:url(#svg-filter)}",
            "f{filter:url(\"%23f\")}",
            "g{background:url( 'HTTP://example.com/x.png' )}",
        );
        assert_eq!(urls(css, "/theme/"), css);
    }

    #[test]
    fn test_rewrite_url_case_and_spacing() {
        assert_eq!(
            urls("a{background:URL( img/x.png )}", "/t/"),
            "a{background:url(/t/img/x.png)}"
        );
    }

    #[test]
    fn test_import_hoisted_and_resolved() {
        let mut preamble = Preamble::default();
        let css = "@import \"reset.css\";\n@import url(http://fonts.example.com/f.css);\nbody{color:red}";
        let out = text(rewrite(css.as_bytes(), "/theme/", &mut preamble));

        assert!(!out.contains("@import"));
        assert!(out.contains("body{color:red}"));
        assert_eq!(
            imports(&preamble),
            vec![
                "@import \"/theme/reset.css\";",
                "@import url(http://fonts.example.com/f.css);",
            ]
        );
    }

    #[test]
    fn test_import_url_form_keeps_media() {
        let mut preamble = Preamble::default();
        let out = text(rewrite(b"@import url(\"print.css\") print;\np{}", "/t/", &mut preamble));

        assert_eq!(out.trim(), "p{}");
        assert_eq!(imports(&preamble), vec!["@import url(\"/t/print.css\") print;"]);
    }

    #[test]
    fn test_charset_first_wins() {
        let mut preamble = Preamble::default();
        let a = text(rewrite(b"@charset \"UTF-8\";\na{}", "/", &mut preamble));
        let b = text(rewrite(b"@charset 'iso-8859-1';\nb{}", "/", &mut preamble));

        assert_eq!(preamble.charset.as_deref(), Some(b"@charset \"UTF-8\";".as_slice()));
        assert!(!a.contains("@charset"));
        assert!(!b.contains("@charset"));
    }

    #[test]
    fn test_charset_only_when_leading() {
        let mut preamble = Preamble::default();
        let css = "a{}\n@charset \"UTF-8\";";
        assert_eq!(text(rewrite(css.as_bytes(), "/", &mut preamble)), css);
        assert!(preamble.charset.is_none());

        let out = rewrite("\u{feff}@charset \"UTF-8\";a{}".as_bytes(), "/", &mut preamble);
        assert_eq!(out, b"a{}");
        assert!(preamble.charset.is_some());
    }

    #[test]
    fn test_bom_dropped_from_every_body() {
        let mut preamble = Preamble::default();
        let first = rewrite("\u{feff}a{color:red}".as_bytes(), "/", &mut preamble);
        let second = rewrite("\u{feff}b{color:red}".as_bytes(), "/", &mut preamble);

        assert_eq!(first, b"a{color:red}");
        assert_eq!(second, b"b{color:red}");
        assert!(preamble.is_empty());
    }

    #[test]
    fn test_latin1_body_bytes_preserved() {
        let mut preamble = Preamble::default();
        let css = b"@charset \"iso-8859-1\";\na:after{content:\"\xe9\"}b{background:url(\xe9t\xe9.png)}";
        let out = rewrite(css, "/img/", &mut preamble);

        assert_eq!(out, b"\na:after{content:\"\xe9\"}b{background:url(/img/\xe9t\xe9.png)}");
        assert_eq!(
            preamble.charset.as_deref(),
            Some(b"@charset \"iso-8859-1\";".as_slice())
        );
    }

    #[test]
    fn test_preamble_render() {
        let preamble = Preamble {
            charset: Some(b"@charset \"UTF-8\";".to_vec()),
            imports: vec![b"@import \"/a.css\";".to_vec(), b"@import \"/b.css\";".to_vec()],
        };
        assert_eq!(
            text(preamble.render()),
            "@charset \"UTF-8\";\n@import \"/a.css\";\n@import \"/b.css\";\n"
        );
        assert!(Preamble::default().is_empty());
        assert!(Preamble::default().render().is_empty());
    }
}
