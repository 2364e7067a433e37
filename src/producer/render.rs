//! Tag output for asset queues.
//!
//! Eligible assets are grouped into runs and printed as one concat URL per
//! run, split every `max_files` paths; everything else is printed as an
//! ordinary tag between runs.

use super::eligibility::{ConcatFilter, concat_path};
use super::href::{batch_href, batch_hrefs};
use super::registry::{AssetRegistry, HEAD_GROUP};
use super::{Asset, AssetKind, ConcatSettings, ScriptGroup};
use crate::debug;
use crate::utils::html::{escape_attr, escape_url};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Stylesheets of one run that share a media query.
#[derive(Debug)]
struct MediaGroup {
    media: String,
    handles: Vec<String>,
    paths: Vec<String>,
}

#[derive(Debug)]
enum StyleEntry {
    Concat(Vec<MediaGroup>),
    Single(String),
}

#[derive(Debug, Default)]
struct ScriptRun {
    handles: Vec<String>,
    paths: Vec<String>,
    before: Vec<String>,
    after: Vec<String>,
}

#[derive(Debug)]
enum ScriptEntry {
    Concat(ScriptRun),
    Single(String),
}

/// Prints an [`AssetRegistry`], concatenating what it can.
pub struct AssetConcat<'a> {
    registry: &'a mut AssetRegistry,
    settings: &'a ConcatSettings,
    filter: &'a dyn ConcatFilter,
    root_canonical: PathBuf,
}

impl<'a> AssetConcat<'a> {
    pub fn new(
        registry: &'a mut AssetRegistry,
        settings: &'a ConcatSettings,
        filter: &'a dyn ConcatFilter,
    ) -> Self {
        let root_canonical = settings
            .root
            .canonicalize()
            .unwrap_or_else(|_| settings.root.clone());
        Self {
            registry,
            settings,
            filter,
            root_canonical,
        }
    }

    fn batch_path(&self, asset: &Asset, kind: AssetKind) -> Option<String> {
        concat_path(asset, kind, self.settings, &self.root_canonical, self.filter)
    }

    /// `src` as printed in an ordinary tag.
    fn item_src(&self, asset: &Asset) -> String {
        let src = &asset.src;
        let mut url = if src.starts_with("//") || src.starts_with("http://") || src.starts_with("https://") {
            src.clone()
        } else {
            format!("{}{src}", self.settings.site_url)
        };
        if let Some(version) = asset.version.as_deref().filter(|v| !v.is_empty()) {
            let sep = if url.contains('?') { "&amp;" } else { "?" };
            let _ = write!(url, "{sep}ver={version}");
        }
        url
    }

    // ========================================================================
    // styles
    // ========================================================================

    /// Print the style queue (or `handles`), returning the tags.
    pub fn do_styles(&mut self, handles: Option<&[String]>) -> String {
        let handles = handles.map_or_else(|| self.registry.queue.clone(), <[String]>::to_vec);
        self.registry.all_deps(&handles);

        let mut entries: Vec<(usize, StyleEntry)> = Vec::new();
        let mut index = 0;

        for handle in self.registry.take_to_do() {
            let Some(asset) = self.registry.get(&handle) else {
                continue;
            };

            match self.batch_path(asset, AssetKind::Style) {
                Some(path) => {
                    let media = asset.media().to_string();
                    if !matches!(entries.last(), Some((i, StyleEntry::Concat(_))) if *i == index) {
                        entries.push((index, StyleEntry::Concat(Vec::new())));
                    }
                    let Some((_, StyleEntry::Concat(groups))) = entries.last_mut() else {
                        continue;
                    };
                    match groups.iter_mut().find(|g| g.media == media) {
                        Some(group) => {
                            group.handles.push(handle.clone());
                            group.paths.push(path);
                        }
                        None => groups.push(MediaGroup {
                            media,
                            handles: vec![handle.clone()],
                            paths: vec![path],
                        }),
                    }
                    self.registry.mark_done(&handle);
                }
                None => {
                    index += 1;
                    entries.push((index, StyleEntry::Single(handle)));
                    index += 1;
                }
            }
        }

        let mut out = String::new();
        for (idx, entry) in entries {
            match entry {
                StyleEntry::Single(handle) => {
                    if self.print_style(&handle, &mut out) {
                        self.registry.mark_done(&handle);
                    }
                }
                StyleEntry::Concat(groups) => {
                    let max = self.settings.max_files.max(1);
                    for group in groups {
                        let media = escape_attr(&group.media);
                        let chunks = group.paths.chunks(max).zip(group.handles.chunks(max));
                        for (n, (paths, handles)) in chunks.enumerate() {
                            let href = batch_href(self.settings, paths, "");
                            debug!("concat"; "{} stylesheets -> {}", paths.len(), href);
                            let id = match n {
                                0 => format!("{media}-css-{idx}"),
                                _ => format!("{media}-css-{idx}-{n}"),
                            };
                            let _ = writeln!(
                                out,
                                "<link rel='stylesheet' id='{id}' href='{}' type='text/css' media='{media}' />",
                                escape_url(&href)
                            );
                            for handle in handles {
                                self.print_inline_style(handle, &mut out);
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// Ordinary `<link>` for a single stylesheet.
    fn print_style(&self, handle: &str, out: &mut String) -> bool {
        let Some(asset) = self.registry.get(handle) else {
            return false;
        };
        if asset.src.is_empty() {
            self.print_inline_style(handle, out);
            return true;
        }

        let href = self.item_src(asset);
        let media = escape_attr(asset.media());
        let id = escape_attr(handle);

        if let Some(cond) = &asset.conditional {
            let _ = writeln!(out, "<!--[if {cond}]>");
        }
        let _ = writeln!(
            out,
            "<link rel='stylesheet' id='{id}-css' href='{}' type='text/css' media='{media}' />",
            escape_url(&href)
        );
        if self.settings.rtl && asset.rtl {
            let rtl_href = href.replacen(".css", "-rtl.css", 1);
            let _ = writeln!(
                out,
                "<link rel='stylesheet' id='{id}-rtl-css' href='{}' type='text/css' media='{media}' />",
                escape_url(&rtl_href)
            );
        }
        self.print_inline_style(handle, out);
        if asset.conditional.is_some() {
            let _ = writeln!(out, "<![endif]-->");
        }
        true
    }

    fn print_inline_style(&self, handle: &str, out: &mut String) {
        let Some(asset) = self.registry.get(handle) else {
            return;
        };
        if asset.inline.is_empty() {
            return;
        }
        let _ = write!(
            out,
            "<style id='{}-inline-css' type='text/css'>\n{}\n</style>\n",
            escape_attr(handle),
            asset.inline.join("\n")
        );
    }

    // ========================================================================
    // scripts
    // ========================================================================

    /// Print the script queue (or `handles`) for `group`, returning the tags.
    ///
    /// A head pass leaves footer scripts pending for the footer pass.
    pub fn do_scripts(&mut self, handles: Option<&[String]>, group: ScriptGroup) -> String {
        let handles = handles.map_or_else(|| self.registry.queue.clone(), <[String]>::to_vec);
        self.registry.all_deps(&handles);

        let mut entries: Vec<(usize, ScriptEntry)> = Vec::new();
        let mut level = 0;

        for handle in self.registry.take_to_do() {
            if self.registry.is_done(&handle) {
                continue;
            }
            let Some(asset) = self.registry.get(&handle).cloned() else {
                continue;
            };

            if asset.src.is_empty() {
                self.registry.mark_done(&handle);
                continue;
            }

            if group == ScriptGroup::Head && self.registry.group_of(&handle) > HEAD_GROUP {
                self.registry.defer_to_footer(&handle);
                continue;
            }
            if group == ScriptGroup::All {
                self.registry.clear_footer_mark(&handle);
            }

            match self.batch_path(&asset, AssetKind::Script) {
                Some(path) => {
                    let before = inline_script(&asset.before);
                    let after = inline_script(&asset.after);
                    if !matches!(entries.last(), Some((l, ScriptEntry::Concat(_))) if *l == level) {
                        entries.push((level, ScriptEntry::Concat(ScriptRun::default())));
                    }
                    let Some((_, ScriptEntry::Concat(run))) = entries.last_mut() else {
                        continue;
                    };
                    run.handles.push(handle);
                    run.paths.push(path);
                    run.before.extend(before);
                    run.after.extend(after);
                }
                None => {
                    level += 1;
                    entries.push((level, ScriptEntry::Single(handle)));
                    level += 1;
                }
            }
        }

        let mut out = String::new();
        for (_, entry) in entries {
            match entry {
                ScriptEntry::Single(handle) => {
                    if self.print_script(&handle, &mut out) {
                        self.registry.mark_done(&handle);
                    }
                }
                ScriptEntry::Concat(run) => {
                    for handle in &run.handles {
                        self.print_extra_script(handle, &mut out);
                    }
                    for handle in &run.handles {
                        self.registry.mark_done(handle);
                    }
                    for block in &run.before {
                        out.push_str(block);
                    }
                    for href in batch_hrefs(self.settings, &run.paths, "j") {
                        debug!("concat"; "{} scripts -> {}", run.paths.len(), href);
                        let _ = writeln!(
                            out,
                            "<script type='text/javascript' src='{}'></script>",
                            escape_url(&href)
                        );
                    }
                    for block in &run.after {
                        out.push_str(block);
                    }
                }
            }
        }
        out
    }

    /// Ordinary `<script>` for a single script.
    fn print_script(&self, handle: &str, out: &mut String) -> bool {
        let Some(asset) = self.registry.get(handle) else {
            return false;
        };

        self.print_extra_script(handle, out);

        if let Some(cond) = &asset.conditional {
            let _ = writeln!(out, "<!--[if {cond}]>");
        }
        if let Some(block) = inline_script(&asset.before) {
            out.push_str(&block);
        }
        let _ = writeln!(
            out,
            "<script type='text/javascript' src='{}'></script>",
            escape_url(&self.item_src(asset))
        );
        if let Some(block) = inline_script(&asset.after) {
            out.push_str(&block);
        }
        if asset.conditional.is_some() {
            let _ = writeln!(out, "<![endif]-->");
        }
        true
    }

    /// Localized data block printed ahead of a script.
    fn print_extra_script(&self, handle: &str, out: &mut String) {
        let Some(data) = self
            .registry
            .get(handle)
            .and_then(|a| a.data.as_deref())
            .filter(|d| !d.is_empty())
        else {
            return;
        };
        let _ = write!(
            out,
            "<script type='text/javascript'>\n/* <![CDATA[ */\n{data}\n/* ]]> */\n</script>\n"
        );
    }
}

/// `<script>` block for inline code, `None` when there is none.
fn inline_script(blocks: &[String]) -> Option<String> {
    if blocks.is_empty() {
        return None;
    }
    Some(format!(
        "<script type='text/javascript'>\n{}\n</script>\n",
        blocks.join("\n")
    ))
}
