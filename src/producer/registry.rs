//! Registered assets, the queue, and dependency resolution.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

/// Group a script is printed in.
pub const HEAD_GROUP: u8 = 0;
pub const FOOTER_GROUP: u8 = 1;

/// A registered stylesheet or script.
///
/// Style-only and script-only fields are ignored for the other kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Asset {
    pub handle: String,
    /// Source URL. Empty means the handle only groups its dependencies.
    pub src: String,
    pub deps: Vec<String>,
    pub version: Option<String>,

    /// Stylesheet media (`all` when unset).
    pub media: Option<String>,
    /// IE conditional comment expression.
    pub conditional: Option<String>,
    /// Stylesheet has an RTL variant.
    pub rtl: bool,
    /// Inline CSS printed after the stylesheet.
    pub inline: Vec<String>,

    /// Script belongs in the footer.
    pub footer: bool,
    /// Inline JavaScript printed before the script.
    pub before: Vec<String>,
    /// Inline JavaScript printed after the script.
    pub after: Vec<String>,
    /// Localized data printed before the script.
    pub data: Option<String>,
}

impl Asset {
    pub fn new(handle: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn with_deps(mut self, deps: &[&str]) -> Self {
        self.deps = deps.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn media(&self) -> &str {
        self.media.as_deref().filter(|m| !m.is_empty()).unwrap_or("all")
    }

    fn default_group(&self) -> u8 {
        if self.footer { FOOTER_GROUP } else { HEAD_GROUP }
    }
}

/// Assets of one kind plus the state of printing them.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    registered: FxHashMap<String, Asset>,
    /// Handles requested for output, in order.
    pub queue: Vec<String>,
    to_do: Vec<String>,
    done: Vec<String>,
    groups: FxHashMap<String, u8>,
    in_footer: Vec<String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset. The first registration of a handle wins.
    pub fn register(&mut self, asset: Asset) -> bool {
        if self.registered.contains_key(&asset.handle) {
            return false;
        }
        self.registered.insert(asset.handle.clone(), asset);
        true
    }

    pub fn enqueue(&mut self, handle: impl Into<String>) {
        let handle = handle.into();
        if !self.queue.contains(&handle) {
            self.queue.push(handle);
        }
    }

    pub fn get(&self, handle: &str) -> Option<&Asset> {
        self.registered.get(handle)
    }

    pub fn is_registered(&self, handle: &str) -> bool {
        self.registered.contains_key(handle)
    }

    pub fn is_done(&self, handle: &str) -> bool {
        self.done.iter().any(|h| h == handle)
    }

    pub fn mark_done(&mut self, handle: &str) {
        if !self.is_done(handle) {
            self.done.push(handle.to_string());
        }
    }

    /// Handles printed so far, in print order.
    pub fn done(&self) -> &[String] {
        &self.done
    }

    pub fn group_of(&self, handle: &str) -> u8 {
        self.groups.get(handle).copied().unwrap_or(HEAD_GROUP)
    }

    /// Handles deferred to the footer by a head pass.
    pub fn in_footer(&self) -> &[String] {
        &self.in_footer
    }

    pub fn defer_to_footer(&mut self, handle: &str) {
        if !self.in_footer.iter().any(|h| h == handle) {
            self.in_footer.push(handle.to_string());
        }
    }

    pub fn clear_footer_mark(&mut self, handle: &str) {
        self.in_footer.retain(|h| h != handle);
    }

    /// Take the resolved print order computed by [`Self::all_deps`].
    pub fn take_to_do(&mut self) -> Vec<String> {
        std::mem::take(&mut self.to_do)
    }

    /// Expand `handles` so every dependency precedes its dependents.
    ///
    /// Done handles are skipped. A handle that is not registered, or that
    /// depends on something unregistered, is dropped along with everything
    /// depending on it. A script's group is lowered to that of a head-group
    /// dependent.
    pub fn all_deps(&mut self, handles: &[String]) -> bool {
        let mut visiting = FxHashSet::default();
        self.resolve(handles, false, None, &mut visiting)
    }

    fn resolve(
        &mut self,
        handles: &[String],
        recursion: bool,
        group: Option<u8>,
        visiting: &mut FxHashSet<String>,
    ) -> bool {
        for handle in handles {
            if self.is_done(handle) {
                continue;
            }

            let queued = self.to_do.contains(handle);
            let moved = self.set_group(handle, group);
            if queued && !moved {
                continue;
            }
            // Dependency cycle: the handle is already being resolved.
            if visiting.contains(handle) {
                continue;
            }

            let keep_going = match self.registered.get(handle) {
                None => false,
                Some(asset) if asset.deps.iter().any(|d| !self.is_registered(d)) => false,
                Some(asset) if asset.deps.is_empty() => true,
                Some(asset) => {
                    let deps = asset.deps.clone();
                    let new_group = self.group_of(handle);
                    visiting.insert(handle.clone());
                    let ok = self.resolve(&deps, true, Some(new_group), visiting);
                    visiting.remove(handle);
                    ok
                }
            };

            if !keep_going {
                if recursion {
                    return false;
                }
                continue;
            }

            if !queued {
                self.to_do.push(handle.clone());
            }
        }
        true
    }

    /// Assign the handle's group, never raising an existing one.
    fn set_group(&mut self, handle: &str, group: Option<u8>) -> bool {
        let own = self.get(handle).map_or(HEAD_GROUP, Asset::default_group);
        let group = group.map_or(own, |g| own.min(g));

        if self.groups.get(handle).is_some_and(|&current| current <= group) {
            return false;
        }
        self.groups.insert(handle.to_string(), group);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn registry(assets: Vec<Asset>) -> AssetRegistry {
        let mut registry = AssetRegistry::new();
        for asset in assets {
            registry.register(asset);
        }
        registry
    }

    #[test]
    fn test_deps_come_first() {
        let mut reg = registry(vec![
            Asset::new("app", "/app.js").with_deps(&["lib", "util"]),
            Asset::new("lib", "/lib.js").with_deps(&["util"]),
            Asset::new("util", "/util.js"),
        ]);
        assert!(reg.all_deps(&handles(&["app"])));
        assert_eq!(reg.take_to_do(), handles(&["util", "lib", "app"]));
    }

    #[test]
    fn test_missing_dependency_drops_branch() {
        let mut reg = registry(vec![
            Asset::new("a", "/a.js").with_deps(&["ghost"]),
            Asset::new("b", "/b.js").with_deps(&["a"]),
            Asset::new("c", "/c.js"),
        ]);
        reg.all_deps(&handles(&["b", "c", "unknown"]));
        assert_eq!(reg.take_to_do(), handles(&["c"]));
    }

    #[test]
    fn test_done_handles_skipped() {
        let mut reg = registry(vec![
            Asset::new("a", "/a.css"),
            Asset::new("b", "/b.css").with_deps(&["a"]),
        ]);
        reg.mark_done("a");
        reg.all_deps(&handles(&["b"]));
        assert_eq!(reg.take_to_do(), handles(&["b"]));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut reg = registry(vec![
            Asset::new("a", "/a.js").with_deps(&["b"]),
            Asset::new("b", "/b.js").with_deps(&["a"]),
        ]);
        reg.all_deps(&handles(&["a"]));
        assert_eq!(reg.take_to_do(), handles(&["b", "a"]));
    }

    #[test]
    fn test_footer_dependency_lowered_to_head() {
        let mut lib = Asset::new("lib", "/lib.js");
        lib.footer = true;
        let mut late = Asset::new("late", "/late.js");
        late.footer = true;

        let mut reg = registry(vec![
            Asset::new("app", "/app.js").with_deps(&["lib"]),
            lib,
            late,
        ]);
        reg.all_deps(&handles(&["app", "late"]));

        assert_eq!(reg.group_of("app"), HEAD_GROUP);
        assert_eq!(reg.group_of("lib"), HEAD_GROUP);
        assert_eq!(reg.group_of("late"), FOOTER_GROUP);
    }

    #[test]
    fn test_register_first_wins() {
        let mut reg = AssetRegistry::new();
        assert!(reg.register(Asset::new("a", "/one.css")));
        assert!(!reg.register(Asset::new("a", "/two.css")));
        assert_eq!(reg.get("a").map(|a| a.src.as_str()), Some("/one.css"));
    }

    #[test]
    fn test_media_default() {
        let mut asset = Asset::new("a", "/a.css");
        assert_eq!(asset.media(), "all");
        asset.media = Some("print".into());
        assert_eq!(asset.media(), "print");
    }
}
