use keyhole_core::{Extension, Kind};
use std::collections::HashSet;

/// Decides which extensions a blob kind accepts on create.
pub trait ExtensionPolicy: Send + Sync + 'static {
    fn allows(&self, kind: Kind, ext: Option<&Extension>) -> bool;
}

/// Accepts any well-formed extension, or none.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyExtension;

impl ExtensionPolicy for AnyExtension {
    fn allows(&self, _kind: Kind, _ext: Option<&Extension>) -> bool {
        true
    }
}

/// Restricts blob kinds to configured extensions.
///
/// A kind without a list accepts anything. Matching ignores ASCII case.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    images: Option<HashSet<String>>,
    files: Option<HashSet<String>>,
    require_extension: bool,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.images = Some(normalise(extensions));
        self
    }

    pub fn files<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.files = Some(normalise(extensions));
        self
    }

    /// Rejects uploads that carry no extension at all.
    pub fn require_extension(mut self) -> Self {
        self.require_extension = true;
        self
    }

    fn list_for(&self, kind: Kind) -> Option<&HashSet<String>> {
        match kind {
            Kind::Image => self.images.as_ref(),
            Kind::File => self.files.as_ref(),
            Kind::Link | Kind::Text => None,
        }
    }
}

fn normalise<I, S>(extensions: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

impl ExtensionPolicy for AllowList {
    fn allows(&self, kind: Kind, ext: Option<&Extension>) -> bool {
        match (ext, self.list_for(kind)) {
            (None, _) => !self.require_extension,
            (Some(_), None) => true,
            (Some(ext), Some(list)) => list.contains(&ext.bare().to_ascii_lowercase()),
        }
    }
}

/// Decides which link targets may be published.
///
/// Runs after the router's own checks (non-empty, header-safe, bounded length).
pub trait LinkPolicy: Send + Sync + 'static {
    /// Returns the reason a target is refused.
    fn check(&self, target: &str) -> Result<(), String>;
}

/// Accepts any target, whatever its scheme (`ftp:`, `mailto:`, app links).
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyTarget;

impl LinkPolicy for AnyTarget {
    fn check(&self, _target: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Only absolute http(s) URLs with a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebTargets;

impl LinkPolicy for WebTargets {
    fn check(&self, target: &str) -> Result<(), String> {
        let Some((scheme, rest)) = target.split_once("://") else {
            return Err(format!("link target must have a scheme and host: {target}"));
        };

        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(format!("link target scheme must be http or https: {scheme}"));
        }

        if rest.is_empty() || rest.starts_with('/') {
            return Err(format!("link target must have a host: {target}"));
        }

        Ok(())
    }
}
