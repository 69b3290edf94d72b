//! Release and asset selection
//!
//! Narrows the release list returned by the API down to the assets a run acts
//! on. Release order from the API (newest first) is trusted and preserved.

use crate::config::SelectionFilter;
use crate::error::Result;
use crate::pattern;
use crate::types::{Asset, Release};
use tracing::debug;

/// Assets of one release that passed the filename selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseAssets {
    /// Tag of the owning release
    pub tag: String,
    /// Selected assets in API order
    pub assets: Vec<Asset>,
}

/// Selected assets grouped by release, in release order
///
/// Iteration order is deterministic: releases in API order, assets in API
/// order within each release.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    groups: Vec<ReleaseAssets>,
}

impl Selection {
    /// Groups in release order
    pub fn groups(&self) -> &[ReleaseAssets] {
        &self.groups
    }

    /// Every `(tag, asset)` pair in processing order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Asset)> {
        self.groups
            .iter()
            .flat_map(|g| g.assets.iter().map(move |a| (g.tag.as_str(), a)))
    }

    /// Total number of selected assets
    pub fn asset_count(&self) -> usize {
        self.groups.iter().map(|g| g.assets.len()).sum()
    }

    /// Whether no asset was selected
    pub fn is_empty(&self) -> bool {
        self.asset_count() == 0
    }
}

/// Apply the release-level filters
///
/// 1. Drop prereleases unless `include_prerelease`.
/// 2. With `latest_only`, return the first survivor and stop (tag selector ignored).
/// 3. Otherwise keep releases whose tag satisfies `tag_pattern` (if set).
pub fn select_releases(releases: Vec<Release>, filter: &SelectionFilter) -> Result<Vec<Release>> {
    let mut selected = Vec::new();

    for release in releases {
        if release.prerelease && !filter.include_prerelease {
            debug!(tag = %release.tag, "skipping prerelease");
            continue;
        }

        if filter.latest_only {
            selected.push(release);
            return Ok(selected);
        }

        if !filter.tag_pattern.is_empty() && !pattern::matches(&release.tag, &filter.tag_pattern)? {
            debug!(tag = %release.tag, pattern = %filter.tag_pattern, "tag does not match");
            continue;
        }

        selected.push(release);
    }

    Ok(selected)
}

/// Apply the filename selector to every asset of every release
///
/// Releases left with no matching asset are dropped from the grouping.
pub fn select_assets(releases: Vec<Release>, filename_pattern: &str) -> Result<Selection> {
    let mut groups = Vec::with_capacity(releases.len());

    for release in releases {
        let mut assets = Vec::with_capacity(release.assets.len());
        for asset in release.assets {
            if filename_pattern.is_empty() || pattern::matches(&asset.name, filename_pattern)? {
                assets.push(asset);
            } else {
                debug!(asset = %asset.name, pattern = %filename_pattern, "asset does not match");
            }
        }
        if !assets.is_empty() {
            groups.push(ReleaseAssets {
                tag: release.tag,
                assets,
            });
        }
    }

    Ok(Selection { groups })
}

/// [`select_releases`] followed by [`select_assets`]
pub fn select(releases: Vec<Release>, filter: &SelectionFilter) -> Result<Selection> {
    let releases = select_releases(releases, filter)?;
    select_assets(releases, &filter.filename_pattern)
}
