use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::error::{MergeError, Result};
use crate::github::{ContributionSource, FetchResult, fetch_multiple_users};
use crate::merger::merge_contributions;
use crate::request::{MergeRequest, ValidatedRequest};
use crate::svg::{render_error_svg, render_svg};
use crate::theme::{build_custom_theme, custom_palettes};
use crate::types::{MergeMode, RenderOptions};

pub const CONTENT_TYPE: &str = "image/svg+xml";
pub const CACHE_CONTROL_OK: &str = "public, max-age=300, s-maxage=300";
pub const CACHE_CONTROL_ERROR: &str = "no-cache";

/// A finished document plus the response metadata a transport would send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgResponse {
    pub status: u16,
    pub body: String,
    pub cache_control: &'static str,
}

impl SvgResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status: 200,
            body,
            cache_control: CACHE_CONTROL_OK,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: render_error_svg(message),
            cache_control: CACHE_CONTROL_ERROR,
        }
    }

    pub fn from_error(err: &MergeError) -> Self {
        Self::error(err.status(), &err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Runs validate → fetch → merge → render, caching finished documents.
pub struct MergeService<S> {
    source: S,
    svg_cache: TtlCache<String>,
}

impl<S: ContributionSource + Sync> MergeService<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            svg_cache: TtlCache::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Every failure path ends in an error graphic; this never panics or
    /// returns a bare error.
    pub fn handle(&self, request: &MergeRequest) -> SvgResponse {
        let validated = match request.validate() {
            Ok(validated) => validated,
            Err(err) => return SvgResponse::from_error(&err),
        };

        let key = validated.cache_key();
        if let Some(svg) = self.svg_cache.get(&key) {
            debug!(key = %key, "serving cached graphic");
            return SvgResponse::ok(svg);
        }

        let fetched = fetch_multiple_users(&self.source, &validated.usernames);
        if fetched.fulfilled.is_empty() {
            return SvgResponse::error(502, &all_failed_message(&fetched));
        }

        match render_fetched(&validated, &fetched) {
            Ok(svg) => {
                self.svg_cache.set(key, svg.clone());
                SvgResponse::ok(svg)
            }
            Err(err) => SvgResponse::from_error(&err),
        }
    }
}

fn all_failed_message(fetched: &FetchResult) -> String {
    let details: Vec<String> = fetched
        .errors
        .iter()
        .map(|e| format!("{}: {}", e.username, e.message))
        .collect();
    format!("Failed to fetch all users. {}", details.join("; "))
}

/// Merge and draw whatever subset of users was fetched successfully.
pub fn render_fetched(request: &ValidatedRequest, fetched: &FetchResult) -> Result<String> {
    let usernames: Vec<String> = fetched
        .fulfilled
        .iter()
        .map(|u| u.username.clone())
        .collect();

    let mut options = RenderOptions {
        mode: request.mode,
        theme: request.theme.clone(),
        usernames,
        custom_theme: request.theme_file.clone(),
        custom_palettes: None,
    };

    if let Some(first) = request.colors.first() {
        options.custom_theme = Some(build_custom_theme(first, request.dark)?);
        if request.mode == MergeMode::Overlay {
            // Colours belong to requested positions, so users that failed to
            // fetch must not shift everyone else's colour.
            let all = custom_palettes(&request.colors, request.usernames.len(), request.dark)?;
            let kept: Vec<_> = request
                .usernames
                .iter()
                .zip(all)
                .filter(|(name, _)| options.usernames.contains(name))
                .map(|(_, palette)| palette)
                .collect();
            options.custom_palettes = Some(kept);
        }
    }

    let merged = merge_contributions(&fetched.fulfilled);
    info!(
        users = options.usernames.len(),
        days = merged.len(),
        mode = %options.mode,
        theme = %options.theme,
        "rendering merged calendar"
    );
    Ok(render_svg(&merged, &options))
}
