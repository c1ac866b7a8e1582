//! Render post-processing.
//!
//! The engine's renderer tints every province a power has ever held. The
//! [`PostProcessor`] rewrites that markup so only current supply centers keep
//! a power tint. Each colored overlay is tied to a province by a
//! [`ProvinceResolver`]; overlays on provinces outside the current
//! [`SupplyCenters`] are neutralized, everything else is copied verbatim.
//! Overlays that cannot be resolved are left alone.

pub mod centers;
pub mod markup;
pub mod resolve;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

pub use centers::{normalize_province, SupplyCenters};
pub use markup::{Markup, Overlay, NEUTRAL_CLASS};
pub use resolve::{AttributeLocal, NearestMarker, ProvinceResolver, DEFAULT_MARKER_WINDOW};

/// How an overlay on a non-center province is neutralized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Neutralization {
    /// Drop the overlay element, leading whitespace included.
    #[default]
    Remove,
    /// Rewrite the overlay's class to [`NEUTRAL_CLASS`].
    Recolor,
}

impl Neutralization {
    pub const fn as_str(self) -> &'static str {
        match self {
            Neutralization::Remove => "remove",
            Neutralization::Recolor => "recolor",
        }
    }
}

impl fmt::Display for Neutralization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown neutralization '{0}' (expected 'remove' or 'recolor')")]
pub struct ParseNeutralizationError(pub String);

impl FromStr for Neutralization {
    type Err = ParseNeutralizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove" => Ok(Neutralization::Remove),
            "recolor" | "recolour" => Ok(Neutralization::Recolor),
            _ => Err(ParseNeutralizationError(s.to_string())),
        }
    }
}

/// Attribute lookup first, then the nearest preceding marker.
pub type DefaultResolver = (AttributeLocal, NearestMarker);

/// Restricts power coloring to current supply centers.
#[derive(Debug, Clone)]
pub struct PostProcessor<R = DefaultResolver> {
    resolver: R,
    neutralization: Neutralization,
}

impl PostProcessor {
    /// Creates a post-processor with the default resolver chain.
    pub fn new(neutralization: Neutralization, marker_window: usize) -> Self {
        PostProcessor {
            resolver: (AttributeLocal, NearestMarker { window: marker_window }),
            neutralization,
        }
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        PostProcessor::new(Neutralization::default(), DEFAULT_MARKER_WINDOW)
    }
}

impl<R: ProvinceResolver> PostProcessor<R> {
    /// Creates a post-processor with a custom resolution strategy.
    pub fn with_resolver(resolver: R, neutralization: Neutralization) -> Self {
        PostProcessor {
            resolver,
            neutralization,
        }
    }

    pub fn neutralization(&self) -> Neutralization {
        self.neutralization
    }

    /// Rewrites `svg` so only overlays on provinces in `centers` keep a power tint.
    ///
    /// Running `apply` on its own output returns that output unchanged.
    pub fn apply(&self, svg: &str, centers: &SupplyCenters) -> String {
        let markup = Markup::scan(svg);
        let mut out = String::with_capacity(svg.len());
        let mut copied = 0;
        let mut tinted = 0usize;
        let mut neutralized = 0usize;
        let mut unresolved = 0usize;

        for overlay in markup.overlays() {
            if overlay.owner.is_none() {
                continue;
            }
            tinted += 1;
            let keep = match self.resolver.resolve(&markup, overlay) {
                Some(code) => centers.contains(&code),
                None => {
                    unresolved += 1;
                    true
                }
            };
            if keep {
                continue;
            }

            out.push_str(&svg[copied..overlay.span.start]);
            if self.neutralization == Neutralization::Recolor {
                out.push_str(&svg[overlay.span.start..overlay.class_span.start]);
                out.push_str(NEUTRAL_CLASS);
                out.push_str(&svg[overlay.class_span.end..overlay.span.end]);
            }
            copied = overlay.span.end;
            neutralized += 1;
        }
        out.push_str(&svg[copied..]);

        debug!(
            tinted,
            neutralized,
            unresolved,
            centers = centers.len(),
            mode = %self.neutralization,
            "post-processed map"
        );
        out
    }
}

/// Applies the default post-processor.
pub fn strip_non_center_coloring(svg: &str, centers: &SupplyCenters) -> String {
    PostProcessor::default().apply(svg, centers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centers(codes: &[&str]) -> SupplyCenters {
        SupplyCenters::from_lists([codes.iter().copied()])
    }

    const MAP: &str = concat!(
        "<svg>\n",
        "  <path id=\"_par\" d=\"M 0 0\"/>\n",
        "  <path class=\"france\" d=\"M 0 0\"/>\n",
        "  <path id=\"_bur\" d=\"M 1 1\"/>\n",
        "  <path class=\"france\" d=\"M 1 1\"/>\n",
        "</svg>\n",
    );

    #[test]
    fn parses_neutralization_names() {
        assert_eq!("remove".parse::<Neutralization>().unwrap(), Neutralization::Remove);
        assert_eq!(" Recolor ".parse::<Neutralization>().unwrap(), Neutralization::Recolor);
        let err = "hide".parse::<Neutralization>().unwrap_err();
        assert_eq!(err, ParseNeutralizationError("hide".to_string()));
        assert_eq!(Neutralization::Recolor.to_string(), "recolor");
    }

    #[test]
    fn removes_overlay_on_non_center() {
        let out = strip_non_center_coloring(MAP, &centers(&["PAR"]));
        let expected = concat!(
            "<svg>\n",
            "  <path id=\"_par\" d=\"M 0 0\"/>\n",
            "  <path class=\"france\" d=\"M 0 0\"/>\n",
            "  <path id=\"_bur\" d=\"M 1 1\"/>\n",
            "</svg>\n",
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn recolors_overlay_on_non_center() {
        let processor = PostProcessor::new(Neutralization::Recolor, DEFAULT_MARKER_WINDOW);
        let out = processor.apply(MAP, &centers(&["PAR"]));
        assert_eq!(out, MAP.replacen("class=\"france\" d=\"M 1 1\"", "class=\"nopower\" d=\"M 1 1\"", 1));
    }

    #[test]
    fn keeps_everything_when_all_are_centers() {
        let out = strip_non_center_coloring(MAP, &centers(&["PAR", "BUR"]));
        assert_eq!(out, MAP);
    }

    #[test]
    fn unresolved_overlays_are_kept() {
        let svg = "<svg><path class=\"england\" d=\"M 0 0\"/></svg>";
        assert_eq!(strip_non_center_coloring(svg, &centers(&[])), svg);
    }

    #[test]
    fn custom_resolver_is_used() {
        struct Everywhere;
        impl ProvinceResolver for Everywhere {
            fn resolve(&self, _: &Markup<'_>, _: &Overlay<'_>) -> Option<String> {
                Some("XXX".to_string())
            }
        }
        let processor = PostProcessor::with_resolver(Everywhere, Neutralization::Remove);
        let out = processor.apply(MAP, &centers(&["PAR", "BUR"]));
        assert!(!out.contains("class=\"france\""));
    }

    #[test]
    fn output_is_stable_under_reapplication() {
        for mode in [Neutralization::Remove, Neutralization::Recolor] {
            let processor = PostProcessor::new(mode, DEFAULT_MARKER_WINDOW);
            let set = centers(&["BUR"]);
            let once = processor.apply(MAP, &set);
            assert_eq!(processor.apply(&once, &set), once, "{}", mode);
        }
    }
}
