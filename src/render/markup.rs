//! Scanning rendered markup for colored overlays and province markers.
//!
//! The renderer draws each province as a marker element carrying the province
//! id, followed by zero or more overlay elements tinted with a power class:
//!
//! ```text
//! <path id="_par" d="..."/>
//!         <path class="france" d="..."/>
//! ```
//!
//! Distances between a marker and an overlay are measured with all overlay
//! text collapsed out, and markers inside overlays are ignored. Removing or
//! recoloring overlays therefore never changes how another overlay resolves.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::power::{Power, ALL_POWERS};

/// Class written onto neutralized overlays.
pub const NEUTRAL_CLASS: &str = "nopower";

/// Self-closing `<path>` whose class is a power or the neutral class.
static OVERLAY_RE: Lazy<Regex> = Lazy::new(|| {
    let classes: Vec<&str> = ALL_POWERS
        .iter()
        .map(|p| p.class_name())
        .chain([NEUTRAL_CLASS])
        .collect();
    let pattern = format!(r#"\s*<path\s+class="(?i:({}))"[^/]*/>"#, classes.join("|"));
    Regex::new(&pattern).expect("overlay pattern compiles")
});

/// `id="_par"` or `data-province="par"`.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\sid="_|\sdata-province=")([A-Za-z][A-Za-z_]*)""#)
        .expect("marker pattern compiles")
});

/// A colored overlay element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay<'a> {
    /// Byte range of the element, including leading whitespace.
    pub span: Range<usize>,
    /// Byte range of the class attribute value.
    pub class_span: Range<usize>,
    /// Power the element is tinted for; `None` once neutralized.
    pub owner: Option<Power>,
    /// Province code carried on the element itself, if any.
    pub attribute: Option<&'a str>,
    pub element: &'a str,
}

/// A province identity marker outside any overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    pub start: usize,
    pub code: &'a str,
}

/// A scanned markup document.
#[derive(Debug)]
pub struct Markup<'a> {
    overlays: Vec<Overlay<'a>>,
    markers: Vec<Marker<'a>>,
    /// `covered[i]` is the total overlay length before `overlays[i]`.
    covered: Vec<usize>,
}

impl<'a> Markup<'a> {
    /// Scans `text` for overlays and markers.
    pub fn scan(text: &'a str) -> Self {
        let overlays: Vec<Overlay<'a>> = OVERLAY_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let class = caps.get(1)?;
                Some(Overlay {
                    span: whole.range(),
                    class_span: class.range(),
                    owner: Power::from_name(class.as_str()),
                    attribute: MARKER_RE
                        .captures(whole.as_str())
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str()),
                    element: whole.as_str(),
                })
            })
            .collect();

        let mut covered = Vec::with_capacity(overlays.len() + 1);
        let mut total = 0;
        covered.push(total);
        for overlay in &overlays {
            total += overlay.span.len();
            covered.push(total);
        }

        let markers = MARKER_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let code = caps.get(1)?;
                let next = overlays.partition_point(|o| o.span.end <= whole.start());
                let inside = overlays
                    .get(next)
                    .is_some_and(|o| o.span.start < whole.end());
                (!inside).then_some(Marker {
                    start: whole.start(),
                    code: code.as_str(),
                })
            })
            .collect();

        Markup {
            overlays,
            markers,
            covered,
        }
    }

    /// All overlays in document order, tinted or neutral.
    pub fn overlays(&self) -> &[Overlay<'a>] {
        &self.overlays
    }

    /// Markers outside overlays, in document order.
    pub fn markers(&self) -> &[Marker<'a>] {
        &self.markers
    }

    /// Maps an offset outside every overlay to its position with overlay text removed.
    fn collapsed(&self, offset: usize) -> usize {
        let before = self.overlays.partition_point(|o| o.span.start < offset);
        offset - self.covered[before]
    }

    /// Returns the marker nearest before `overlay`, if it starts no more than
    /// `window` collapsed bytes before the overlay.
    pub fn nearest_marker(&self, overlay: &Overlay<'_>, window: usize) -> Option<&Marker<'a>> {
        let preceding = self.markers.partition_point(|m| m.start < overlay.span.start);
        let marker = self.markers[..preceding].last()?;
        let distance = self.collapsed(overlay.span.start) - self.collapsed(marker.start);
        (distance <= window).then_some(marker)
    }
}
