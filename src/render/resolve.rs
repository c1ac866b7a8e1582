//! Province resolution strategies for overlay elements.

use super::centers::normalize_province;
use super::markup::{Markup, Overlay};

/// Default number of bytes searched backward for an identity marker.
pub const DEFAULT_MARKER_WINDOW: usize = 500;

/// Resolves the province a colored overlay element belongs to.
///
/// Returns a normalized 3-character code, or `None` if the element cannot be
/// tied to a province.
pub trait ProvinceResolver {
    fn resolve(&self, markup: &Markup<'_>, overlay: &Overlay<'_>) -> Option<String>;
}

/// Reads the province from the overlay element's own `id`/`data-province`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeLocal;

impl ProvinceResolver for AttributeLocal {
    fn resolve(&self, _markup: &Markup<'_>, overlay: &Overlay<'_>) -> Option<String> {
        overlay
            .attribute
            .map(normalize_province)
            .filter(|code| !code.is_empty())
    }
}

/// Takes the nearest identity marker preceding the overlay within `window` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestMarker {
    pub window: usize,
}

impl Default for NearestMarker {
    fn default() -> Self {
        NearestMarker {
            window: DEFAULT_MARKER_WINDOW,
        }
    }
}

impl ProvinceResolver for NearestMarker {
    fn resolve(&self, markup: &Markup<'_>, overlay: &Overlay<'_>) -> Option<String> {
        markup
            .nearest_marker(overlay, self.window)
            .map(|marker| normalize_province(marker.code))
            .filter(|code| !code.is_empty())
    }
}

/// Tries the first strategy, falling back to the second.
impl<A, B> ProvinceResolver for (A, B)
where
    A: ProvinceResolver,
    B: ProvinceResolver,
{
    fn resolve(&self, markup: &Markup<'_>, overlay: &Overlay<'_>) -> Option<String> {
        self.0
            .resolve(markup, overlay)
            .or_else(|| self.1.resolve(markup, overlay))
    }
}

impl<R: ProvinceResolver + ?Sized> ProvinceResolver for &R {
    fn resolve(&self, markup: &Markup<'_>, overlay: &Overlay<'_>) -> Option<String> {
        (**self).resolve(markup, overlay)
    }
}
