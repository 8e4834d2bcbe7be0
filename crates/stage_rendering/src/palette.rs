//! Material palette.
//!
//! One default material plus six highlight states, ordered from "least
//! confident" to "most confident". Colors are linear RGBA.

/// Named visual state of a node's surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Material {
    /// Plain white, used until a node is highlighted.
    #[default]
    Default,
    /// Red
    Alert,
    /// Orange
    WarnHigh,
    /// Yellow
    WarnMid,
    /// Green
    OkHigh,
    /// Cyan
    OkVeryHigh,
    /// Blue
    Best,
}

impl Material {
    /// Highlight states in ascending confidence.
    pub const HIGHLIGHTS: [Self; 6] = [
        Self::Alert,
        Self::WarnHigh,
        Self::WarnMid,
        Self::OkHigh,
        Self::OkVeryHigh,
        Self::Best,
    ];

    /// Diffuse color as RGBA.
    #[must_use]
    pub const fn diffuse(self) -> [f32; 4] {
        match self {
            Self::Default => [1.0, 1.0, 1.0, 1.0],
            Self::Alert => [1.0, 0.0, 0.0, 1.0],
            Self::WarnHigh => [1.0, 0.65, 0.0, 1.0],
            Self::WarnMid => [1.0, 1.0, 0.0, 1.0],
            Self::OkHigh => [0.0, 0.5, 0.0, 1.0],
            Self::OkVeryHigh => [0.0, 1.0, 1.0, 1.0],
            Self::Best => [0.0, 0.0, 1.0, 1.0],
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Alert => "alert",
            Self::WarnHigh => "warn-high",
            Self::WarnMid => "warn-mid",
            Self::OkHigh => "ok-high",
            Self::OkVeryHigh => "ok-very-high",
            Self::Best => "best",
        }
    }

    /// True for every state except [`Material::Default`].
    #[must_use]
    pub const fn is_highlight(self) -> bool {
        !matches!(self, Self::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights_exclude_default() {
        assert!(Material::HIGHLIGHTS.iter().all(|m| m.is_highlight()));
        assert!(!Material::default().is_highlight());
    }

    #[test]
    fn test_colors_are_distinct() {
        let mut colors: Vec<[u32; 4]> = Material::HIGHLIGHTS
            .iter()
            .chain(std::iter::once(&Material::Default))
            .map(|m| m.diffuse().map(f32::to_bits))
            .collect();
        colors.sort_unstable();
        colors.dedup();
        assert_eq!(colors.len(), 7);
    }
}
