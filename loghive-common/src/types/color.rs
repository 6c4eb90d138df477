use serde::{Deserialize, Serialize};

/// A pair of display colors, each expected to be a `#RRGGBB` string.
/// Either component can be left out to fall back to the viewer's default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    #[serde(default)]
    pub fore: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
}

impl ColorPair {
    pub fn new(fore: Option<String>, back: Option<String>) -> Self {
        Self { fore, back }
    }

    /// Renders the CSS fragment decorating an entry, omitting absent
    /// components. Both absent renders an empty string.
    pub fn css(&self) -> String {
        let mut out = String::new();
        if let Some(fore) = &self.fore {
            out.push_str("color:");
            out.push_str(fore);
            out.push(';');
        }
        if let Some(back) = &self.back {
            out.push_str("background-color:");
            out.push_str(back);
            out.push(';');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_both_components() {
        let pair = ColorPair::new(Some("#000000".into()), Some("#00ee55".into()));
        assert_eq!(pair.css(), "color:#000000;background-color:#00ee55;");
    }

    #[test]
    fn test_css_back_only() {
        let pair = ColorPair::new(None, Some("#ff2211".into()));
        assert_eq!(pair.css(), "background-color:#ff2211;");
    }

    #[test]
    fn test_css_empty() {
        assert_eq!(ColorPair::default().css(), "");
    }
}
