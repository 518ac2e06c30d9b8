use std::collections::HashMap;

use crate::utils::pixel::Color;

/// Ordered list of palette entries.
///
/// Order matters while clustering: cluster `i` always belongs to entry `i`,
/// and ties go to the lower index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn contains(&self, color: &Color) -> bool {
        self.colors.contains(color)
    }
}

impl AsRef<[Color]> for Palette {
    fn as_ref(&self) -> &[Color] {
        &self.colors
    }
}

impl From<Vec<Color>> for Palette {
    fn from(colors: Vec<Color>) -> Self {
        Palette::new(colors)
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}

/// Maps every distinct source color to its palette entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorMap {
    map: HashMap<Color, Color>,
}

impl ColorMap {
    /// `None` for colors that were not part of the clustered image.
    #[inline]
    pub fn get(&self, color: &Color) -> Option<Color> {
        self.map.get(color).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// True when every mapped color is an entry of `palette`.
    pub fn image_within(&self, palette: &Palette) -> bool {
        self.map.values().all(|color| palette.contains(color))
    }

    /// True when every color maps onto itself.
    pub fn is_identity(&self) -> bool {
        self.map.iter().all(|(from, to)| from == to)
    }
}

impl FromIterator<(Color, Color)> for ColorMap {
    fn from_iter<I: IntoIterator<Item = (Color, Color)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
