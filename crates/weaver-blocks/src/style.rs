//! Style registry: format tags to concrete presentation properties.
//!
//! The registry is built once from the editor config and never mutated
//! afterwards. Resolution is a pure function of the tag set.

use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::config::EditorConfig;
use crate::types::{BlockKind, FormatSet, FormatTag};

/// A presentation property the registry can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    FontWeight,
    FontStyle,
    FontSize,
    FontFamily,
    TextDecoration,
    Color,
    BackgroundColor,
}

impl StyleProperty {
    /// CSS property name.
    pub fn css_name(self) -> &'static str {
        match self {
            StyleProperty::FontWeight => "font-weight",
            StyleProperty::FontStyle => "font-style",
            StyleProperty::FontSize => "font-size",
            StyleProperty::FontFamily => "font-family",
            StyleProperty::TextDecoration => "text-decoration",
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "background-color",
        }
    }
}

/// Presentation state of a fragment or container, ordered by property.
pub type Presentation = BTreeMap<StyleProperty, SmolStr>;

/// Render a presentation as an inline CSS declaration list.
pub fn to_css(presentation: &Presentation) -> String {
    presentation
        .iter()
        .map(|(prop, value)| format!("{}: {};", prop.css_name(), value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed tag → properties table.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    tags: [Vec<(StyleProperty, SmolStr)>; 7],
    headings: [SmolStr; 3],
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl StyleRegistry {
    pub fn new(config: &EditorConfig) -> Self {
        let tags = FormatTag::ALL.map(|tag| match tag {
            FormatTag::Strong => vec![(StyleProperty::FontWeight, SmolStr::new_static("bold"))],
            FormatTag::Italic => vec![(StyleProperty::FontStyle, SmolStr::new_static("italic"))],
            FormatTag::Through => vec![(
                StyleProperty::TextDecoration,
                SmolStr::new_static("line-through"),
            )],
            FormatTag::Color => vec![(StyleProperty::Color, SmolStr::new(&config.text_color))],
            FormatTag::Background => vec![(
                StyleProperty::BackgroundColor,
                SmolStr::new(&config.highlight_color),
            )],
            FormatTag::Code => vec![
                (
                    StyleProperty::FontFamily,
                    SmolStr::new(&config.code_font_family),
                ),
                (
                    StyleProperty::BackgroundColor,
                    SmolStr::new(&config.code_background),
                ),
            ],
            FormatTag::Underline => vec![(
                StyleProperty::TextDecoration,
                SmolStr::new_static("underline"),
            )],
        });
        let headings = config.heading_sizes.clone().map(SmolStr::from);
        Self { tags, headings }
    }

    /// Properties a single tag implies.
    pub fn properties(&self, tag: FormatTag) -> &[(StyleProperty, SmolStr)] {
        &self.tags[tag as usize]
    }

    /// Resolve a tag set to presentation.
    ///
    /// Tags are overlaid in canonical order; on conflicting properties the
    /// later tag wins.
    pub fn resolve(&self, tags: FormatSet) -> Presentation {
        let mut out = Presentation::new();
        for tag in tags.iter() {
            for (prop, value) in self.properties(tag) {
                out.insert(*prop, value.clone());
            }
        }
        out
    }

    /// Reset every property a tag can set, leaving anything else alone.
    pub fn clear(&self, presentation: &mut Presentation) {
        for props in &self.tags {
            for (prop, _) in props {
                presentation.remove(prop);
            }
        }
    }

    /// Clear, then reapply `resolve(tags)`.
    pub fn restyle(&self, presentation: &mut Presentation, tags: FormatSet) {
        self.clear(presentation);
        presentation.extend(self.resolve(tags));
    }

    /// Container presentation for a block kind.
    pub fn block_presentation(&self, kind: BlockKind) -> Presentation {
        let size = match kind {
            BlockKind::General => return Presentation::new(),
            BlockKind::Heading1 => &self.headings[0],
            BlockKind::Heading2 => &self.headings[1],
            BlockKind::Heading3 => &self.headings[2],
        };
        Presentation::from([
            (StyleProperty::FontSize, size.clone()),
            (StyleProperty::FontWeight, SmolStr::new_static("bold")),
        ])
    }
}
