//! Structural roles and layout context for text units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural role of a text unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    /// Section heading
    Heading,
    /// Body paragraph
    #[default]
    Paragraph,
    /// Bulleted, numbered or lettered list entry
    ListItem,
    /// Table cell
    TableCell,
    /// Figure or table caption
    Caption,
    /// Quotation or block quote
    Quote,
    /// Source code
    Code,
    /// Acronyms, call shapes, values with units
    TechnicalTerm,
    /// Equations and formulas
    MathContent,
    /// Bibliography or citation entry
    Reference,
}

impl ElementRole {
    /// All roles, in declaration order.
    pub const ALL: [ElementRole; 10] = [
        ElementRole::Heading,
        ElementRole::Paragraph,
        ElementRole::ListItem,
        ElementRole::TableCell,
        ElementRole::Caption,
        ElementRole::Quote,
        ElementRole::Code,
        ElementRole::TechnicalTerm,
        ElementRole::MathContent,
        ElementRole::Reference,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementRole::Heading => "heading",
            ElementRole::Paragraph => "paragraph",
            ElementRole::ListItem => "list_item",
            ElementRole::TableCell => "table_cell",
            ElementRole::Caption => "caption",
            ElementRole::Quote => "quote",
            ElementRole::Code => "code",
            ElementRole::TechnicalTerm => "technical_term",
            ElementRole::MathContent => "math_content",
            ElementRole::Reference => "reference",
        }
    }

    /// Roles whose content is never emphasized.
    pub fn is_preserved(&self) -> bool {
        matches!(
            self,
            ElementRole::Code | ElementRole::TechnicalTerm | ElementRole::MathContent
        )
    }

    /// Roles whose original formatting must be kept intact.
    pub fn preserves_formatting(&self) -> bool {
        self.is_preserved() || *self == ElementRole::TableCell
    }

    /// Roles that carry document structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ElementRole::Heading | ElementRole::ListItem | ElementRole::TableCell
        )
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a unit within its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPosition {
    Beginning,
    Middle,
    End,
}

impl DocumentPosition {
    /// Position of unit `index` among `total` units.
    ///
    /// Returns `None` for single-unit documents.
    pub fn for_index(index: usize, total: usize) -> Option<Self> {
        if total < 2 {
            None
        } else if index == 0 {
            Some(DocumentPosition::Beginning)
        } else if index + 1 == total {
            Some(DocumentPosition::End)
        } else {
            Some(DocumentPosition::Middle)
        }
    }
}

/// Optional layout context attached to a text unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementContext {
    /// Font size in points
    pub font_size: Option<f32>,
    /// Whether the text is set in a bold face
    pub is_bold: Option<bool>,
    /// Position in the document
    pub position: Option<DocumentPosition>,
}

impl ElementContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Set boldness.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.is_bold = Some(bold);
        self
    }

    /// Set document position.
    pub fn with_position(mut self, position: DocumentPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self.font_size.is_none() && self.is_bold.is_none() && self.position.is_none()
    }
}
