#[cfg(test)]
#[path = "framework_test.rs"]
mod tests;

use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

/// Target simulation framework. PyGame produces 2D scripts, Ursina 3D.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Framework {
    PyGame,
    Ursina,
}

impl Framework {
    pub fn parse(text: &str) -> Option<Framework> {
        return Framework::iter().find(|e| return e.to_string() == text);
    }

    /// The Python library name as it appears in prompts and generated
    /// imports.
    pub fn library_name(&self) -> &'static str {
        match self {
            Framework::PyGame => return "PyGame",
            Framework::Ursina => return "Ursina",
        }
    }

    pub fn dimension(&self) -> &'static str {
        match self {
            Framework::PyGame => return "2D",
            Framework::Ursina => return "3D",
        }
    }
}
