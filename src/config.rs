pub const DEFAULT_MODEL_NAME: &str = "CyberResidences";

/// How `class X < ...` headers list parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inheritance {
    #[default]
    AllParents,
    FirstParent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Name written in the `model` header.
    pub model_name: String,
    pub inheritance: Inheritance,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            inheritance: Inheritance::default(),
        }
    }
}
