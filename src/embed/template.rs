//! Embedded text files with placeholders filled from a typed variable set.

use std::marker::PhantomData;

/// Fills the `__NAME__` placeholders of one kind of embedded file.
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// A compiled-in file that only renders with its own variable type, so the
/// preview page can't be filled with project variables by mistake.
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    source: &'static str,
    _vars: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(source: &'static str) -> Self {
        Self {
            source,
            _vars: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.source)
    }
}
