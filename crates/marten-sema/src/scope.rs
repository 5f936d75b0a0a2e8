// scope.rs

use marten_frontend::ast::Type;
use marten_identity::Symbol;
use rustc_hash::FxHashMap;

/// Lexical scope stack for procedure bodies. Each block pushes a frame;
/// lookups walk frames innermost-first.
#[derive(Debug, Default)]
pub struct BlockStack {
    frames: Vec<FxHashMap<Symbol, Type>>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.frames.push(FxHashMap::default());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn reset(&mut self) {
        self.frames.clear();
    }

    pub fn define(&mut self, name: Symbol, ty: Type) {
        self.frames
            .last_mut()
            .expect("a frame must be pushed before defining locals")
            .insert(name, ty);
    }

    /// Is the name bound in any live frame?
    pub fn contains(&self, name: Symbol) -> bool {
        self.frames.iter().any(|frame| frame.contains_key(&name))
    }

    pub fn get(&self, name: Symbol) -> Option<&Type> {
        self.frames.iter().rev().find_map(|frame| frame.get(&name))
    }
}

#[cfg(test)]
mod tests {
    use marten_frontend::ast::BasicType;

    use super::*;

    #[test]
    fn inner_frames_shadow_nothing_but_resolve_first() {
        let mut stack = BlockStack::new();
        let name = Symbol::new(0);
        stack.push();
        stack.define(name, Type::basic(BasicType::I32));
        stack.push();
        assert!(stack.contains(name));
        assert!(matches!(
            stack.get(name).unwrap().kind,
            marten_frontend::ast::TypeKind::Basic(BasicType::I32)
        ));
        stack.pop();
        stack.pop();
        assert!(!stack.contains(name));
    }
}
