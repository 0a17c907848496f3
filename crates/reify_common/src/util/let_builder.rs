use id_collections::{Count, Id};

/// A program that is a flat sequence of bindings, each assigned the next sequential local.
pub trait FromBindings: Sized {
    type LocalId: Id<Index = usize>;
    type Binding;

    fn from_bindings(bindings: Vec<Self::Binding>, ret: Self::LocalId) -> Self;
}

#[derive(Clone, Debug)]
pub struct LetManyBuilder<P: FromBindings> {
    num_locals: Count<P::LocalId>,
    bindings: Vec<P::Binding>,
}

impl<P: FromBindings> LetManyBuilder<P> {
    pub fn new() -> Self {
        LetManyBuilder {
            num_locals: Count::new(),
            bindings: Vec::new(),
        }
    }

    pub fn add_binding(&mut self, binding: P::Binding) -> P::LocalId {
        let id = self.num_locals.inc();
        self.bindings.push(binding);
        id
    }

    pub fn num_locals(&self) -> usize {
        self.num_locals.to_value()
    }

    pub fn to_program(self, ret: P::LocalId) -> P {
        debug_assert!(ret.to_index() < self.num_locals.to_value());
        P::from_bindings(self.bindings, ret)
    }
}

impl<P: FromBindings> Default for LetManyBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
