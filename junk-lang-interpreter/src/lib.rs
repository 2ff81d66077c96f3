//! Runtime half of the Junk language: the object model, environments, the
//! tree-walking evaluator and the macro expansion pass.

pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod macro_expansion;
pub mod object;
