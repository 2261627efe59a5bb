//! isobridge-emit - Source text emission for generated bridge classes
//!
//! [`SourceEmitter`] accumulates the text of one compilation unit. Declared
//! types are written through it so that every reference is either visible
//! unqualified (same package, `java.lang`, imported, or inherited as a member
//! type of an enclosing class) or written fully qualified. The emitter never
//! produces an ambiguous simple name.

mod emitter;
pub mod names;
mod parameter;

pub use emitter::SourceEmitter;
pub use parameter::Parameter;
