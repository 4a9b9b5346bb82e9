mod prefixes;
mod resolver;

pub use prefixes::*;
pub use resolver::*;

// Re-export some oxrdf types.
pub use oxiri::Iri;
pub use oxrdf::{
    BlankNode, BlankNodeRef, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef,
    Subject, SubjectRef, Term, TermRef, Triple, TripleRef,
};
