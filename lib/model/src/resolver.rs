use crate::prefixes::PrefixTable;
use oxrdf::vocab::rdf;
use oxrdf::{BlankNode, Literal, NamedNode, Term};

/// The position a term occupies inside a triple.
///
/// The notation is position-sensitive: quoted literals are only recognized in
/// object position, and the `a` shorthand only in predicate position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermPosition {
    Subject,
    Predicate,
    Object,
}

/// Resolves a single term in the textual notation into a typed RDF term.
///
/// The rules, in priority order:
///
/// 1. In object position, text starting with `"` is parsed as a literal
///    (`"v"`, `"v"@lang`, `"v"^^datatype`); on failure the remaining rules
///    apply.
/// 2. `_:name` is a blank node.
/// 3. Text containing `://` is an absolute IRI, taken verbatim.
/// 4. `prefix:local` expands through the prefix table; an unknown prefix
///    expands against the default namespace instead of failing.
/// 5. In predicate position, the bare token `a` is `rdf:type`.
/// 6. Any other bare token is a plain string literal in subject and object
///    position, and a default-namespace IRI in predicate position.
///
/// This function is total: every input maps to some term, in the worst case a
/// plain literal. That also means a typo in a prefixed name silently becomes
/// a string literal or a default-namespace IRI rather than an error, so
/// callers that care about data quality should validate their input upstream.
pub fn resolve_term(text: &str, position: TermPosition, prefixes: &PrefixTable) -> Term {
    let text = text.trim();

    if position == TermPosition::Object && text.starts_with('"') {
        if let Some(literal) = parse_literal(text, prefixes) {
            return literal.into();
        }
    }

    if let Some(id) = text.strip_prefix("_:") {
        return BlankNode::new_unchecked(id).into();
    }

    if text.contains("://") {
        return NamedNode::new_unchecked(text).into();
    }

    if position == TermPosition::Predicate && text == "a" {
        return rdf::TYPE.into_owned().into();
    }

    if let Some((prefix, local)) = text.split_once(':') {
        return NamedNode::new_unchecked(prefixes.expand(prefix, local)).into();
    }

    match position {
        TermPosition::Predicate => {
            NamedNode::new_unchecked(format!("{}{}", prefixes.default_namespace(), text)).into()
        }
        TermPosition::Subject | TermPosition::Object => Literal::new_simple_literal(text).into(),
    }
}

/// Parses `"value"`, `"value"@lang` and `"value"^^datatype`.
///
/// Returns `None` when the text does not match any of these shapes, which
/// makes [resolve_term] fall through to the remaining rules.
fn parse_literal(text: &str, prefixes: &PrefixTable) -> Option<Literal> {
    let rest = text.strip_prefix('"')?;
    let (value, suffix) = rest.rsplit_once('"')?;

    if suffix.is_empty() {
        return Some(Literal::new_simple_literal(value));
    }
    if let Some(lang) = suffix.strip_prefix('@') {
        if lang.is_empty() {
            return None;
        }
        return Some(Literal::new_language_tagged_literal_unchecked(value, lang));
    }
    if let Some(datatype) = suffix.strip_prefix("^^") {
        if datatype.is_empty() {
            return None;
        }
        return Some(Literal::new_typed_literal(
            value,
            resolve_datatype(datatype, prefixes),
        ));
    }
    None
}

/// Datatypes follow the predicate rules: absolute IRIs verbatim, prefixed
/// names through the table, bare tokens against the default namespace.
fn resolve_datatype(text: &str, prefixes: &PrefixTable) -> NamedNode {
    if text.contains("://") {
        return NamedNode::new_unchecked(text);
    }
    match text.split_once(':') {
        Some((prefix, local)) => NamedNode::new_unchecked(prefixes.expand(prefix, local)),
        None => NamedNode::new_unchecked(format!("{}{}", prefixes.default_namespace(), text)),
    }
}
