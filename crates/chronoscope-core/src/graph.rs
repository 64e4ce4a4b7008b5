//! Pattern queries over an `oxrdf::Graph`.
//!
//! A graph is built once per fetched resource, queried a handful of times by
//! the observation extractor, then dropped. Callers go through the
//! `TriplePattern` trait so they never depend on how triples are indexed.
//! oxrdf iterates in interning order, which differs between graphs, so the
//! multi-valued lookups here sort their results.

pub use oxrdf::{
    BlankNode, Graph, Literal, LiteralRef, NamedNode, NamedNodeRef, NamedOrBlankNode,
    NamedOrBlankNodeRef, Term, TermRef, Triple, TripleRef,
};

/// IRI, blank node label or literal lexical form. `None` for triple terms.
pub fn term_value(term: TermRef<'_>) -> Option<&str> {
    #[allow(unreachable_patterns)]
    match term {
        TermRef::NamedNode(n) => Some(n.as_str()),
        TermRef::BlankNode(b) => Some(b.as_str()),
        TermRef::Literal(l) => Some(l.value()),
        _ => None,
    }
}

/// A term usable in subject position.
pub fn as_subject(term: TermRef<'_>) -> Option<NamedOrBlankNodeRef<'_>> {
    match term {
        TermRef::NamedNode(n) => Some(n.into()),
        TermRef::BlankNode(b) => Some(b.into()),
        _ => None,
    }
}

fn sort_terms<T: std::fmt::Display>(mut terms: Vec<T>) -> Vec<T> {
    terms.sort_by_cached_key(|t| t.to_string());
    terms
}

/// Query-by-pattern over a triple collection. `None` is a wildcard.
pub trait TriplePattern {
    /// All triples matching the pattern.
    fn matching<'a>(
        &'a self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Vec<TripleRef<'a>>;

    fn has(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> bool {
        !self.matching(subject, Some(predicate), Some(object)).is_empty()
    }

    /// Distinct subjects of `?s predicate object`, in term order.
    fn subjects<'a>(
        &'a self,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> Vec<NamedOrBlankNodeRef<'a>> {
        let mut out: Vec<NamedOrBlankNodeRef<'a>> = Vec::new();
        for t in self.matching(None, Some(predicate), Some(object)) {
            if !out.contains(&t.subject) {
                out.push(t.subject);
            }
        }
        sort_terms(out)
    }

    /// Objects of `subject predicate ?o`, in term order.
    fn objects<'a>(
        &'a self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Vec<TermRef<'a>> {
        sort_terms(
            self.matching(Some(subject), Some(predicate), None)
                .into_iter()
                .map(|t| t.object)
                .collect(),
        )
    }
}

impl TriplePattern for Graph {
    fn matching<'a>(
        &'a self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: Option<NamedNodeRef<'_>>,
        object: Option<TermRef<'_>>,
    ) -> Vec<TripleRef<'a>> {
        let keep = |t: &TripleRef<'_>| {
            predicate.map_or(true, |p| t.predicate == p) && object.map_or(true, |o| t.object == o)
        };
        match (subject, predicate) {
            (Some(s), _) => self.triples_for_subject(s).filter(keep).collect(),
            (None, Some(p)) => self.triples_for_predicate(p).filter(keep).collect(),
            (None, None) => self.iter().filter(keep).collect(),
        }
    }

    fn has(
        &self,
        subject: Option<NamedOrBlankNodeRef<'_>>,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> bool {
        match subject {
            Some(s) => self.contains(TripleRef::new(s, predicate, object)),
            None => self
                .subjects_for_predicate_object(predicate, object)
                .next()
                .is_some(),
        }
    }

    fn subjects<'a>(
        &'a self,
        predicate: NamedNodeRef<'_>,
        object: TermRef<'_>,
    ) -> Vec<NamedOrBlankNodeRef<'a>> {
        sort_terms(self.subjects_for_predicate_object(predicate, object).collect())
    }

    fn objects<'a>(
        &'a self,
        subject: NamedOrBlankNodeRef<'_>,
        predicate: NamedNodeRef<'_>,
    ) -> Vec<TermRef<'a>> {
        sort_terms(self.objects_for_subject_predicate(subject, predicate).collect())
    }
}
