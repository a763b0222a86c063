use std::collections::{BTreeMap, HashMap, HashSet};

/// Node or value position in a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// IRI, blank node label, or literal lexical form.
    #[must_use]
    pub fn lexical(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::BlankNode(id) => id,
            Self::Literal { value, .. } => value,
        }
    }

    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    #[must_use]
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

/// Deduplicated, insertion-ordered triple set with subject and predicate
/// indexes, plus the namespace prefixes declared by the source document.
#[derive(Debug, Clone, Default)]
pub struct TripleGraph {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    by_subject: HashMap<Term, Vec<usize>>,
    by_predicate: HashMap<String, Vec<usize>>,
    namespaces: BTreeMap<String, String>,
}

impl TripleGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }

        let index = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(index);
        self.by_predicate
            .entry(triple.predicate.clone())
            .or_default()
            .push(index);
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn add_namespace(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), iri.into());
    }

    #[must_use]
    pub fn with_triple(mut self, triple: Triple) -> Self {
        self.insert(triple);
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, prefix: &str, iri: &str) -> Self {
        self.add_namespace(prefix, iri);
        self
    }

    #[must_use]
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Every triple whose subject is `subject`.
    pub fn about<'a>(&'a self, subject: &Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(move |&i| &self.triples[i])
    }

    /// Every triple using `predicate`.
    pub fn with_predicate<'a>(&'a self, predicate: &str) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_predicate
            .get(predicate)
            .into_iter()
            .flatten()
            .map(move |&i| &self.triples[i])
    }

    /// Objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(
        &'a self,
        subject: &Term,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.about(subject)
            .filter(move |t| t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects of `(?, predicate, object)`.
    pub fn subjects<'a>(
        &'a self,
        predicate: &str,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.with_predicate(predicate)
            .filter(move |t| &t.object == object)
            .map(|t| &t.subject)
    }

    /// Subjects declared `rdf:type` of the given IRI, in document order.
    pub fn instances_of<'a>(&'a self, type_iri: &str) -> impl Iterator<Item = &'a Term> + 'a {
        let type_iri = type_iri.to_string();
        self.with_predicate(crate::vocab::RDF_TYPE)
            .filter(move |t| t.object.as_iri() == Some(type_iri.as_str()))
            .map(|t| &t.subject)
    }

    #[must_use]
    pub fn has_type(&self, subject: &Term, type_iri: &str) -> bool {
        self.objects(subject, crate::vocab::RDF_TYPE)
            .any(|o| o.as_iri() == Some(type_iri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{OWL_CLASS, RDFS_LABEL, RDF_TYPE};

    fn sample() -> TripleGraph {
        TripleGraph::new()
            .with_triple(Triple::new(Term::iri("ex:A"), RDF_TYPE, Term::iri(OWL_CLASS)))
            .with_triple(Triple::new(Term::iri("ex:A"), RDFS_LABEL, Term::literal("A")))
            .with_triple(Triple::new(Term::iri("ex:B"), RDF_TYPE, Term::iri(OWL_CLASS)))
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut graph = sample();
        let inserted = graph.insert(Triple::new(Term::iri("ex:A"), RDF_TYPE, Term::iri(OWL_CLASS)));

        assert!(!inserted);
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_instances_in_document_order() {
        let graph = sample();
        let classes: Vec<&str> = graph.instances_of(OWL_CLASS).map(Term::lexical).collect();

        assert_eq!(classes, vec!["ex:A", "ex:B"]);
    }

    #[test]
    fn test_objects_and_subjects() {
        let graph = sample();
        let a = Term::iri("ex:A");

        let labels: Vec<&str> = graph.objects(&a, RDFS_LABEL).map(Term::lexical).collect();
        assert_eq!(labels, vec!["A"]);

        let class = Term::iri(OWL_CLASS);
        assert_eq!(graph.subjects(RDF_TYPE, &class).count(), 2);
        assert!(graph.has_type(&a, OWL_CLASS));
        assert!(!graph.has_type(&Term::iri("ex:C"), OWL_CLASS));
    }
}
