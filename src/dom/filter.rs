//! Node predicates used to query a [`Document`](crate::dom::Document)
//!
//! A filter is anything that can answer "does this node match?". Plain closures
//! taking a [`NodeRef`] qualify, and the constructors below cover the common
//! cases. Filters compose by conjunction with [`Filter::and`]; there is no
//! disjunction, unions are built by running several queries.

use crate::dom::tree::NodeRef;

/// A predicate over a single node
pub trait Filter {
    /// Returns true if the node matches
    fn eval(&self, node: NodeRef<'_>) -> bool;

    /// Combines two filters; the result matches only when both do
    fn and<F: Filter>(self, other: F) -> And<Self, F>
    where
        Self: Sized,
    {
        And(self, other)
    }
}

impl<F> Filter for F
where
    F: Fn(NodeRef<'_>) -> bool,
{
    fn eval(&self, node: NodeRef<'_>) -> bool {
        self(node)
    }
}

/// Conjunction of two filters, see [`Filter::and`]
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(A, B);

impl<A: Filter, B: Filter> Filter for And<A, B> {
    fn eval(&self, node: NodeRef<'_>) -> bool {
        self.0.eval(node) && self.1.eval(node)
    }
}

/// Negation of a filter, see [`not`]
#[derive(Debug, Clone, Copy)]
pub struct Not<F>(F);

impl<F: Filter> Filter for Not<F> {
    fn eval(&self, node: NodeRef<'_>) -> bool {
        !self.0.eval(node)
    }
}

/// Matches elements with the given tag name
pub fn is_tag(tag: impl Into<String>) -> impl Filter {
    let tag = tag.into();
    move |node: NodeRef<'_>| node.tag() == tag.as_str()
}

/// Matches elements whose `id` attribute equals `id`
pub fn has_id(id: impl Into<String>) -> impl Filter {
    has_attr("id", id)
}

/// Matches elements listing `class` among their space-separated classes
pub fn has_class(class: impl Into<String>) -> impl Filter {
    let class = class.into();
    has_attr_matching("class", move |value: &str| {
        value.split_ascii_whitespace().any(|candidate| candidate == class)
    })
}

/// Matches elements carrying the attribute with exactly this value
pub fn has_attr(name: impl Into<String>, value: impl Into<String>) -> impl Filter {
    let value = value.into();
    has_attr_matching(name, move |candidate: &str| candidate == value)
}

/// Matches elements carrying the attribute with a value the predicate accepts
pub fn has_attr_matching<P>(name: impl Into<String>, predicate: P) -> impl Filter
where
    P: Fn(&str) -> bool,
{
    let name = name.into();
    move |node: NodeRef<'_>| node.attr(&name).is_some_and(|value| predicate(value))
}

/// Inverts a filter
pub fn not<F: Filter>(filter: F) -> Not<F> {
    Not(filter)
}
