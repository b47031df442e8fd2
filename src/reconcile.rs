//! Reconciler - classifies the differences between two collections
//!
//! Both collections are scanned in their remote order. Each entity on the left
//! is paired with the first unconsumed entity on the right that shares its
//! identity; paired entities that also compare equal are dropped, the rest are
//! reported. Right entities left over after the scan are extras.

/// One reported difference between the "from" (left) and "to" (right) sides
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffItem<E> {
    /// Same identity on both sides but the comparable fields differ
    Changed { left: E, right: E },
    /// Present in "from", absent in "to"
    MissingRight(E),
    /// Present in "to", absent in "from"
    MissingLeft(E),
}

/// Result of a reconciliation: the reported items plus how many pairs matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff<E> {
    pub items: Vec<DiffItem<E>>,
    pub matched: usize,
}

impl<E> Diff<E> {
    /// True when both sides were identical
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn changed(&self) -> usize {
        self.count(|item| matches!(item, DiffItem::Changed { .. }))
    }

    pub fn missing_right(&self) -> usize {
        self.count(|item| matches!(item, DiffItem::MissingRight(_)))
    }

    pub fn missing_left(&self) -> usize {
        self.count(|item| matches!(item, DiffItem::MissingLeft(_)))
    }

    fn count(&self, predicate: impl Fn(&DiffItem<E>) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(item)).count()
    }
}

impl<E> IntoIterator for Diff<E> {
    type Item = DiffItem<E>;
    type IntoIter = std::vec::IntoIter<DiffItem<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Compare `left` against `right`.
///
/// `identity_eq` decides whether two entities are the same logical item and
/// `value_eq` whether a same-identity pair needs no action. Changed and
/// MissingRight items follow the order of `left`; MissingLeft items follow
/// the order of `right` and come last. When `right` holds several entities of
/// the same identity only the first is paired, the others surface as
/// MissingLeft.
pub fn reconcile<E, I, V>(left: Vec<E>, right: Vec<E>, identity_eq: I, value_eq: V) -> Diff<E>
where
    I: Fn(&E, &E) -> bool,
    V: Fn(&E, &E) -> bool,
{
    let mut remaining: Vec<Option<E>> = right.into_iter().map(Some).collect();
    let mut items = Vec::new();
    let mut matched = 0;

    for entity in left {
        let position = remaining.iter().position(|slot| match slot {
            Some(candidate) => identity_eq(&entity, candidate),
            None => false,
        });

        match position.and_then(|index| remaining[index].take()) {
            Some(counterpart) if value_eq(&entity, &counterpart) => matched += 1,
            Some(counterpart) => items.push(DiffItem::Changed {
                left: entity,
                right: counterpart,
            }),
            None => items.push(DiffItem::MissingRight(entity)),
        }
    }

    items.extend(remaining.into_iter().flatten().map(DiffItem::MissingLeft));

    Diff { items, matched }
}
