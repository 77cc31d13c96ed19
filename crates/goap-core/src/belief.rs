use core::fmt;
use core::hash::{Hash, Hasher};
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Position;

/// Boxed world predicate. Evaluation is always a live read, never cached.
pub type Predicate<W> = Box<dyn Fn(&W) -> bool>;

type LocationFn<W> = Box<dyn Fn(&W) -> Position>;

/// Dense handle of a belief inside one [`GoapModel`](crate::GoapModel).
///
/// Names are unique per model, so id equality is name equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeliefId(pub u32);

impl BeliefId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BeliefKind {
    Predicate,
    Sensor,
    Location,
}

/// A named boolean predicate with an optional observed location.
pub struct Belief<W> {
    name: Cow<'static, str>,
    kind: BeliefKind,
    condition: Predicate<W>,
    location: Option<LocationFn<W>>,
}

impl<W> Belief<W> {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        condition: impl Fn(&W) -> bool + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind: BeliefKind::Predicate,
            condition: Box::new(condition),
            location: None,
        }
    }

    pub fn with_kind(mut self, kind: BeliefKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_location(mut self, location: impl Fn(&W) -> Position + 'static) -> Self {
        self.location = Some(Box::new(location));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BeliefKind {
        self.kind
    }

    pub fn evaluate(&self, world: &W) -> bool {
        (self.condition)(world)
    }

    pub fn location(&self, world: &W) -> Position {
        self.location
            .as_ref()
            .map(|location| location(world))
            .unwrap_or(Position::ZERO)
    }
}

impl<W> fmt::Debug for Belief<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Belief")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("has_location", &self.location.is_some())
            .finish()
    }
}

/// Set of beliefs, stored as a growable bitset over [`BeliefId`]s.
///
/// `clear` keeps the word buffer, so a pooled set is reused without reallocating. Equality and
/// hashing ignore trailing empty words: two sets are equal iff they have the same members.
#[derive(Clone, Default)]
pub struct BeliefSet {
    words: Vec<u64>,
}

impl BeliefSet {
    pub const fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// Pre-size the set for beliefs `0..beliefs`.
    pub fn with_capacity(beliefs: usize) -> Self {
        Self {
            words: Vec::with_capacity(beliefs.div_ceil(64)),
        }
    }

    pub fn insert(&mut self, id: BeliefId) -> bool {
        let (word, mask) = Self::slot(id);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let fresh = self.words[word] & mask == 0;
        self.words[word] |= mask;
        fresh
    }

    pub fn remove(&mut self, id: BeliefId) -> bool {
        let (word, mask) = Self::slot(id);
        match self.words.get_mut(word) {
            Some(bits) if *bits & mask != 0 => {
                *bits &= !mask;
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: BeliefId) -> bool {
        let (word, mask) = Self::slot(id);
        self.words.get(word).is_some_and(|bits| bits & mask != 0)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Replace the contents with `other`'s members, reusing this set's buffer.
    pub fn copy_from(&mut self, other: &BeliefSet) {
        self.words.clear();
        self.words.extend_from_slice(&other.words);
    }

    pub fn union_with(&mut self, other: &BeliefSet) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine |= *theirs;
        }
    }

    pub fn difference_with(&mut self, other: &BeliefSet) {
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            *mine &= !*theirs;
        }
    }

    pub fn intersects(&self, other: &BeliefSet) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(a, b)| a & b != 0)
    }

    pub fn is_subset(&self, other: &BeliefSet) -> bool {
        self.words.iter().enumerate().all(|(i, bits)| {
            let theirs = other.words.get(i).copied().unwrap_or(0);
            bits & !theirs == 0
        })
    }

    /// Keep only the members for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(BeliefId) -> bool) {
        for (index, word) in self.words.iter_mut().enumerate() {
            let mut bits = *word;
            while bits != 0 {
                let bit = bits.trailing_zeros();
                bits &= bits - 1;
                let id = BeliefId((index * 64 + bit as usize) as u32);
                if !keep(id) {
                    *word &= !(1u64 << bit);
                }
            }
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    fn slot(id: BeliefId) -> (usize, u64) {
        let index = id.index();
        (index / 64, 1u64 << (index % 64))
    }

    fn significant(&self) -> &[u64] {
        let len = self
            .words
            .iter()
            .rposition(|w| *w != 0)
            .map_or(0, |last| last + 1);
        &self.words[..len]
    }
}

impl PartialEq for BeliefSet {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for BeliefSet {}

impl Hash for BeliefSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl fmt::Debug for BeliefSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.0)).finish()
    }
}

impl FromIterator<BeliefId> for BeliefSet {
    fn from_iter<I: IntoIterator<Item = BeliefId>>(iter: I) -> Self {
        let mut set = BeliefSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<BeliefId> for BeliefSet {
    fn extend<I: IntoIterator<Item = BeliefId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a BeliefSet {
    type Item = BeliefId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the members of a [`BeliefSet`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    words: &'a [u64],
    index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = BeliefId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(BeliefId((self.index * 64 + bit) as u32));
            }
            self.index += 1;
            self.current = *self.words.get(self.index)?;
        }
    }
}
