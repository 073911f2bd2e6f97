//! Pluggable hash/equality strategies.
//!
//! A table fixes its strategy at construction. Every strategy must keep
//! `equals(a, b) => hash(a) == hash(b)`; a strategy that breaks this makes
//! keys unfindable and is not detected.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};
use core::marker::PhantomData;
use hashbrown::hash_map::DefaultHashBuilder;
use std::rc::Rc;

/// Hash and equality capability used by the probing engine.
///
/// The type parameter is the type being compared, which lets a strategy
/// serve borrowed lookups (`String` keys queried with `&str`) as long as it is
/// implemented for the borrowed form too.
pub trait HashingStrategy<T: ?Sized> {
    fn hash(&self, value: &T) -> u64;
    fn equals(&self, a: &T, b: &T) -> bool;
}

/// Natural equality (`Eq`) and hashing (`Hash`) through a `BuildHasher`.
#[derive(Clone, Debug, Default)]
pub struct Natural<S = DefaultHashBuilder> {
    build: S,
}

impl<S> Natural<S> {
    pub fn with_hasher(build: S) -> Self {
        Self { build }
    }

    pub fn hasher(&self) -> &S {
        &self.build
    }
}

impl<T, S> HashingStrategy<T> for Natural<S>
where
    T: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, value: &T) -> u64 {
        self.build.hash_one(value)
    }

    #[inline]
    fn equals(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Content equality for sequence-like keys (`Rc<[E]>`, `Box<[E]>`, `Vec<E>`,
/// arrays): two keys are equal when their element slices are equal, whatever
/// the identity or container type of the key.
pub struct SequenceStrategy<E, S = DefaultHashBuilder> {
    build: S,
    _elem: PhantomData<fn(&E)>,
}

impl<E, S: Default> Default for SequenceStrategy<E, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<E, S: Clone> Clone for SequenceStrategy<E, S> {
    fn clone(&self) -> Self {
        Self::with_hasher(self.build.clone())
    }
}

impl<E, S: fmt::Debug> fmt::Debug for SequenceStrategy<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceStrategy")
            .field("build", &self.build)
            .finish()
    }
}

impl<E> SequenceStrategy<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E, S> SequenceStrategy<E, S> {
    pub fn with_hasher(build: S) -> Self {
        Self {
            build,
            _elem: PhantomData,
        }
    }
}

impl<T, E, S> HashingStrategy<T> for SequenceStrategy<E, S>
where
    T: ?Sized + AsRef<[E]>,
    E: Hash + Eq,
    S: BuildHasher,
{
    fn hash(&self, value: &T) -> u64 {
        self.build.hash_one(value.as_ref())
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        a.as_ref() == b.as_ref()
    }
}

/// Reference identity for `Rc` keys: two keys are equal only when they point
/// at the same allocation.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityStrategy;

impl<T: ?Sized> HashingStrategy<Rc<T>> for IdentityStrategy {
    fn hash(&self, value: &Rc<T>) -> u64 {
        let addr = Rc::as_ptr(value) as *const () as usize as u64;
        // Allocations are aligned; spread the address so low bits vary.
        addr.wrapping_mul(0x9e37_79b9_7f4a_7c15).rotate_left(29)
    }

    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }
}

/// Content hash used by `hash_code` on containers and views. Fixed keys, so
/// equal contents hash the same across instances and runs.
pub(crate) fn stable_hash<T: ?Sized + Hash>(value: &T) -> u64 {
    let mut h = std::collections::hash_map::DefaultHasher::new();
    value.hash(&mut h);
    h.finish()
}

/// Strategy assembled from two closures.
#[derive(Clone)]
pub struct FnStrategy<F, G> {
    hash: F,
    eq: G,
}

impl<F, G> FnStrategy<F, G> {
    pub fn new<T: ?Sized>(hash: F, eq: G) -> Self
    where
        F: Fn(&T) -> u64,
        G: Fn(&T, &T) -> bool,
    {
        Self { hash, eq }
    }
}

impl<F, G> fmt::Debug for FnStrategy<F, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnStrategy")
    }
}

impl<T, F, G> HashingStrategy<T> for FnStrategy<F, G>
where
    T: ?Sized,
    F: Fn(&T) -> u64,
    G: Fn(&T, &T) -> bool,
{
    fn hash(&self, value: &T) -> u64 {
        (self.hash)(value)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (self.eq)(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: natural hashing agrees between owned and borrowed forms.
    #[test]
    fn natural_borrowed_agreement() {
        let s = Natural::<DefaultHashBuilder>::default();
        let owned = String::from("hello");
        assert_eq!(
            HashingStrategy::<String>::hash(&s, &owned),
            HashingStrategy::<str>::hash(&s, "hello")
        );
        assert!(HashingStrategy::<str>::equals(&s, "a", "a"));
        assert!(!HashingStrategy::<str>::equals(&s, "a", "b"));
    }

    /// Invariant: distinct allocations with equal content are equal under the
    /// sequence strategy and unequal under identity.
    #[test]
    fn sequence_versus_identity() {
        let foo: Rc<[char]> = Rc::from(vec!['a', 'b', 'c']);
        let bar: Rc<[char]> = Rc::from(vec!['a', 'b', 'c']);

        assert!(!IdentityStrategy.equals(&foo, &bar));
        assert!(IdentityStrategy.equals(&foo, &foo.clone()));

        let seq = SequenceStrategy::<char>::new();
        assert!(seq.equals(&foo, &bar));
        assert_eq!(seq.hash(&foo), seq.hash(&bar));
        // The key container type does not matter, only the elements.
        let v = vec!['a', 'b', 'c'];
        assert_eq!(seq.hash(&foo), HashingStrategy::<Vec<char>>::hash(&seq, &v));
    }

    #[test]
    fn closures() {
        let s = FnStrategy::new(|_: &i32| 4, |a: &i32, b: &i32| a == b);
        assert_eq!(s.hash(&10), 4);
        assert!(s.equals(&1, &1));
        assert!(!s.equals(&1, &2));
    }
}
