use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Vec wrapper indexed by a typed id instead of a bare `usize`.
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct IdVec<K, V> {
    vec: Vec<V>,
    _phantom: PhantomData<K>,
}

impl<K, V> Default for IdVec<K, V> {
    fn default() -> Self {
        Self::from_vec(Vec::new())
    }
}

impl<K, V> IdVec<K, V> {
    fn from_vec(vec: Vec<V>) -> Self {
        Self {
            vec,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
}

impl<K, V: Clone> IdVec<K, V> {
    /// Create a new `IdVec` holding `len` copies of `val`.
    pub fn fill(val: V, len: usize) -> Self {
        Self::from_vec(vec![val; len])
    }
}

impl<K: Into<usize>, V> IdVec<K, V> {
    #[inline]
    pub fn get(&self, k: K) -> &V {
        &self.vec[k.into()]
    }

    #[inline]
    pub fn get_mut(&mut self, k: K) -> &mut V {
        &mut self.vec[k.into()]
    }

    /// Like `get`, but returns `None` for an id this vec has never handed out.
    #[inline]
    pub fn try_get(&self, k: K) -> Option<&V> {
        self.vec.get(k.into())
    }
}

impl<K: From<usize>, V> IdVec<K, V> {
    /// Push `v` and return the id it can be retrieved with.
    #[inline]
    pub fn push(&mut self, v: V) -> K {
        let id = self.vec.len().into();
        self.vec.push(v);
        id
    }

    /// Iterate over `(id, value)` pairs in id order.
    pub fn enumerate(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.vec.iter().enumerate().map(|(i, v)| (K::from(i), v))
    }
}

impl<K: Into<usize>, V> Index<K> for IdVec<K, V> {
    type Output = V;
    fn index(&self, k: K) -> &V {
        self.get(k)
    }
}

impl<K: Into<usize>, V> IndexMut<K> for IdVec<K, V> {
    fn index_mut(&mut self, k: K) -> &mut V {
        self.get_mut(k)
    }
}
