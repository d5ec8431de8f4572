//! BucketList: ordered singly-linked chain backing one hash slot.
//!
//! Nodes live in a `SlotMap` arena and point at their successor through
//! generational keys. The list knows nothing about hashing or key
//! comparison; it only orders and owns its items. Dropping the list drops
//! every item without recursing through the links.

use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
struct Node<T> {
    item: T,
    next: Option<DefaultKey>,
}

#[derive(Debug)]
pub struct BucketList<T> {
    nodes: SlotMap<DefaultKey, Node<T>>,
    head: Option<DefaultKey>,
}

impl<T> Default for BucketList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BucketList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Key of the node at `index`, walking from the head.
    fn key_at(&self, index: usize) -> Option<DefaultKey> {
        let mut cur = self.head;
        for _ in 0..index {
            cur = self.nodes[cur?].next;
        }
        cur
    }

    /// Inserts `item` so that it ends up at position `index`.
    ///
    /// An index past the end appends at the tail. Costs O(index).
    pub fn insert_at(&mut self, index: usize, item: T) {
        let index = index.min(self.len());
        let prev = match index {
            0 => None,
            i => self.key_at(i - 1),
        };
        let next = match prev {
            Some(p) => self.nodes[p].next,
            None => self.head,
        };
        let k = self.nodes.insert(Node { item, next });
        match prev {
            Some(p) => self.nodes[p].next = Some(k),
            None => self.head = Some(k),
        }
    }

    pub fn push_front(&mut self, item: T) {
        self.insert_at(0, item);
    }

    /// Unlinks and returns the item at `index`.
    ///
    /// An index past the end removes the last node; an empty list yields
    /// `None`. Costs O(index).
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        let index = index.min(last);
        let target = if index == 0 {
            let head = self.head?;
            self.head = self.nodes[head].next;
            head
        } else {
            let prev = self.key_at(index - 1)?;
            let target = self.nodes[prev].next?;
            self.nodes[prev].next = self.nodes[target].next;
            target
        };
        self.nodes.remove(target).map(|node| node.item)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.remove_at(0)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        let k = self.key_at(index)?;
        self.nodes.get(k).map(|node| &node.item)
    }

    /// Chain position of the first item matching `pred`.
    pub fn position<F>(&self, pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().position(pred)
    }

    pub fn find<F>(&self, mut pred: F) -> Option<&T>
    where
        F: FnMut(&T) -> bool,
    {
        self.iter().find(|&item| pred(item))
    }

    pub fn find_mut<F>(&mut self, mut pred: F) -> Option<&mut T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut cur = self.head;
        let found = loop {
            let k = cur?;
            let node = &self.nodes[k];
            if pred(&node.item) {
                break k;
            }
            cur = node.next;
        };
        self.nodes.get_mut(found).map(|node| &mut node.item)
    }

    /// Items in chain order, head first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: &self.nodes,
            cur: self.head,
            remaining: self.len(),
        }
    }

    /// Mutable access to every item, in arena order rather than chain order.
    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.nodes.values_mut().map(|node| &mut node.item)
    }

    /// Drops every item, leaving an empty list.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
    }
}

/// Iterator over a chain, head first.
pub struct Iter<'a, T> {
    nodes: &'a SlotMap<DefaultKey, Node<T>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cur?)?;
        self.cur = node.next;
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a BucketList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Draining iterator, head first.
pub struct IntoIter<T> {
    list: BucketList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for BucketList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}
