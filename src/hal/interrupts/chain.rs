//! Circular doubly-linked list of handler records.
//!
//! `head` is the first-registered record; `head.prev` is the tail. A chain
//! with one member links the record to itself. Detached records have both
//! links set to `None`.

use core::ptr::NonNull;

use super::handler::{Handler, Links};

pub(super) struct Chain {
    head: Option<NonNull<Handler>>,
    len: usize,
}

// Safety: the chain only points at `&'static Handler`s, which are `Sync`.
unsafe impl Send for Chain {}

impl Chain {
    pub(super) const fn new() -> Self {
        Self { head: None, len: 0 }
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }

    /// Append `h` after the current tail.
    ///
    /// # Safety
    /// `h` is claimed for this chain and not linked anywhere.
    pub(super) unsafe fn push_back(&mut self, h: &'static Handler) {
        let node = NonNull::from(h);
        match self.head {
            None => {
                h.set_links(Links {
                    next: Some(node),
                    prev: Some(node),
                });
                self.head = Some(node);
            }
            Some(head) => {
                let head_ref = head.as_ref();
                let tail = head_ref.links().prev.unwrap_or(head);
                h.set_links(Links {
                    next: Some(head),
                    prev: Some(tail),
                });
                tail.as_ref().set_next(node);
                head_ref.set_prev(node);
            }
        }
        self.len += 1;
    }

    /// Remove `h`, using its own links to reach both neighbours.
    ///
    /// # Safety
    /// `h` is linked on this chain.
    pub(super) unsafe fn unlink(&mut self, h: &'static Handler) {
        let node = NonNull::from(h);
        let links = h.links();
        let (next, prev) = match (links.next, links.prev) {
            (Some(next), Some(prev)) => (next, prev),
            _ => return,
        };

        if next == node {
            self.head = None;
        } else {
            prev.as_ref().set_next(next);
            next.as_ref().set_prev(prev);
            if self.head == Some(node) {
                self.head = Some(next);
            }
        }
        h.set_links(Handler::unlinked());
        self.len -= 1;
    }

    /// Walk head to tail.
    pub(super) fn iter(&self) -> Iter<'_> {
        Iter {
            head: self.head,
            cursor: self.head,
            _chain: self,
        }
    }
}

pub(super) struct Iter<'a> {
    head: Option<NonNull<Handler>>,
    cursor: Option<NonNull<Handler>>,
    _chain: &'a Chain,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'static Handler;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor?;
        // Safety: every linked node is a `&'static Handler`, and the borrow of
        // the chain keeps the links stable for the iterator's lifetime
        let h: &'static Handler = unsafe { &*node.as_ptr() };
        let next = unsafe { h.links().next };
        self.cursor = if next == self.head { None } else { next };
        Some(h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::cpu::Context;
    use crate::hal::interrupts::{HandlerData, Status, Vector};

    fn nop(_v: Vector, _ctx: &mut Context, _data: HandlerData) -> Status {
        Status::NotMine
    }

    fn record() -> &'static Handler {
        Box::leak(Box::new(Handler::new(nop, None)))
    }

    fn members(chain: &Chain) -> Vec<*const Handler> {
        chain.iter().map(|h| h as *const Handler).collect()
    }

    fn ptrs(hs: &[&'static Handler]) -> Vec<*const Handler> {
        hs.iter().map(|&h| h as *const Handler).collect()
    }

    /// Every member's neighbours point back at it.
    fn assert_consistent(chain: &Chain) {
        for h in chain.iter() {
            let node = NonNull::from(h);
            unsafe {
                let links = h.links();
                assert_eq!(links.next.unwrap().as_ref().links().prev, Some(node));
                assert_eq!(links.prev.unwrap().as_ref().links().next, Some(node));
            }
        }
    }

    #[test]
    fn test_empty_chain() {
        let chain = Chain::new();
        assert_eq!(chain.len(), 0);
        assert_eq!(chain.iter().count(), 0);
    }

    #[test]
    fn test_single_member_links_to_itself() {
        let mut chain = Chain::new();
        let a = record();
        unsafe { chain.push_back(a) };

        let node = NonNull::from(a);
        let links = unsafe { a.links() };
        assert_eq!(links.next, Some(node));
        assert_eq!(links.prev, Some(node));
        assert_eq!(members(&chain), ptrs(&[a]));
    }

    #[test]
    fn test_push_back_keeps_registration_order() {
        let mut chain = Chain::new();
        let hs = [record(), record(), record(), record()];
        for h in hs {
            unsafe { chain.push_back(h) };
        }
        assert_eq!(chain.len(), 4);
        assert_eq!(members(&chain), ptrs(&hs));
        assert_consistent(&chain);
    }

    #[test]
    fn test_unlink_middle_head_and_tail() {
        let mut chain = Chain::new();
        let [a, b, c, d, e] = [record(), record(), record(), record(), record()];
        for h in [a, b, c, d, e] {
            unsafe { chain.push_back(h) };
        }

        unsafe { chain.unlink(c) };
        assert_eq!(members(&chain), ptrs(&[a, b, d, e]));
        assert_consistent(&chain);
        let links = unsafe { c.links() };
        assert!(links.next.is_none() && links.prev.is_none());

        unsafe { chain.unlink(a) };
        assert_eq!(members(&chain), ptrs(&[b, d, e]));

        unsafe { chain.unlink(e) };
        assert_eq!(members(&chain), ptrs(&[b, d]));
        assert_consistent(&chain);

        unsafe {
            chain.unlink(b);
            chain.unlink(d);
        }
        assert_eq!(chain.len(), 0);
        assert_eq!(chain.iter().count(), 0);
    }

    #[test]
    fn test_push_after_unlink_appends_at_tail() {
        let mut chain = Chain::new();
        let [a, b, c] = [record(), record(), record()];
        for h in [a, b, c] {
            unsafe { chain.push_back(h) };
        }
        unsafe {
            chain.unlink(a);
            chain.push_back(a);
        }
        assert_eq!(members(&chain), ptrs(&[b, c, a]));
        assert_consistent(&chain);
    }
}
