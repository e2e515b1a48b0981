//! Token stream
//!
//! A doubly linked list of [`TokenNode`]s stored in an arena. Nodes are
//! addressed by [`NodeId`] and link to each other through `prev`/`next`
//! indices, so splicing next to a cursor is O(1) and no node owns another.
//!
//! Two sentinels bracket the list: `head` before the first value and `tail`
//! after the last. They are never removed and never hold a value.
//!
//! Unlinking a range detaches it from its neighbours but leaves the removed
//! nodes' own links and values in place. A cursor that was parked on a removed
//! node can still read it and step forward, which the tokenizer relies on
//! after a nested re-scan.

use crate::token::TokenNode;

/// Index of a node in a [`TokenStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    value: Option<TokenNode>,
    prev: usize,
    next: usize,
}

const HEAD: usize = 0;
const TAIL: usize = 1;

#[derive(Debug)]
pub struct TokenStream {
    nodes: Vec<Node>,
    len: usize,
}

impl TokenStream {
    pub fn new() -> Self {
        let nodes = vec![
            Node {
                value: None,
                prev: HEAD,
                next: TAIL,
            },
            Node {
                value: None,
                prev: HEAD,
                next: TAIL,
            },
        ];
        Self { nodes, len: 0 }
    }

    pub fn head(&self) -> NodeId {
        NodeId(HEAD)
    }

    pub fn tail(&self) -> NodeId {
        NodeId(TAIL)
    }

    /// Number of linked value nodes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&self, node: NodeId) -> NodeId {
        NodeId(self.nodes[node.0].next)
    }

    pub fn prev(&self, node: NodeId) -> NodeId {
        NodeId(self.nodes[node.0].prev)
    }

    /// Value of a node; `None` only for the sentinels.
    pub fn value(&self, node: NodeId) -> Option<&TokenNode> {
        self.nodes[node.0].value.as_ref()
    }

    /// Source length covered by a node; zero for the sentinels.
    pub fn node_len(&self, node: NodeId) -> usize {
        self.value(node).map_or(0, TokenNode::len)
    }

    /// Link `value` right after `node` and return its id.
    pub fn insert_after(&mut self, node: NodeId, value: TokenNode) -> NodeId {
        debug_assert!(node.0 != TAIL, "cannot insert after the tail sentinel");
        let next = self.nodes[node.0].next;
        let id = self.nodes.len();
        self.nodes.push(Node {
            value: Some(value),
            prev: node.0,
            next,
        });
        self.nodes[node.0].next = id;
        self.nodes[next].prev = id;
        self.len += 1;
        NodeId(id)
    }

    /// Unlink up to `count` nodes following `node`. Stops early at the tail.
    /// Returns the number of nodes actually removed.
    pub fn remove_range(&mut self, node: NodeId, count: usize) -> usize {
        let mut next = self.nodes[node.0].next;
        let mut removed = 0;
        while removed < count && next != TAIL {
            next = self.nodes[next].next;
            removed += 1;
        }
        self.nodes[node.0].next = next;
        self.nodes[next].prev = node.0;
        self.len -= removed;
        removed
    }

    /// Iterate over the linked values in order. Each call starts over.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stream: self,
            cursor: self.nodes[HEAD].next,
        }
    }

    /// Consume the stream into the values in order.
    pub fn into_vec(mut self) -> Vec<TokenNode> {
        let mut values = Vec::with_capacity(self.len);
        let mut cursor = self.nodes[HEAD].next;
        while cursor != TAIL {
            if let Some(value) = self.nodes[cursor].value.take() {
                values.push(value);
            }
            cursor = self.nodes[cursor].next;
        }
        values
    }
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a> {
    stream: &'a TokenStream,
    cursor: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TokenNode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let node = &self.stream.nodes[self.cursor];
        self.cursor = node.next;
        node.value.as_ref()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a TokenNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> TokenNode {
        TokenNode::Text(s.to_string())
    }

    fn texts(stream: &TokenStream) -> Vec<String> {
        stream
            .iter()
            .map(|node| node.as_text().unwrap_or("<token>").to_string())
            .collect()
    }

    #[test]
    fn test_new_stream_is_empty() {
        let stream = TokenStream::new();
        assert!(stream.is_empty());
        assert_eq!(stream.next(stream.head()), stream.tail());
        assert_eq!(stream.prev(stream.tail()), stream.head());
        assert!(stream.value(stream.head()).is_none());
        assert_eq!(stream.iter().count(), 0);
    }

    #[test]
    fn test_insert_after_links_in_order() {
        let mut stream = TokenStream::new();
        let a = stream.insert_after(stream.head(), text("a"));
        let c = stream.insert_after(a, text("c"));
        let b = stream.insert_after(a, text("b"));

        assert_eq!(stream.len(), 3);
        assert_eq!(texts(&stream), vec!["a", "b", "c"]);
        assert_eq!(stream.next(b), c);
        assert_eq!(stream.prev(c), b);
        assert_eq!(stream.next(c), stream.tail());
    }

    #[test]
    fn test_remove_range_unlinks_following_nodes() {
        let mut stream = TokenStream::new();
        let a = stream.insert_after(stream.head(), text("a"));
        let b = stream.insert_after(a, text("b"));
        let c = stream.insert_after(b, text("c"));
        stream.insert_after(c, text("d"));

        assert_eq!(stream.remove_range(a, 2), 2);
        assert_eq!(stream.len(), 2);
        assert_eq!(texts(&stream), vec!["a", "d"]);
    }

    #[test]
    fn test_remove_range_stops_at_tail() {
        let mut stream = TokenStream::new();
        let a = stream.insert_after(stream.head(), text("a"));
        stream.insert_after(a, text("b"));

        assert_eq!(stream.remove_range(stream.head(), 10), 2);
        assert!(stream.is_empty());
        assert_eq!(stream.next(stream.head()), stream.tail());
        assert_eq!(stream.prev(stream.tail()), stream.head());
    }

    #[test]
    fn test_removed_node_keeps_its_links() {
        let mut stream = TokenStream::new();
        let a = stream.insert_after(stream.head(), text("a"));
        let b = stream.insert_after(a, text("b"));
        let c = stream.insert_after(b, text("c"));

        stream.remove_range(a, 1);
        assert_eq!(stream.next(a), c);
        assert_eq!(stream.next(b), c);
        assert_eq!(stream.value(b), Some(&text("b")));
    }

    #[test]
    fn test_iter_is_restartable() {
        let mut stream = TokenStream::new();
        let a = stream.insert_after(stream.head(), text("x"));
        stream.insert_after(a, text("y"));
        assert_eq!(texts(&stream), texts(&stream));
        assert_eq!((&stream).into_iter().count(), 2);
    }

    #[test]
    fn test_into_vec() {
        let mut stream = TokenStream::new();
        let a = stream.insert_after(stream.head(), text("x"));
        stream.insert_after(a, text("y"));
        assert_eq!(stream.into_vec(), vec![text("x"), text("y")]);
    }

    #[test]
    fn test_node_len_of_sentinels_is_zero() {
        let stream = TokenStream::new();
        assert_eq!(stream.node_len(stream.head()), 0);
        assert_eq!(stream.node_len(stream.tail()), 0);
    }
}
