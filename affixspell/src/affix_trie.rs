/// A byte trie over affix strings, used to find the affix rules whose
/// add-string sits on the edge of a word without scanning every rule.
///
/// Prefixes are indexed front to back and suffixes back to front, so a
/// single walk along the word visits exactly the rules that could apply,
/// shortest affix first.
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Front,
    Back,
}

#[derive(Clone, Debug)]
struct Node<T> {
    end_here: SmallVec<[T; 2]>,
    children: SmallVec<[(u8, u32); 4]>,
}

#[derive(Clone, Debug)]
pub struct AffixTrie<T> {
    edge: Edge,
    nodes: Vec<Node<T>>,
}

impl<T: Copy> AffixTrie<T> {
    pub fn new(edge: Edge) -> Self {
        AffixTrie {
            edge,
            nodes: vec![Node {
                end_here: SmallVec::new(),
                children: SmallVec::new(),
            }],
        }
    }

    fn child(&self, node: usize, b: u8) -> Option<usize> {
        self.nodes[node]
            .children
            .iter()
            .find(|(cb, _)| *cb == b)
            .map(|(_, idx)| *idx as usize)
    }

    /// The byte `depth` steps in from this trie's edge.
    fn byte_at(&self, bytes: &[u8], depth: usize) -> Option<u8> {
        if depth >= bytes.len() {
            return None;
        }
        match self.edge {
            Edge::Front => Some(bytes[depth]),
            Edge::Back => Some(bytes[bytes.len() - 1 - depth]),
        }
    }

    pub fn insert(&mut self, affix: &str, t: T) {
        let bytes = affix.as_bytes();
        let mut node = 0;
        let mut depth = 0;
        while let Some(b) = self.byte_at(bytes, depth) {
            depth += 1;
            node = match self.child(node, b) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node {
                        end_here: SmallVec::new(),
                        children: SmallVec::new(),
                    });
                    self.nodes[node].children.push((b, next as u32));
                    next
                }
            };
        }
        self.nodes[node].end_here.push(t);
    }

    /// Call `found` for every value whose affix is on the matching edge of
    /// `word`, shortest affix first. Stops and returns true as soon as
    /// `found` returns true.
    pub fn lookup(&self, word: &str, mut found: impl FnMut(T) -> bool) -> bool {
        let bytes = word.as_bytes();
        let mut node = 0;
        let mut depth = 0;
        loop {
            for t in self.nodes[node].end_here.iter() {
                if found(*t) {
                    return true;
                }
            }
            node = match self.byte_at(bytes, depth).and_then(|b| self.child(node, b)) {
                Some(next) => next,
                None => return false,
            };
            depth += 1;
        }
    }
}
