//! Prefix tree over dotted component paths.
//!
//! A rule stored at `pkg.core` applies to `pkg.core` and every descendant
//! (`pkg.core.db`, `pkg.core.db.models`, ...) whether or not the descendant
//! has a node of its own.

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TrieNode<T> {
    path: String,
    rule: Option<T>,
    children: BTreeMap<String, TrieNode<T>>,
}

impl<T> TrieNode<T> {
    fn new(path: String) -> Self {
        Self {
            path,
            rule: None,
            children: BTreeMap::new(),
        }
    }

    /// Dotted path from the root to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn rule(&self) -> Option<&T> {
        self.rule.as_ref()
    }

    pub fn has_rule(&self) -> bool {
        self.rule.is_some()
    }

    fn count(&self) -> usize {
        self.children.values().map(|c| 1 + c.count()).sum()
    }

    fn collect_ruled<'a>(&'a self, out: &mut Vec<&'a TrieNode<T>>) {
        if self.has_rule() {
            out.push(self);
        }
        for child in self.children.values() {
            child.collect_ruled(out);
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleTrie<T> {
    root: TrieNode<T>,
}

impl<T> Default for RuleTrie<T> {
    fn default() -> Self {
        Self {
            root: TrieNode::new(String::new()),
        }
    }
}

impl<T> RuleTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule for `path`, creating intermediate nodes. Last write wins.
    pub fn insert(&mut self, path: &str, rule: T) {
        let mut current = &mut self.root;
        for component in path.split('.') {
            let child_path = if current.path.is_empty() {
                component.to_string()
            } else {
                format!("{}.{}", current.path, component)
            };
            current = current
                .children
                .entry(component.to_string())
                .or_insert_with(|| TrieNode::new(child_path));
        }
        current.rule = Some(rule);
    }

    /// Insert every entry in iteration order.
    pub fn update<I, K>(&mut self, rules: I)
    where
        I: IntoIterator<Item = (K, T)>,
        K: AsRef<str>,
    {
        for (path, rule) in rules {
            self.insert(path.as_ref(), rule);
        }
    }

    /// The node at exactly `path`, if it carries a rule.
    pub fn find(&self, path: &str) -> Option<&TrieNode<T>> {
        self.descend(path).filter(|node| node.has_rule())
    }

    /// Rule-bearing nodes from the root toward `prefix`, root first.
    ///
    /// The walk stops at the first component missing from the trie, so
    /// unregistered descendants still pick up their ancestors' rules.
    pub fn path(&self, prefix: &str) -> Vec<&TrieNode<T>> {
        let mut nodes = Vec::new();
        let mut current = &self.root;
        for component in prefix.split('.') {
            let Some(child) = current.children.get(component) else {
                break;
            };
            current = child;
            if current.has_rule() {
                nodes.push(current);
            }
        }
        nodes
    }

    /// Rule-bearing nodes at `prefix` or below it, in pre-order.
    pub fn starts_with(&self, prefix: &str) -> Vec<&TrieNode<T>> {
        let mut nodes = Vec::new();
        if let Some(node) = self.descend(prefix) {
            node.collect_ruled(&mut nodes);
        }
        nodes
    }

    /// Every rule-bearing node in pre-order.
    pub fn rules(&self) -> Vec<&TrieNode<T>> {
        let mut nodes = Vec::new();
        self.root.collect_ruled(&mut nodes);
        nodes
    }

    /// Total node count, not counting the root.
    pub fn size(&self) -> usize {
        self.root.count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    fn descend(&self, path: &str) -> Option<&TrieNode<T>> {
        path.split('.')
            .try_fold(&self.root, |node, component| node.children.get(component))
    }
}

impl<K: AsRef<str>, T> FromIterator<(K, T)> for RuleTrie<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.update(iter);
        trie
    }
}
