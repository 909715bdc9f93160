use crate::parser::text::{decode_entities, normalize_text, tidy_punctuation};
use tl::{HTMLTag, NodeHandle, VDom};

const HIDDEN_CLASSES: [&str; 2] = ["wb-invisible", "mfp-hide"];

/// A parsed statute page with the parent/sibling links `tl` does not keep.
///
/// `tl` stores a flat node arena where every tag only knows its direct
/// children. One preorder pass over that arena records, for every element,
/// its parent, its element children and its position among its siblings, so
/// the extractors can walk siblings and ancestors in constant time.
pub struct StatuteDom<'a> {
    vdom: VDom<'a>,
    elements: Vec<NodeHandle>,
    roots: Vec<NodeHandle>,
    parents: Vec<Option<NodeHandle>>,
    children: Vec<Vec<NodeHandle>>,
    positions: Vec<usize>,
}

impl<'a> StatuteDom<'a> {
    pub fn parse(html: &'a str) -> Result<Self, String> {
        let vdom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|e| format!("Failed to parse HTML document: {e}"))?;

        let node_count = vdom.nodes().len();
        let mut parents = vec![None; node_count];
        let mut children = vec![Vec::new(); node_count];
        let mut positions = vec![0; node_count];
        let mut elements = Vec::new();
        let mut roots = Vec::new();

        {
            let parser = vdom.parser();
            for handle in vdom.children().iter().copied() {
                if handle.get(parser).and_then(|node| node.as_tag()).is_some() {
                    positions[handle.get_inner() as usize] = roots.len();
                    roots.push(handle);
                }
            }

            let mut stack: Vec<NodeHandle> = roots.iter().rev().copied().collect();
            while let Some(handle) = stack.pop() {
                let Some(tag) = handle.get(parser).and_then(|node| node.as_tag()) else {
                    continue;
                };
                elements.push(handle);

                let index = handle.get_inner() as usize;
                let mut element_children = Vec::new();
                for child in tag.children().top().iter().copied() {
                    let child_index = child.get_inner() as usize;
                    if child_index >= node_count {
                        continue;
                    }
                    parents[child_index] = Some(handle);
                    if child.get(parser).and_then(|node| node.as_tag()).is_some() {
                        positions[child_index] = element_children.len();
                        element_children.push(child);
                    }
                }
                stack.extend(element_children.iter().rev().copied());
                children[index] = element_children;
            }
        }

        Ok(Self {
            vdom,
            elements,
            roots,
            parents,
            children,
            positions,
        })
    }

    /// Every element in document order.
    pub fn elements(&self) -> &[NodeHandle] {
        &self.elements
    }

    pub fn tag(&self, handle: NodeHandle) -> Option<&HTMLTag<'a>> {
        handle.get(self.vdom.parser()).and_then(|node| node.as_tag())
    }

    pub fn tag_name(&self, handle: NodeHandle) -> String {
        self.tag(handle)
            .map(|tag| tag.name().as_utf8_str().to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn is_tag(&self, handle: NodeHandle, name: &str) -> bool {
        self.tag(handle)
            .is_some_and(|tag| tag.name().as_utf8_str().eq_ignore_ascii_case(name))
    }

    pub fn classes(&self, handle: NodeHandle) -> Vec<String> {
        self.tag(handle)
            .and_then(|tag| tag.attributes().class())
            .map(|class| {
                class
                    .as_utf8_str()
                    .split_whitespace()
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_class(&self, handle: NodeHandle, class: &str) -> bool {
        self.classes(handle).iter().any(|value| value == class)
    }

    pub fn has_class_prefix(&self, handle: NodeHandle, prefix: &str) -> bool {
        self.classes(handle)
            .iter()
            .any(|value| value.starts_with(prefix))
    }

    /// Tag name and class-list membership in one check, e.g. `p.Section`.
    pub fn matches(&self, handle: NodeHandle, name: &str, class: &str) -> bool {
        self.is_tag(handle, name) && self.has_class(handle, class)
    }

    pub fn attr(&self, handle: NodeHandle, key: &'static str) -> Option<String> {
        self.tag(handle)
            .and_then(|tag| tag.attributes().get(key).flatten())
            .map(|value| decode_entities(value.as_utf8_str().as_ref()))
    }

    pub fn has_attr(&self, handle: NodeHandle, key: &'static str) -> bool {
        self.tag(handle)
            .is_some_and(|tag| tag.attributes().get(key).is_some())
    }

    pub fn id(&self, handle: NodeHandle) -> Option<String> {
        self.attr(handle, "id")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.parents
            .get(handle.get_inner() as usize)
            .copied()
            .flatten()
    }

    pub fn ancestors(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(handle);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.parent(parent);
        }
        ancestors
    }

    pub fn element_children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.children
            .get(handle.get_inner() as usize)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn siblings(&self, handle: NodeHandle) -> &[NodeHandle] {
        match self.parent(handle) {
            Some(parent) => self.element_children(parent),
            None => &self.roots,
        }
    }

    fn position(&self, handle: NodeHandle) -> usize {
        self.positions
            .get(handle.get_inner() as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn next_element_sibling(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.siblings(handle).get(self.position(handle) + 1).copied()
    }

    pub fn prev_element_sibling(&self, handle: NodeHandle) -> Option<NodeHandle> {
        let position = self.position(handle);
        if position == 0 {
            return None;
        }
        self.siblings(handle).get(position - 1).copied()
    }

    /// Element siblings after `handle`, nearest first.
    pub fn following_siblings(&self, handle: NodeHandle) -> &[NodeHandle] {
        let siblings = self.siblings(handle);
        let start = (self.position(handle) + 1).min(siblings.len());
        &siblings[start..]
    }

    /// Element siblings before `handle`, nearest first.
    pub fn preceding_siblings(&self, handle: NodeHandle) -> impl Iterator<Item = NodeHandle> + '_ {
        let siblings = self.siblings(handle);
        let end = self.position(handle).min(siblings.len());
        siblings[..end].iter().rev().copied()
    }

    /// Descendant elements in document order, `handle` itself excluded.
    pub fn descendants(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeHandle> = self.element_children(handle).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            found.push(current);
            stack.extend(self.element_children(current).iter().rev().copied());
        }
        found
    }

    /// Top-most descendants matching `predicate`. Subtrees rooted at a match
    /// or at a node for which `prune` returns true are not searched further.
    pub fn find_all<P, Q>(&self, handle: NodeHandle, predicate: P, prune: Q) -> Vec<NodeHandle>
    where
        P: Fn(NodeHandle) -> bool,
        Q: Fn(NodeHandle) -> bool,
    {
        let mut found = Vec::new();
        let mut stack: Vec<NodeHandle> = self.element_children(handle).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if prune(current) {
                continue;
            }
            if predicate(current) {
                found.push(current);
                continue;
            }
            stack.extend(self.element_children(current).iter().rev().copied());
        }
        found
    }

    pub fn find_descendant<F>(&self, handle: NodeHandle, predicate: F) -> Option<NodeHandle>
    where
        F: Fn(NodeHandle) -> bool,
    {
        self.descendants(handle)
            .into_iter()
            .find(|candidate| predicate(*candidate))
    }

    pub fn find_child<F>(&self, handle: NodeHandle, predicate: F) -> Option<NodeHandle>
    where
        F: Fn(NodeHandle) -> bool,
    {
        self.element_children(handle)
            .iter()
            .copied()
            .find(|candidate| predicate(*candidate))
    }

    /// Helper text for screen readers and popup bodies never count as content.
    pub fn is_hidden(&self, handle: NodeHandle) -> bool {
        let classes = self.classes(handle);
        classes
            .iter()
            .any(|class| HIDDEN_CLASSES.contains(&class.as_str()))
            || self.has_attr(handle, "hidden")
    }

    pub fn text(&self, handle: NodeHandle) -> String {
        self.text_excluding(handle, |_| false)
    }

    /// Normalised text of `handle` with every subtree for which `exclude`
    /// returns true left out.
    pub fn text_excluding<F>(&self, handle: NodeHandle, exclude: F) -> String
    where
        F: Fn(NodeHandle) -> bool,
    {
        let mut raw = String::new();
        self.collect_text(handle, &exclude, &mut raw, true);
        tidy_punctuation(&normalize_text(&decode_entities(&raw)))
    }

    fn collect_text<F>(&self, handle: NodeHandle, exclude: &F, output: &mut String, is_root: bool)
    where
        F: Fn(NodeHandle) -> bool,
    {
        let Some(node) = handle.get(self.vdom.parser()) else {
            return;
        };

        if let Some(raw) = node.as_raw() {
            output.push_str(raw.as_utf8_str().as_ref());
            return;
        }

        let Some(tag) = node.as_tag() else {
            return;
        };
        if !is_root && (exclude(handle) || self.is_hidden(handle)) {
            return;
        }

        let name = tag.name().as_utf8_str().to_ascii_lowercase();
        match name.as_str() {
            "script" | "style" => return,
            "br" => {
                output.push(' ');
                return;
            }
            _ => {}
        }

        let block = is_block_tag(&name);
        if block {
            output.push(' ');
        }
        for child in tag.children().top().iter().copied() {
            self.collect_text(child, exclude, output, false);
        }
        if block {
            output.push(' ');
        }
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "ul" | "ol" | "li" | "dl" | "dt" | "dd" | "h1" | "h2" | "h3" | "h4" | "h5"
            | "h6" | "table" | "tr" | "td" | "th" | "section"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_siblings_and_parents() {
        let html = r#"<div id="root"><p id="a">A</p><ul id="b"><li>x</li></ul><p id="c">C</p></div>"#;
        let dom = StatuteDom::parse(html).unwrap();
        let find = |id: &str| {
            dom.elements()
                .iter()
                .copied()
                .find(|h| dom.id(*h).as_deref() == Some(id))
                .unwrap()
        };
        let id_of = |handle: Option<NodeHandle>| handle.and_then(|h| dom.id(h));

        assert_eq!(id_of(dom.next_element_sibling(find("a"))).as_deref(), Some("b"));
        assert_eq!(id_of(dom.next_element_sibling(find("b"))).as_deref(), Some("c"));
        assert_eq!(id_of(dom.prev_element_sibling(find("c"))).as_deref(), Some("b"));
        assert_eq!(dom.prev_element_sibling(find("a")).map(|h| h.get_inner()), None);
        assert_eq!(id_of(dom.parent(find("a"))).as_deref(), Some("root"));
        let following = dom
            .following_siblings(find("a"))
            .iter()
            .filter_map(|h| dom.id(*h))
            .collect::<Vec<_>>();
        assert_eq!(following, vec!["b", "c"]);
    }

    #[test]
    fn text_skips_screen_reader_helpers() {
        let html = r#"<p class="MarginalNote"><span class="wb-invisible">Marginal note:</span>Short&nbsp;title</p>"#;
        let dom = StatuteDom::parse(html).unwrap();
        let p = dom.elements()[0];
        assert_eq!(dom.text(p), "Short title");
    }
}
