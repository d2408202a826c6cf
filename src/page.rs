//! In-memory page model: a node arena with an id index, class and inline
//! style helpers, form-control values with select/option synchronization,
//! and settable layout metrics so scroll logic is testable headlessly.
//!
//! The markup parser accepts the small HTML subset the clinic page uses:
//! nested elements with quoted attributes, void elements, comments, and
//! entity-escaped text.

use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: HashMap<String, String>,
    value: String,
    offset_top: i64,
    client_height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Id(String),
    Class(String),
    Tag(String),
}

/// Document state for one page. Layout is not computed; tests declare the
/// metrics they need through [`Page::set_metrics`].
#[derive(Debug, Clone)]
pub struct Page {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
    scroll_y: i64,
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Page {
    fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
            scroll_y: 0,
        }
    }

    pub fn from_markup(markup: &str) -> Result<Self> {
        let mut page = Self::new();
        let mut stack = vec![page.root];
        let mut rest = markup;

        loop {
            let Some(open) = rest.find('<') else {
                page.append_text_run(*stack.last().unwrap_or(&page.root), rest);
                break;
            };
            let parent = *stack.last().unwrap_or(&page.root);
            page.append_text_run(parent, &rest[..open]);
            rest = &rest[open..];

            if let Some(after) = rest.strip_prefix("<!--") {
                let end = after
                    .find("-->")
                    .ok_or_else(|| Error::MarkupParse("unterminated comment".into()))?;
                rest = &after[end + 3..];
            } else if rest.starts_with("<!") {
                let end = rest
                    .find('>')
                    .ok_or_else(|| Error::MarkupParse("unterminated declaration".into()))?;
                rest = &rest[end + 1..];
            } else if let Some(after) = rest.strip_prefix("</") {
                let end = after
                    .find('>')
                    .ok_or_else(|| Error::MarkupParse("unterminated closing tag".into()))?;
                let name = after[..end].trim();
                let popped = stack
                    .pop()
                    .filter(|node| *node != page.root)
                    .ok_or_else(|| {
                        Error::MarkupParse(format!("closing tag </{name}> without an open element"))
                    })?;
                let open_name = page.tag_name(popped).unwrap_or_default().to_string();
                if !open_name.eq_ignore_ascii_case(name) {
                    return Err(Error::MarkupParse(format!(
                        "closing tag </{name}> does not match open <{open_name}>"
                    )));
                }
                rest = &after[end + 1..];
            } else {
                let (tag_name, attrs, self_closing, remainder) = parse_open_tag(rest)?;
                let node = page.create_element(parent, tag_name.clone(), attrs);
                let void = VOID_TAGS
                    .iter()
                    .any(|tag| tag.eq_ignore_ascii_case(&tag_name));
                if !void && !self_closing {
                    stack.push(node);
                }
                rest = remainder;
            }
        }

        if stack.len() > 1 {
            let unclosed = page.tag_name(stack[stack.len() - 1]).unwrap_or_default();
            return Err(Error::MarkupParse(format!("unclosed element <{unclosed}>")));
        }

        page.sync_all_selects();
        Ok(page)
    }

    fn append_text_run(&mut self, parent: NodeId, raw: &str) {
        let text = unescape_text(raw);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.create_text(parent, trimmed.to_string());
        }
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    pub fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let element = Element {
            tag_name,
            attrs,
            value,
            offset_top: 0,
            client_height: 0,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.insert(id_attr, id);
        }
        id
    }

    pub fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text))
    }

    fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes[node_id.0].parent
    }

    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        &self.nodes[node_id.0].children
    }

    pub fn is_descendant_of(&self, node_id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent(node_id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::PageRuntime("attribute target is not an element".into()))?;
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.id_index.insert(value.to_string(), node_id);
        }
        Ok(())
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    /// Resolves a selector to the first matching element in document order.
    pub fn query(&self, selector: &str) -> Result<NodeId> {
        self.query_opt(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn query_opt(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let parsed = parse_selector(selector)?;
        if let Selector::Id(id) = &parsed {
            return Ok(self.by_id(id).into_iter().collect());
        }

        let mut matched = Vec::new();
        let mut pending = vec![self.root];
        while let Some(node_id) = pending.pop() {
            if let Some(element) = self.element(node_id) {
                let hit = match &parsed {
                    Selector::Id(_) => unreachable!("id selectors use the index"),
                    Selector::Class(class_name) => has_class(element, class_name),
                    Selector::Tag(tag) => element.tag_name.eq_ignore_ascii_case(tag),
                };
                if hit {
                    matched.push(node_id);
                }
            }
            for child in self.nodes[node_id.0].children.iter().rev() {
                pending.push(*child);
            }
        }
        Ok(matched)
    }

    pub fn descendants(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut collected = Vec::new();
        let mut pending: Vec<NodeId> = self.nodes[node_id.0].children.iter().rev().copied().collect();
        while let Some(current) = pending.pop() {
            collected.push(current);
            for child in self.nodes[current.0].children.iter().rev() {
                pending.push(*child);
            }
        }
        collected
    }

    /// Concatenated text of the node and its descendants, trimmed.
    pub fn text(&self, node_id: NodeId) -> String {
        let mut buffer = String::new();
        self.collect_text(node_id, &mut buffer);
        buffer.trim().to_string()
    }

    fn collect_text(&self, node_id: NodeId, buffer: &mut String) {
        match &self.nodes[node_id.0].node_type {
            NodeType::Text(text) => {
                if !buffer.is_empty() && !buffer.ends_with(' ') {
                    buffer.push(' ');
                }
                buffer.push_str(text);
            }
            NodeType::Document | NodeType::Element(_) => {
                for child in self.nodes[node_id.0].children.clone() {
                    self.collect_text(child, buffer);
                }
            }
        }
    }

    /// Replaces all children with a single text node (the `textContent`
    /// assignment the page logic relies on for error slots).
    pub fn set_text(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        if self.element(node_id).is_none() {
            return Err(Error::PageRuntime("text target is not an element".into()));
        }
        self.remove_children(node_id);
        if !text.is_empty() {
            self.create_text(node_id, text.to_string());
        }
        Ok(())
    }

    pub fn remove_children(&mut self, node_id: NodeId) {
        for removed in self.descendants(node_id) {
            if let Some(id_attr) = self.element(removed).and_then(|e| e.attrs.get("id")) {
                if self.id_index.get(id_attr) == Some(&removed) {
                    let key = id_attr.clone();
                    self.id_index.remove(&key);
                }
            }
        }
        self.nodes[node_id.0].children.clear();
    }

    pub fn value(&self, node_id: NodeId) -> Result<String> {
        self.element(node_id)
            .map(|element| element.value.clone())
            .ok_or_else(|| Error::PageRuntime("value target is not an element".into()))
    }

    /// Sets a form-control value. A select only accepts values carried by
    /// one of its options; anything else clears the selection, mirroring
    /// how a real select behaves.
    pub fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let tag = self
            .tag_name(node_id)
            .ok_or_else(|| Error::PageRuntime("value target is not an element".into()))?
            .to_ascii_lowercase();
        match tag.as_str() {
            "input" | "textarea" => {
                if let Some(element) = self.element_mut(node_id) {
                    element.value = value.to_string();
                }
                Ok(())
            }
            "select" => {
                let accepted = self
                    .option_values(node_id)
                    .into_iter()
                    .any(|candidate| candidate == value);
                let stored = if accepted { value } else { "" };
                if let Some(element) = self.element_mut(node_id) {
                    element.value = stored.to_string();
                }
                Ok(())
            }
            other => Err(Error::TypeMismatch {
                selector: self.dump(node_id),
                expected: "input, textarea or select".into(),
                actual: other.to_string(),
            }),
        }
    }

    fn option_values(&self, select: NodeId) -> Vec<String> {
        self.children(select)
            .to_vec()
            .into_iter()
            .filter(|child| {
                self.tag_name(*child)
                    .map(|t| t.eq_ignore_ascii_case("option"))
                    .unwrap_or(false)
            })
            .map(|option| self.option_value(option))
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        self.attr(option, "value")
            .unwrap_or_else(|| self.text(option))
    }

    /// Re-aligns a select's value with its current options: kept when still
    /// present, otherwise reset to the first option (empty when none).
    pub fn sync_select(&mut self, select: NodeId) {
        let values = self.option_values(select);
        let current = self
            .element(select)
            .map(|element| element.value.clone())
            .unwrap_or_default();
        let next = if values.iter().any(|candidate| *candidate == current) {
            current
        } else {
            values.first().cloned().unwrap_or_default()
        };
        if let Some(element) = self.element_mut(select) {
            element.value = next;
        }
    }

    fn sync_all_selects(&mut self) {
        let selects: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId)
            .filter(|node| {
                self.tag_name(*node)
                    .map(|t| t.eq_ignore_ascii_case("select"))
                    .unwrap_or(false)
            })
            .collect();
        for select in selects {
            // Parsed markup never carries a live value, so this lands on the
            // first option.
            if let Some(element) = self.element_mut(select) {
                element.value.clear();
            }
            let first = self.option_values(select).first().cloned();
            if let (Some(element), Some(value)) = (self.element_mut(select), first) {
                element.value = value;
            }
        }
    }

    /// Browser-style form reset: inputs and textareas return to their
    /// `value` attribute, selects to their first option.
    pub fn reset_form(&mut self, form: NodeId) {
        for node in self.descendants(form) {
            let Some(tag) = self.tag_name(node).map(str::to_ascii_lowercase) else {
                continue;
            };
            match tag.as_str() {
                "input" | "textarea" => {
                    let default = self.attr(node, "value").unwrap_or_default();
                    if let Some(element) = self.element_mut(node) {
                        element.value = default;
                    }
                }
                "select" => {
                    let first = self.option_values(node).first().cloned().unwrap_or_default();
                    if let Some(element) = self.element_mut(node) {
                        element.value = first;
                    }
                }
                _ => {}
            }
        }
    }

    pub fn has_class(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::PageRuntime("class target is not an element".into()))?;
        Ok(has_class(element, class_name))
    }

    pub fn add_class(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::PageRuntime("class target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    pub fn remove_class(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::PageRuntime("class target is not an element".into()))?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    pub fn toggle_class(&mut self, node_id: NodeId, class_name: &str) -> Result<bool> {
        if self.has_class(node_id, class_name)? {
            self.remove_class(node_id, class_name)?;
            Ok(false)
        } else {
            self.add_class(node_id, class_name)?;
            Ok(true)
        }
    }

    pub fn style(&self, node_id: NodeId, property: &str) -> Option<String> {
        let element = self.element(node_id)?;
        parse_style_declarations(element.attrs.get("style").map(String::as_str))
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    pub fn set_style(&mut self, node_id: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::PageRuntime("style target is not an element".into()))?;
        let mut decls = parse_style_declarations(element.attrs.get("style").map(String::as_str));
        if let Some(pos) = decls.iter().position(|(name, _)| name == property) {
            if value.is_empty() {
                decls.remove(pos);
            } else {
                decls[pos].1 = value.to_string();
            }
        } else if !value.is_empty() {
            decls.push((property.to_string(), value.to_string()));
        }

        if decls.is_empty() {
            element.attrs.remove("style");
        } else {
            element
                .attrs
                .insert("style".to_string(), serialize_style_declarations(&decls));
        }
        Ok(())
    }

    pub fn set_metrics(&mut self, node_id: NodeId, offset_top: i64, client_height: i64) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::PageRuntime("metrics target is not an element".into()))?;
        element.offset_top = offset_top;
        element.client_height = client_height;
        Ok(())
    }

    pub fn offset_top(&self, node_id: NodeId) -> i64 {
        self.element(node_id).map(|e| e.offset_top).unwrap_or(0)
    }

    pub fn client_height(&self, node_id: NodeId) -> i64 {
        self.element(node_id).map(|e| e.client_height).unwrap_or(0)
    }

    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    pub fn set_scroll_y(&mut self, offset: i64) {
        self.scroll_y = offset.max(0);
    }

    /// Shallow one-line rendering of an element, used in assertion messages.
    pub fn dump(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return "<non-element>".to_string();
        };
        let mut attrs: Vec<(&String, &String)> = element.attrs.iter().collect();
        attrs.sort();
        let mut out = format!("<{}", element.tag_name);
        for (name, value) in attrs {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        let text = self.text(node_id);
        if !text.is_empty() {
            out.push_str(&text);
        }
        out.push_str(&format!("</{}>", element.tag_name));
        out
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    let trimmed = selector.trim();
    if let Some(id) = trimmed.strip_prefix('#') {
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        return Ok(Selector::Id(id.to_string()));
    }
    if let Some(class_name) = trimmed.strip_prefix('.') {
        if class_name.is_empty() || class_name.contains(char::is_whitespace) {
            return Err(Error::UnsupportedSelector(selector.to_string()));
        }
        return Ok(Selector::Class(class_name.to_string()));
    }
    let tag_like = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');
    if tag_like {
        return Ok(Selector::Tag(trimmed.to_string()));
    }
    Err(Error::UnsupportedSelector(selector.to_string()))
}

fn parse_open_tag(src: &str) -> Result<(String, HashMap<String, String>, bool, &str)> {
    debug_assert!(src.starts_with('<'));
    let mut rest = &src[1..];
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return Err(Error::MarkupParse(format!(
            "expected tag name near: {}",
            snippet(src)
        )));
    }
    let tag_name = rest[..name_len].to_ascii_lowercase();
    rest = &rest[name_len..];

    let mut attrs = HashMap::new();
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("/>") {
            return Ok((tag_name, attrs, true, after));
        }
        if let Some(after) = rest.strip_prefix('>') {
            return Ok((tag_name, attrs, false, after));
        }
        if rest.is_empty() {
            return Err(Error::MarkupParse(format!("unterminated tag <{tag_name}>")));
        }

        let attr_len = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        if attr_len == 0 {
            return Err(Error::MarkupParse(format!(
                "malformed attribute in <{tag_name}> near: {}",
                snippet(rest)
            )));
        }
        let attr_name = rest[..attr_len].to_ascii_lowercase();
        rest = rest[attr_len..].trim_start();

        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (value, remainder) = parse_attr_value(after_eq, &tag_name)?;
            attrs.insert(attr_name, value);
            rest = remainder;
        } else {
            // Boolean attribute.
            attrs.insert(attr_name, String::new());
        }
    }
}

fn parse_attr_value<'a>(src: &'a str, tag_name: &str) -> Result<(String, &'a str)> {
    let mut chars = src.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &src[1..];
            let end = body.find(quote).ok_or_else(|| {
                Error::MarkupParse(format!("unterminated attribute value in <{tag_name}>"))
            })?;
            Ok((unescape_text(&body[..end]), &body[end + 1..]))
        }
        Some(_) => {
            let end = src
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(src.len());
            Ok((unescape_text(&src[..end]), &src[end..]))
        }
        None => Err(Error::MarkupParse(format!(
            "missing attribute value in <{tag_name}>"
        ))),
    }
}

fn snippet(src: &str) -> String {
    src.chars().take(32).collect()
}

fn unescape_text(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn class_tokens(attr: Option<&str>) -> Vec<String> {
    attr.unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn has_class(element: &Element, class_name: &str) -> bool {
    class_tokens(element.attrs.get("class").map(String::as_str))
        .iter()
        .any(|name| name == class_name)
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}

fn parse_style_declarations(attr: Option<&str>) -> Vec<(String, String)> {
    attr.unwrap_or_default()
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name.to_string(), value.to_string()))
            }
        })
        .collect()
}

fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
