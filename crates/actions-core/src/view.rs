//! Pure rendering of presenter and draft state into presentation nodes.
//!
//! Nothing here knows how nodes become pixels. The HTTP surface serializes a
//! [`View`] as JSON; the CLI prints [`Node::to_text`].

use crate::action::{Action, Icon, MAX_EMOJI_CHARS};
use crate::draft::{DraftController, DraftState};
use crate::presenter::{Notice, PresenterState};
use serde::Serialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Element {
        tag: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
}

const BLOCK_TAGS: &[&str] = &["div", "h2", "li", "p", "ul"];

impl Node {
    pub fn element(tag: &str) -> Self {
        Node::Element {
            tag: tag.to_string(),
            key: None,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn key(mut self, value: impl Into<String>) -> Self {
        if let Node::Element { key, .. } = &mut self {
            *key = Some(value.into());
        }
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { tag, .. } => Some(tag),
            Node::Text { .. } => None,
        }
    }

    pub fn node_key(&self) -> Option<&str> {
        match self {
            Node::Element { key, .. } => key.as_deref(),
            Node::Text { .. } => None,
        }
    }

    pub fn child_nodes(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    /// Depth-first search for the first element with `tag`.
    pub fn find(&self, tag: &str) -> Option<&Node> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.child_nodes().iter().find_map(|c| c.find(tag))
    }

    /// Plain-text outline. Forms are interactive only and are skipped.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        let mut text = out.trim_end().to_string();
        text.push('\n');
        text
    }

    fn write_text(&self, out: &mut String) {
        match self {
            Node::Text { text } => {
                if !out.is_empty() && !out.ends_with(['\n', ' ']) {
                    out.push(' ');
                }
                out.push_str(text);
            }
            Node::Element {
                tag,
                attrs,
                children,
                ..
            } => {
                if tag == "form" {
                    return;
                }
                let block = BLOCK_TAGS.contains(&tag.as_str());
                if block && !out.is_empty() && !out.ends_with('\n') && !out.ends_with("- ") {
                    out.push('\n');
                }
                if tag == "li" {
                    out.push_str("- ");
                }
                if tag == "img" {
                    if let Some(src) = attrs.get("src") {
                        Node::text(format!("[{src}]")).write_text(out);
                    }
                }
                for child in children {
                    child.write_text(out);
                }
                if block && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// Callbacks a rendered tree exposes to whatever materializes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IntentName {
    OnAddIntent,
    OnSaveIntent,
    OnDeleteIntent,
    Update,
    Commit,
    Discard,
}

impl IntentName {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentName::OnAddIntent => "onAddIntent",
            IntentName::OnSaveIntent => "onSaveIntent",
            IntentName::OnDeleteIntent => "onDeleteIntent",
            IntentName::Update => "update",
            IntentName::Commit => "commit",
            IntentName::Discard => "discard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub root: Node,
    pub intents: Vec<IntentName>,
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// One action as it appears in the launcher: icon, title, description, keys.
pub fn render_item(action: &Action) -> Node {
    let icon = match action.icon() {
        Some(Icon::Emoji(c)) => Node::element("span").attr("class", "icon").child(Node::text(c)),
        Some(Icon::Favicon(src)) => Node::element("img").attr("class", "icon").attr("src", src),
        None => Node::element("span").attr("class", "icon"),
    };
    let mut item = Node::element("div")
        .attr("class", "flash-item")
        .child(icon)
        .child(
            Node::element("span")
                .attr("class", "title")
                .child(Node::text(&action.title)),
        );
    if action.desc != action.title {
        item = item.child(
            Node::element("span")
                .attr("class", "desc")
                .child(Node::text(&action.desc)),
        );
    }
    if let Some(keys) = action.keys.as_ref().filter(|_| action.keycheck) {
        item = item.child(
            Node::element("span")
                .attr("class", "keys")
                .child(Node::text(keys.join(" "))),
        );
    }
    item
}

fn input(name: &str, value: &str) -> Node {
    let mut node = Node::element("input")
        .attr("name", name)
        .attr("type", "text")
        .attr("value", value);
    if name == "emoji" {
        node = node
            .attr("minlength", "0")
            .attr("maxlength", MAX_EMOJI_CHARS.to_string());
    }
    node
}

fn add_form() -> Node {
    let field = |label: &str, name: &str| {
        Node::element("div")
            .child(Node::text(format!("{label}:")))
            .child(input(name, ""))
    };
    Node::element("form")
        .attr("intent", IntentName::OnAddIntent.as_str())
        .child(field("Name", "name"))
        .child(field("Emoji icon", "emoji"))
        .child(field("Fav icon URL", "favIconUrl"))
        .child(field("URL", "url"))
        .child(
            Node::element("input")
                .attr("type", "submit")
                .attr("value", "Add"),
        )
}

/// The committed collection in presentation order, keyed by `url`.
pub fn render_list(state: &PresenterState, heading: &str) -> View {
    let mut root = Node::element("div")
        .attr("class", "custom-actions")
        .child(Node::element("h2").child(Node::text(heading)));

    if let Some(notice) = &state.notice {
        root = root.child(
            Node::element("p")
                .attr("class", "notice")
                .child(Node::text(notice.to_string())),
        );
    }

    let items = state.actions.iter().map(|a| {
        Node::element("li")
            .key(a.url.as_str())
            .attr("intents", "onSaveIntent onDeleteIntent")
            .child(render_item(a))
    });
    root = root
        .child(Node::element("ul").children(items))
        .child(add_form());

    View {
        root,
        intents: vec![
            IntentName::OnAddIntent,
            IntentName::OnSaveIntent,
            IntentName::OnDeleteIntent,
        ],
    }
}

/// Edit form for the committed value next to a live preview of the draft.
pub fn render_editor(draft: &DraftController) -> View {
    let committed = draft.baseline();
    let current = draft.draft();

    let form = Node::element("form")
        .attr("intent", IntentName::Update.as_str())
        .child(input("name", &current.title))
        .child(input("desc", &current.desc))
        .child(input("emoji", current.emoji_char.as_deref().unwrap_or("")))
        .child(input(
            "favIconUrl",
            current.fav_icon_url.as_deref().unwrap_or(""),
        ))
        .child(input("url", &current.url));

    let mut root = Node::element("div")
        .key(committed.url.as_str())
        .attr("class", "custom-action")
        .attr("state", draft.state().to_string())
        .child(form)
        .child(
            Node::element("div")
                .attr("class", "preview")
                .child(Node::text("Preview:"))
                .child(render_item(&current)),
        );
    if draft.is_dirty() {
        root = root.attr("dirty", "true");
    }

    let intents = if draft.state() == DraftState::Editing {
        vec![
            IntentName::Update,
            IntentName::Commit,
            IntentName::Discard,
            IntentName::OnDeleteIntent,
        ]
    } else {
        Vec::new()
    };
    View { root, intents }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
