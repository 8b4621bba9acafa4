//! In-memory element tree for trainer cards and their rosters.
//!
//! Nodes live in an arena owned by [`View`]. Detached nodes keep their slot
//! but are no longer reachable from the root. Interactive elements carry an
//! [`Action`] instead of relying on class names for dispatch.

use std::{collections::HashMap, fmt, str::FromStr};

use shared::domain::{Creature, CreatureId, Trainer, TrainerId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NodeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Main,
    Div,
    P,
    Button,
    Ul,
    Li,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Div => "div",
            Self::P => "p",
            Self::Button => "button",
            Self::Ul => "ul",
            Self::Li => "li",
        }
    }
}

/// What activating an element asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddCreature { trainer_id: TrainerId },
    ReleaseCreature { creature_id: CreatureId },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddCreature { trainer_id } => write!(f, "add trainer={trainer_id}"),
            Self::ReleaseCreature { creature_id } => write!(f, "release creature={creature_id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: Tag,
    pub class: Option<&'static str>,
    pub data: Option<(&'static str, String)>,
    pub text: Option<String>,
    pub action: Option<Action>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            class: None,
            data: None,
            text: None,
            action: None,
            children: Vec::new(),
            parent: None,
        }
    }

    fn class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    fn data(mut self, key: &'static str, value: impl ToString) -> Self {
        self.data = Some((key, value.to_string()));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} is not a roster list")]
    NotARoster(NodeId),
}

/// Result of asking for room in a trainer's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Reserved,
    Full { size: usize },
    UnknownTrainer,
}

#[derive(Debug)]
struct Roster {
    list: NodeId,
    pending: usize,
}

#[derive(Debug)]
pub struct View {
    nodes: Vec<Element>,
    root: NodeId,
    rosters: HashMap<TrainerId, Roster>,
    entries: HashMap<CreatureId, NodeId>,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new(Tag::Main)],
            root: NodeId(0),
            rosters: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Element::children).unwrap_or_default()
    }

    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.text.as_deref())
    }

    /// Action of a node that is still attached to the root.
    pub fn action_at(&self, id: NodeId) -> Option<Action> {
        if !self.is_mounted(id) {
            return None;
        }
        self.node(id).and_then(|node| node.action)
    }

    pub fn is_mounted(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.node(node_id).and_then(Element::parent);
        }
        false
    }

    pub fn roster_of(&self, trainer_id: TrainerId) -> Option<NodeId> {
        self.rosters.get(&trainer_id).map(|roster| roster.list)
    }

    pub fn roster_len(&self, trainer_id: TrainerId) -> Option<usize> {
        self.roster_of(trainer_id)
            .map(|list| self.children(list).len())
    }

    pub fn entry_of(&self, creature_id: CreatureId) -> Option<NodeId> {
        self.entries.get(&creature_id).copied()
    }

    fn insert(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(element);
        id
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id.0).and_then(|node| node.parent.take()) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
    }

    /// Builds a trainer card with its roster and mounts it under the root.
    pub fn render_trainer(&mut self, trainer: &Trainer) -> NodeId {
        let card = self.insert(Element::new(Tag::Div).class("card").data("id", trainer.id));
        let name = self.insert(Element::new(Tag::P).text(trainer.name.clone()));
        let add = self.insert(
            Element::new(Tag::Button)
                .class("add-pokemon")
                .data("id", trainer.id)
                .text("Add Pokemon")
                .action(Action::AddCreature {
                    trainer_id: trainer.id,
                }),
        );
        let list = self.insert(Element::new(Tag::Ul));
        for child in [name, add, list] {
            self.attach(card, child);
        }

        self.rosters
            .insert(trainer.id, Roster { list, pending: 0 });
        for creature in &trainer.creatures {
            self.append_entry(creature, list);
        }

        self.attach(self.root, card);
        card
    }

    /// Appends a roster entry for `creature` to `roster`. Both the launch
    /// render and post-create updates go through here.
    pub fn render_creature(
        &mut self,
        creature: &Creature,
        roster: NodeId,
    ) -> Result<NodeId, ViewError> {
        match self.node(roster) {
            None => return Err(ViewError::UnknownNode(roster)),
            Some(node) if node.tag != Tag::Ul => return Err(ViewError::NotARoster(roster)),
            Some(_) => {}
        }
        Ok(self.append_entry(creature, roster))
    }

    fn append_entry(&mut self, creature: &Creature, list: NodeId) -> NodeId {
        let entry = self.insert(Element::new(Tag::Li).text(creature.label()));
        let release = self.insert(
            Element::new(Tag::Button)
                .class("release")
                .data("pokemon-id", creature.id)
                .text("Release")
                .action(Action::ReleaseCreature {
                    creature_id: creature.id,
                }),
        );
        self.attach(entry, release);
        self.attach(list, entry);
        self.entries.insert(creature.id, entry);
        entry
    }

    /// Detaches the entry for `creature_id`, returning it if it was shown.
    pub fn remove_creature(&mut self, creature_id: CreatureId) -> Option<NodeId> {
        let entry = self.entries.remove(&creature_id)?;
        self.detach(entry);
        Some(entry)
    }

    /// Claims one slot in the trainer's roster for an in-flight create.
    pub fn try_reserve(&mut self, trainer_id: TrainerId, limit: usize) -> Reservation {
        let Some(roster) = self.rosters.get(&trainer_id) else {
            return Reservation::UnknownTrainer;
        };
        let size = self.nodes[roster.list.0].children.len() + roster.pending;
        if size >= limit {
            return Reservation::Full { size };
        }
        if let Some(roster) = self.rosters.get_mut(&trainer_id) {
            roster.pending += 1;
        }
        Reservation::Reserved
    }

    pub fn release_reservation(&mut self, trainer_id: TrainerId) {
        if let Some(roster) = self.rosters.get_mut(&trainer_id) {
            roster.pending = roster.pending.saturating_sub(1);
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(self.root, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        out.push('<');
        out.push_str(node.tag.as_str());
        if let Some(class) = node.class {
            out.push_str(&format!(" class=\"{class}\""));
        }
        if let Some((key, value)) = &node.data {
            out.push_str(&format!(" data-{key}=\"{}\"", escape(value)));
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(&escape(text));
            if !node.children.is_empty() {
                out.push(' ');
            }
        }
        for child in &node.children {
            self.write_html(*child, out);
        }
        out.push_str(&format!("</{}>", node.tag.as_str()));
    }

    /// One line per mounted node, indented by depth.
    pub fn outline(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.write_outline(self.root, 0, &mut lines);
        lines
    }

    fn write_outline(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) {
        let node = &self.nodes[id.0];
        let mut line = format!("{}#{id} {}", "  ".repeat(depth), node.tag.as_str());
        if let Some(class) = node.class {
            line.push('.');
            line.push_str(class);
        }
        if let Some(text) = &node.text {
            line.push_str(&format!(" {text:?}"));
        }
        if let Some(action) = node.action {
            line.push_str(&format!(" [{action}]"));
        }
        lines.push(line);
        for child in &node.children {
            self.write_outline(*child, depth + 1, lines);
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
