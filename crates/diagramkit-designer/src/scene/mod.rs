//! Scene graph of nodes, ports and links.
//!
//! Objects live in id-keyed maps and are painted in insertion order, later
//! objects in front. Document-layer ports are kept in a quadtree so the
//! port locator can restrict its search to the area around the pointer.
//!
//! Every mutation that can change link geometry invalidates the link-info
//! caches of the ports involved, and of the ports at the far ends of their
//! links, and then reroutes the affected links.

mod routing;

use std::collections::HashMap;

use diagramkit_core::geometry::{Point, Rect};
use diagramkit_core::{LinkEnd, LinkingConfig, ObjectId, Result, SceneError};

use crate::box_port::BoxPort;
use crate::model::{Layer, Link, LinkAttachment, LinkStyle, Node, Port, PortCapabilities, PortKind};
use crate::port_geometry::ProxyPort;
use crate::side::SideSet;
use crate::spatial_index::SpatialIndex;

/// Arena holding every object of one diagram.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: HashMap<ObjectId, Node>,
    ports: HashMap<ObjectId, Port>,
    links: HashMap<ObjectId, Link>,
    z_order: HashMap<ObjectId, u64>,
    port_index: SpatialIndex,
    next_id: u64,
    next_z: u64,
    config: LinkingConfig,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(LinkingConfig::default())
    }
}

impl Scene {
    pub fn new(config: LinkingConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            ports: HashMap::new(),
            links: HashMap::new(),
            z_order: HashMap::new(),
            port_index: SpatialIndex::default(),
            next_id: 1,
            next_z: 0,
            config,
        }
    }

    pub fn config(&self) -> &LinkingConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: LinkingConfig) {
        self.config = config;
        let ports: Vec<ObjectId> = self.ports.keys().copied().collect();
        self.refresh_ports(&ports);
    }

    fn generate_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn raise(&mut self, id: ObjectId) {
        self.z_order.insert(id, self.next_z);
        self.next_z += 1;
    }

    /// Paint position of an object; larger values are in front.
    pub fn z_index(&self, id: ObjectId) -> Option<u64> {
        self.z_order.get(&id).copied()
    }

    pub fn node(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn port(&self, id: ObjectId) -> Option<&Port> {
        self.ports.get(&id)
    }

    pub fn link(&self, id: ObjectId) -> Option<&Link> {
        self.links.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Number of links in the document layer.
    pub fn document_link_count(&self) -> usize {
        self.links
            .values()
            .filter(|l| l.layer == Layer::Document)
            .count()
    }

    /// Number of interaction-layer ports and links currently alive.
    pub fn temporary_count(&self) -> usize {
        self.ports
            .values()
            .filter(|p| p.layer == Layer::Interaction)
            .count()
            + self
                .links
                .values()
                .filter(|l| l.layer == Layer::Interaction)
                .count()
    }

    fn require_node(&self, id: ObjectId) -> Result<&Node> {
        self.nodes
            .get(&id)
            .ok_or_else(|| SceneError::UnknownObject { id: id.raw() }.into())
    }

    fn require_port(&self, id: ObjectId) -> Result<&Port> {
        self.ports
            .get(&id)
            .ok_or_else(|| SceneError::UnknownObject { id: id.raw() }.into())
    }

    fn require_port_mut(&mut self, id: ObjectId) -> Result<&mut Port> {
        self.ports
            .get_mut(&id)
            .ok_or_else(|| SceneError::UnknownObject { id: id.raw() }.into())
    }

    fn require_link(&self, id: ObjectId) -> Result<&Link> {
        self.links
            .get(&id)
            .ok_or_else(|| SceneError::UnknownObject { id: id.raw() }.into())
    }

    fn require_box_port_mut(&mut self, id: ObjectId) -> Result<&mut BoxPort> {
        self.require_port_mut(id)?
            .box_port_mut()
            .ok_or_else(|| {
                SceneError::WrongKind {
                    id: id.raw(),
                    expected: "box port",
                }
                .into()
            })
    }

    // ----- nodes -----

    pub fn add_node(&mut self, name: impl Into<String>, bounds: Rect) -> ObjectId {
        let id = self.generate_id();
        self.nodes.insert(id, Node::new(id, name.into(), bounds));
        self.raise(id);
        id
    }

    /// Adds a node inside the group node `parent`.
    pub fn add_node_in(
        &mut self,
        parent: ObjectId,
        name: impl Into<String>,
        bounds: Rect,
    ) -> Result<ObjectId> {
        self.require_node(parent)?;
        let id = self.add_node(name, bounds);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
        Ok(id)
    }

    /// Moves a node together with its ports and descendant nodes.
    pub fn move_node(&mut self, id: ObjectId, dx: f64, dy: f64) -> Result<()> {
        self.require_node(id)?;
        let mut moved = vec![id];
        let mut i = 0;
        while i < moved.len() {
            let parent = moved[i];
            moved.extend(
                self.nodes
                    .values()
                    .filter(|n| n.parent == Some(parent))
                    .map(|n| n.id),
            );
            i += 1;
        }

        let mut touched = Vec::new();
        for node_id in &moved {
            let Some(node) = self.nodes.get_mut(node_id) else {
                continue;
            };
            node.bounds = node.bounds.translated(dx, dy);
            for port_id in node.ports.clone() {
                if let Some(port) = self.ports.get(&port_id) {
                    let bounds = port.bounds.translated(dx, dy);
                    self.place_port(port_id, bounds);
                    touched.push(port_id);
                }
            }
        }
        tracing::debug!("Moved node {} by ({:.1}, {:.1})", id, dx, dy);
        self.refresh_ports(&touched);
        Ok(())
    }

    /// Resizes a node; its box ports follow the new bounds.
    pub fn resize_node(&mut self, id: ObjectId, bounds: Rect) -> Result<()> {
        self.require_node(id)?;
        let mut touched = Vec::new();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.bounds = bounds;
            for port_id in node.ports.clone() {
                if self.ports.get(&port_id).and_then(Port::box_port).is_some() {
                    self.place_port(port_id, bounds);
                    touched.push(port_id);
                }
            }
        }
        self.refresh_ports(&touched);
        Ok(())
    }

    pub fn set_node_visible(&mut self, id: ObjectId, visible: bool) -> Result<()> {
        self.require_node(id)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
        Ok(())
    }

    // ----- ports -----

    fn insert_port(&mut self, mut port: Port, owner: Option<ObjectId>) -> ObjectId {
        let id = port.id;
        port.owner = owner;
        if port.layer == Layer::Document {
            self.port_index.insert(id, &port.bounds);
        }
        self.ports.insert(id, port);
        if let Some(node) = owner.and_then(|o| self.nodes.get_mut(&o)) {
            node.ports.push(id);
        }
        self.raise(id);
        id
    }

    fn place_port(&mut self, id: ObjectId, bounds: Rect) {
        let Some(port) = self.ports.get_mut(&id) else {
            return;
        };
        let old = port.bounds;
        port.bounds = bounds;
        if port.layer == Layer::Document {
            self.port_index.update(id, &old, &bounds);
        }
    }

    /// Adds a box port covering the whole of `node`.
    pub fn add_box_port(&mut self, node: ObjectId, geometry: BoxPort) -> Result<ObjectId> {
        let bounds = self.require_node(node)?.bounds;
        let id = self.generate_id();
        let port = Port::new(id, bounds, PortKind::Box(geometry));
        Ok(self.insert_port(port, Some(node)))
    }

    /// Adds a zero-size port at `at` on `node`.
    pub fn add_point_port(&mut self, node: ObjectId, at: Point) -> Result<ObjectId> {
        self.require_node(node)?;
        let id = self.generate_id();
        let port = Port::new(id, Rect::at_point(at), PortKind::Point);
        Ok(self.insert_port(port, Some(node)))
    }

    /// Adds a port that belongs to `link` itself, such as a label other
    /// links may attach to.
    pub fn add_label_port(&mut self, link: ObjectId, bounds: Rect) -> Result<ObjectId> {
        self.require_link(link)?;
        let id = self.generate_id();
        let mut port = Port::new(id, bounds, PortKind::Point);
        port.label_of = Some(link);
        Ok(self.insert_port(port, None))
    }

    pub fn set_port_capabilities(&mut self, id: ObjectId, capabilities: PortCapabilities) -> Result<()> {
        self.require_port_mut(id)?.capabilities = capabilities;
        Ok(())
    }

    pub fn set_port_visible(&mut self, id: ObjectId, visible: bool) -> Result<()> {
        self.require_port_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_port_bounds(&mut self, id: ObjectId, bounds: Rect) -> Result<()> {
        self.require_port(id)?;
        self.place_port(id, bounds);
        self.refresh_ports(&[id]);
        Ok(())
    }

    /// Restricts the sides a box port accepts at one link end.
    pub fn set_port_sides(&mut self, id: ObjectId, end: LinkEnd, sides: SideSet) -> Result<()> {
        self.require_box_port_mut(id)?.set_sides(end, sides);
        self.refresh_ports(&[id]);
        Ok(())
    }

    pub fn set_port_spread(&mut self, id: ObjectId, spread: bool) -> Result<()> {
        self.require_box_port_mut(id)?.set_spread(spread);
        self.refresh_ports(&[id]);
        Ok(())
    }

    pub fn set_port_end_segment_length(&mut self, id: ObjectId, length: f64) -> Result<()> {
        self.require_box_port_mut(id)?.set_end_segment_length(length);
        self.refresh_ports(&[id]);
        Ok(())
    }

    /// Document-layer ports whose bounds intersect `area`.
    pub fn ports_in(&self, area: &Rect) -> Vec<ObjectId> {
        self.port_index.query(area)
    }

    /// True when the port and every node above it are visible.
    pub fn is_port_interactable(&self, id: ObjectId) -> bool {
        let Some(port) = self.ports.get(&id) else {
            return false;
        };
        if !port.visible || port.layer != Layer::Document {
            return false;
        }
        let mut owner = port.owner;
        while let Some(node_id) = owner {
            match self.nodes.get(&node_id) {
                Some(node) if node.visible => owner = node.parent,
                _ => return false,
            }
        }
        if let Some(link) = port.label_of {
            return self.links.contains_key(&link);
        }
        true
    }

    /// True when `port` is a structural part of `link`.
    pub fn is_part_of_link(&self, port: ObjectId, link: ObjectId) -> bool {
        self.ports
            .get(&port)
            .is_some_and(|p| p.label_of == Some(link))
    }

    // ----- link validity -----

    /// Whether a link may connect `from` to `to`.
    ///
    /// With one end missing the present port's own capability decides.
    /// `edited` names the link being reconnected: its own parts cannot be
    /// linked to and it never counts as a duplicate of itself.
    pub fn is_valid_link(
        &self,
        from: Option<ObjectId>,
        to: Option<ObjectId>,
        edited: Option<ObjectId>,
    ) -> bool {
        let from = from.and_then(|id| self.ports.get(&id));
        let to = to.and_then(|id| self.ports.get(&id));
        match (from, to) {
            (None, None) => false,
            (Some(from), None) => from.can_link_from(),
            (None, Some(to)) => to.can_link_to(),
            (Some(from), Some(to)) => {
                if let Some(link) = edited {
                    if from.label_of == Some(link) || to.label_of == Some(link) {
                        return false;
                    }
                }
                from.is_valid_link_to(self, to, edited)
            }
        }
    }

    /// True when a document link already runs from `from` to `to`.
    pub fn has_link_between(&self, from: ObjectId, to: ObjectId, ignore: Option<ObjectId>) -> bool {
        self.links.values().any(|link| {
            link.layer == Layer::Document
                && Some(link.id) != ignore
                && link.from == Some(from)
                && link.to == Some(to)
        })
    }

    /// The point a link end aims at: the center of the port at the other
    /// end, else the link's stored point there, else the center of the
    /// port at this end.
    pub fn far_point(&self, link: &Link, end: LinkEnd) -> Point {
        let other = end.opposite();
        if let Some(port) = link.port(other).and_then(|id| self.ports.get(&id)) {
            return port.center();
        }
        if let Some(point) = link.end_point(other) {
            return point;
        }
        link.port(end)
            .and_then(|id| self.ports.get(&id))
            .map(Port::center)
            .unwrap_or_default()
    }

    /// Innermost group node containing the owners of both ports.
    ///
    /// With only one port given, its owner's group.
    pub fn common_group(&self, a: Option<ObjectId>, b: Option<ObjectId>) -> Option<ObjectId> {
        let groups_of = |port: Option<ObjectId>| -> Option<Vec<ObjectId>> {
            let port = self.ports.get(&port?)?;
            let mut chain = Vec::new();
            let mut current = port
                .owner
                .and_then(|owner| self.nodes.get(&owner))
                .and_then(|n| n.parent);
            while let Some(id) = current {
                chain.push(id);
                current = self.nodes.get(&id).and_then(|n| n.parent);
            }
            Some(chain)
        };

        match (groups_of(a), groups_of(b)) {
            (Some(a), Some(b)) => a.into_iter().find(|g| b.contains(g)),
            (Some(only), None) | (None, Some(only)) => only.first().copied(),
            (None, None) => None,
        }
    }

    // ----- links -----

    /// Adds a document link and attaches it to its ports.
    pub fn add_link(
        &mut self,
        from: Option<ObjectId>,
        to: Option<ObjectId>,
        style: LinkStyle,
    ) -> Result<ObjectId> {
        self.add_link_in_layer(from, to, style, Layer::Document)
    }

    fn add_link_in_layer(
        &mut self,
        from: Option<ObjectId>,
        to: Option<ObjectId>,
        style: LinkStyle,
        layer: Layer,
    ) -> Result<ObjectId> {
        for port in [from, to].into_iter().flatten() {
            self.require_port(port)?;
        }
        let id = self.generate_id();
        let mut link = Link::new(id, from, to, style);
        link.layer = layer;
        if layer == Layer::Document {
            link.parent = self.common_group(from, to);
        }
        self.insert_link(link);
        Ok(id)
    }

    fn insert_link(&mut self, link: Link) {
        let id = link.id;
        let ends = [(LinkEnd::From, link.from), (LinkEnd::To, link.to)];
        self.links.insert(id, link);
        self.raise(id);
        let mut touched = Vec::new();
        for (end, port) in ends {
            if let Some(port_id) = port {
                self.attach(port_id, id, end);
                touched.push(port_id);
            }
        }
        self.refresh_ports(&touched);
        self.reroute(id);
    }

    fn attach(&mut self, port: ObjectId, link: ObjectId, end: LinkEnd) {
        if let Some(p) = self.ports.get_mut(&port) {
            p.links.push(LinkAttachment { link, end });
        }
    }

    fn detach(&mut self, port: ObjectId, link: ObjectId, end: LinkEnd) {
        if let Some(p) = self.ports.get_mut(&port) {
            p.links.retain(|a| !(a.link == link && a.end == end));
        }
    }

    /// Removes a link and returns it so it can be restored later.
    pub fn remove_link(&mut self, id: ObjectId) -> Result<Link> {
        self.require_link(id)?;
        let ports: Vec<(LinkEnd, ObjectId)> = self.links[&id].ends().collect();
        for (end, port) in &ports {
            self.detach(*port, id, *end);
        }
        self.z_order.remove(&id);
        let link = self
            .links
            .remove(&id)
            .ok_or(SceneError::UnknownObject { id: id.raw() })?;
        let touched: Vec<ObjectId> = ports.into_iter().map(|(_, p)| p).collect();
        self.refresh_ports(&touched);
        Ok(link)
    }

    /// Puts a link removed by [`Scene::remove_link`] back.
    pub fn restore_link(&mut self, link: Link) -> Result<()> {
        for (_, port) in link.ends() {
            self.require_port(port)?;
        }
        self.next_id = self.next_id.max(link.id.raw() + 1);
        self.insert_link(link);
        Ok(())
    }

    /// Connects one end of a link to `port` (or to nothing) and returns the
    /// port previously there.
    pub fn set_link_port(
        &mut self,
        link: ObjectId,
        end: LinkEnd,
        port: Option<ObjectId>,
    ) -> Result<Option<ObjectId>> {
        self.require_link(link)?;
        if let Some(p) = port {
            self.require_port(p)?;
        }
        let previous = self.links[&link].port(end);
        if previous == port {
            return Ok(previous);
        }
        let other = self.links[&link].port(end.opposite());

        if let Some(old) = previous {
            self.detach(old, link, end);
        }
        if let Some(l) = self.links.get_mut(&link) {
            l.set_port(end, port);
        }
        if let Some(new) = port {
            self.attach(new, link, end);
        }

        let touched: Vec<ObjectId> = [previous, port, other].into_iter().flatten().collect();
        self.refresh_ports(&touched);
        self.reroute(link);
        Ok(previous)
    }

    /// Moves a link into another group; returns the previous group.
    pub fn set_link_parent(&mut self, link: ObjectId, parent: Option<ObjectId>) -> Result<Option<ObjectId>> {
        if let Some(group) = parent {
            self.require_node(group)?;
        }
        let l = self
            .links
            .get_mut(&link)
            .ok_or(SceneError::UnknownObject { id: link.raw() })?;
        Ok(std::mem::replace(&mut l.parent, parent))
    }

    /// Replaces the stored path of a link without rerouting it.
    ///
    /// Dangling ends keep the replaced points until reconnected; attached
    /// ends are recomputed on the next reroute.
    pub fn set_link_points(&mut self, link: ObjectId, points: Vec<Point>) -> Result<Vec<Point>> {
        let l = self
            .links
            .get_mut(&link)
            .ok_or(SceneError::UnknownObject { id: link.raw() })?;
        Ok(std::mem::replace(&mut l.points, points))
    }

    // ----- interaction layer -----

    /// Adds a temporary port mimicking `target`, placed at `bounds`.
    pub fn add_temporary_port(&mut self, target: Option<ObjectId>, bounds: Rect) -> ObjectId {
        let id = self.generate_id();
        let mut port = Port::new(id, bounds, PortKind::Proxy(ProxyPort::new(target)));
        port.layer = Layer::Interaction;
        port.capabilities = PortCapabilities {
            linkable_from: true,
            linkable_to: true,
            allow_self_links: true,
            allow_duplicate_links: true,
        };
        self.insert_port(port, None)
    }

    /// Adds a temporary link between two ports.
    pub fn add_temporary_link(
        &mut self,
        from: Option<ObjectId>,
        to: Option<ObjectId>,
        style: LinkStyle,
    ) -> Result<ObjectId> {
        self.add_link_in_layer(from, to, style, Layer::Interaction)
    }

    /// Points a temporary port at a new target and moves it.
    pub fn retarget_temporary_port(
        &mut self,
        id: ObjectId,
        target: Option<ObjectId>,
        bounds: Rect,
    ) -> Result<()> {
        match &mut self.require_port_mut(id)?.kind {
            PortKind::Proxy(proxy) => proxy.set_target(target),
            _ => {
                return Err(SceneError::WrongKind {
                    id: id.raw(),
                    expected: "temporary port",
                }
                .into())
            }
        }
        self.place_port(id, bounds);
        self.refresh_ports(&[id]);
        Ok(())
    }

    /// Removes an interaction-layer port or link. Returns false when `id`
    /// is not a live temporary object.
    pub fn remove_temporary(&mut self, id: ObjectId) -> bool {
        if self.links.get(&id).is_some_and(|l| l.layer == Layer::Interaction) {
            return self.remove_link(id).is_ok();
        }
        if !self.ports.get(&id).is_some_and(|p| p.layer == Layer::Interaction) {
            return false;
        }
        let attachments: Vec<LinkAttachment> = self.ports[&id].links.to_vec();
        for attachment in &attachments {
            if let Some(link) = self.links.get_mut(&attachment.link) {
                link.set_port(attachment.end, None);
            }
        }
        self.ports.remove(&id);
        self.z_order.remove(&id);
        let touched: Vec<ObjectId> = attachments
            .iter()
            .filter_map(|a| self.links.get(&a.link))
            .filter_map(|l| l.from.or(l.to))
            .collect();
        self.refresh_ports(&touched);
        true
    }

    // ----- cache maintenance -----

    /// Invalidates the given ports and the ports at the far ends of their
    /// links, then reroutes every link touching them.
    fn refresh_ports(&mut self, ports: &[ObjectId]) {
        let mut affected: Vec<ObjectId> = ports.to_vec();
        for id in ports {
            let Some(port) = self.ports.get(id) else {
                continue;
            };
            for attachment in &port.links {
                if let Some(other) = self
                    .links
                    .get(&attachment.link)
                    .and_then(|l| l.port(attachment.end.opposite()))
                {
                    affected.push(other);
                }
            }
        }
        affected.sort_unstable();
        affected.dedup();

        let mut links = Vec::new();
        for id in &affected {
            if let Some(port) = self.ports.get(id) {
                if let Some(geometry) = port.box_port() {
                    geometry.invalidate();
                }
                links.extend(port.links.iter().map(|a| a.link));
            }
        }
        links.sort_unstable();
        links.dedup();
        for link in links {
            self.reroute(link);
        }
    }
}
