//! Rectangular ports that attach links to their sides.
//!
//! Each attached link end resolves to one side of the port through the
//! side resolver. When spreading is enabled, links sharing a side are
//! distributed evenly along it in angle order, and orthogonal links get
//! staggered end segments so their final runs do not overlap.
//!
//! Per-link results live in a lazily rebuilt cache. The cache is a
//! three-state value: a rebuild marks it [`CacheState::Rebuilding`] so
//! that direction queries issued while computing angles resolve directly
//! instead of recursing into the rebuild.
//!
//! A link that is not attached here, such as the preview of a link being
//! drawn onto this port through a temporary port, is laid out as one more
//! attachment on top of the real ones. That layout is never cached.

use std::cell::RefCell;
use std::cmp::Ordering;

use diagramkit_core::geometry::{angle_between, Point};
use diagramkit_core::{LinkEnd, ObjectId};

use crate::model::{Link, LinkAttachment, Port};
use crate::port_geometry::PortGeometry;
use crate::scene::Scene;
use crate::side::{resolve_side, Side, SideSet};

/// Attachment data computed for one link end on a box port.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkInfo {
    pub link: ObjectId,
    pub end: LinkEnd,
    pub side: Side,
    /// Angle from the port center to the far point. East-side angles are
    /// folded into `[-180, 180)` so they sort continuously across zero.
    pub angle: f64,
    pub index_on_side: usize,
    pub count_on_side: usize,
    pub link_point: Point,
    pub end_segment_length: f64,
}

/// Observable state of a box port's link-info cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Dirty,
    Rebuilding,
    Clean,
}

#[derive(Debug, Clone, Default)]
enum LinkInfoCache {
    #[default]
    Dirty,
    Rebuilding,
    Clean(Vec<LinkInfo>),
}

/// Side-aware port geometry.
#[derive(Debug, Clone)]
pub struct BoxPort {
    from_sides: SideSet,
    to_sides: SideSet,
    spread: bool,
    end_segment_length: f64,
    cache: RefCell<LinkInfoCache>,
}

impl BoxPort {
    /// Creates a port accepting links on every side, without spreading.
    pub fn new(end_segment_length: f64) -> Self {
        Self {
            from_sides: SideSet::EMPTY,
            to_sides: SideSet::EMPTY,
            spread: false,
            end_segment_length,
            cache: RefCell::new(LinkInfoCache::Dirty),
        }
    }

    pub fn with_sides(mut self, from_sides: SideSet, to_sides: SideSet) -> Self {
        self.from_sides = from_sides;
        self.to_sides = to_sides;
        self
    }

    pub fn with_spread(mut self, spread: bool) -> Self {
        self.spread = spread;
        self
    }

    /// Sides allowed for links leaving (`From`) or entering (`To`) here.
    ///
    /// An empty set allows every side.
    pub fn sides(&self, end: LinkEnd) -> SideSet {
        match end {
            LinkEnd::From => self.from_sides,
            LinkEnd::To => self.to_sides,
        }
    }

    pub fn from_sides(&self) -> SideSet {
        self.from_sides
    }

    pub fn to_sides(&self) -> SideSet {
        self.to_sides
    }

    pub fn is_spread(&self) -> bool {
        self.spread
    }

    pub fn base_end_segment_length(&self) -> f64 {
        self.end_segment_length
    }

    pub(crate) fn set_sides(&mut self, end: LinkEnd, sides: SideSet) {
        match end {
            LinkEnd::From => self.from_sides = sides,
            LinkEnd::To => self.to_sides = sides,
        }
        self.invalidate();
    }

    pub(crate) fn set_spread(&mut self, spread: bool) {
        if self.spread != spread {
            self.spread = spread;
            self.invalidate();
        }
    }

    pub(crate) fn set_end_segment_length(&mut self, length: f64) {
        self.end_segment_length = length;
        self.invalidate();
    }

    /// Marks the cache stale; the next query rebuilds it from scratch.
    pub fn invalidate(&self) {
        *self.cache.borrow_mut() = LinkInfoCache::Dirty;
    }

    pub fn cache_state(&self) -> CacheState {
        match &*self.cache.borrow() {
            LinkInfoCache::Dirty => CacheState::Dirty,
            LinkInfoCache::Rebuilding => CacheState::Rebuilding,
            LinkInfoCache::Clean(_) => CacheState::Clean,
        }
    }

    /// Attachment data for every link end on `port`, sorted by side and
    /// then by angle.
    ///
    /// `port` must be the port this geometry belongs to.
    pub fn link_infos(&self, port: &Port, scene: &Scene) -> Vec<LinkInfo> {
        if self.cache_state() == CacheState::Rebuilding {
            return self.compute(port, scene, None);
        }
        self.ensure_clean(port, scene);
        match &*self.cache.borrow() {
            LinkInfoCache::Clean(infos) => infos.clone(),
            _ => Vec::new(),
        }
    }

    fn ensure_clean(&self, port: &Port, scene: &Scene) {
        if self.cache_state() != CacheState::Dirty {
            return;
        }
        *self.cache.borrow_mut() = LinkInfoCache::Rebuilding;
        let infos = self.compute(port, scene, None);
        tracing::trace!("Rebuilt link infos for port {} ({} ends)", port.id(), infos.len());
        *self.cache.borrow_mut() = LinkInfoCache::Clean(infos);
    }

    fn cached(&self, port: &Port, scene: &Scene, link: ObjectId, end: LinkEnd) -> Option<LinkInfo> {
        self.ensure_clean(port, scene);
        match &*self.cache.borrow() {
            LinkInfoCache::Clean(infos) => infos
                .iter()
                .find(|info| info.link == link && info.end == end)
                .cloned(),
            _ => None,
        }
    }

    /// Attachment data for one link end, whether or not it is attached
    /// here. `None` while the cache rebuilds.
    pub fn link_info(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> Option<LinkInfo> {
        if self.cache_state() == CacheState::Rebuilding {
            return None;
        }
        if let Some(info) = self.cached(port, scene, link.id(), end) {
            return Some(info);
        }
        let extra = LinkAttachment { link: link.id(), end };
        self.compute(port, scene, Some(extra))
            .into_iter()
            .find(|info| info.link == extra.link && info.end == extra.end)
    }

    /// Resolves the side for one link end without consulting the cache.
    fn resolve(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> Side {
        let bias = link
            .is_orthogonal()
            .then(|| scene.config().orthogonal_bias_degrees);
        let far = scene.far_point(link, end);
        resolve_side(&port.bounds(), far, self.sides(end), bias).0
    }

    /// Lays out every attached link end, plus `extra` when given.
    fn compute(&self, port: &Port, scene: &Scene, extra: Option<LinkAttachment>) -> Vec<LinkInfo> {
        let bounds = port.bounds();
        let center = bounds.center();

        let mut infos: Vec<LinkInfo> = port
            .links()
            .iter()
            .copied()
            .filter(|attachment| Some(*attachment) != extra)
            .chain(extra)
            .filter_map(|attachment| {
                let link = scene.link(attachment.link)?;
                let side = self.resolve(port, scene, link, attachment.end);
                let mut angle = angle_between(center, scene.far_point(link, attachment.end));
                if side == Side::East && angle >= 180.0 {
                    angle -= 360.0;
                }
                Some(LinkInfo {
                    link: attachment.link,
                    end: attachment.end,
                    side,
                    angle,
                    index_on_side: 0,
                    count_on_side: 0,
                    link_point: center,
                    end_segment_length: self.end_segment_length,
                })
            })
            .collect();

        infos.sort_by(|a, b| match a.side.cmp(&b.side) {
            Ordering::Equal => a.angle.total_cmp(&b.angle),
            other => other,
        });

        let mut index = 0;
        for i in 0..infos.len() {
            if i > 0 && infos[i - 1].side != infos[i].side {
                index = 0;
            }
            infos[i].index_on_side = index;
            index += 1;
        }
        let mut count = 0;
        for i in (0..infos.len()).rev() {
            if i + 1 == infos.len() || infos[i + 1].side != infos[i].side {
                count = infos[i].index_on_side + 1;
            }
            infos[i].count_on_side = count;
        }

        let step = scene.config().end_segment_step;
        for info in &mut infos {
            info.link_point = if self.spread {
                let (start, end) = info.side.corners(&bounds);
                let t = (info.index_on_side + 1) as f64 / (info.count_on_side + 1) as f64;
                start.lerp(&end, t)
            } else {
                info.side.midpoint(&bounds)
            };

            if let Some(k) = self.stagger_rank(port, scene, info) {
                info.end_segment_length = self.end_segment_length + step * k as f64;
            }
        }
        infos
    }

    /// How many steps to lengthen the end segment of `info`, if at all.
    fn stagger_rank(&self, port: &Port, scene: &Scene, info: &LinkInfo) -> Option<usize> {
        if info.count_on_side < 2 {
            return None;
        }
        let link = scene.link(info.link)?;
        if !link.is_orthogonal() {
            return None;
        }
        let far = scene.port(link.port(info.end.opposite())?)?.center();
        let here = port.center();

        let (far_coord, here_coord) = if info.side.is_horizontal_edge() {
            (far.x, here.x)
        } else {
            (far.y, here.y)
        };
        let before = match far_coord.partial_cmp(&here_coord)? {
            Ordering::Equal => return None,
            Ordering::Less => true,
            Ordering::Greater => false,
        };

        let i = info.index_on_side;
        let from_end = info.count_on_side - 1 - i;
        // Sides walk right-to-left (north), left-to-right (south),
        // upward (east) and downward (west).
        let rank = match (info.side, before) {
            (Side::North, true) | (Side::East, true) => from_end,
            (Side::North, false) | (Side::East, false) => i,
            (Side::South, true) | (Side::West, true) => i,
            (Side::South, false) | (Side::West, false) => from_end,
        };
        Some(rank)
    }
}

impl PortGeometry for BoxPort {
    fn link_direction(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        self.link_info(port, scene, link, end)
            .map(|info| info.side)
            .unwrap_or_else(|| self.resolve(port, scene, link, end))
            .normal()
    }

    fn link_point(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> Point {
        self.link_info(port, scene, link, end)
            .map(|info| info.link_point)
            .unwrap_or_else(|| {
                self.resolve(port, scene, link, end)
                    .midpoint(&port.bounds())
            })
    }

    fn end_segment_length(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        self.link_info(port, scene, link, end)
            .map(|info| info.end_segment_length)
            .unwrap_or(self.end_segment_length)
    }
}
