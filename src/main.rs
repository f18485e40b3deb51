//! Scripted linking session.
//!
//! Builds a small diagram, draws a link between two boxes, drags it to a
//! third box, cancels a second drag and undoes the lot, logging each step.
//! An optional first argument names a JSON or TOML `LinkingConfig` file.

use std::path::Path;

use diagramkit::{
    init_logging, BoxPort, Diagram, LinkEnd, LinkStyle, LinkingConfig, LinkingTool, Point, Rect,
    BUILD_DATE, VERSION,
};

fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("diagramkit {} (built {})", VERSION, BUILD_DATE);

    let config = match std::env::args().nth(1) {
        Some(path) => LinkingConfig::load_from_file(Path::new(&path))?,
        None => LinkingConfig::default(),
    };
    config.validate()?;

    let mut diagram = Diagram::new(config);
    let segment = diagram.config().end_segment_length;

    let a = diagram.scene.add_node("A", Rect::new(0.0, 0.0, 80.0, 40.0));
    let b = diagram.scene.add_node("B", Rect::new(300.0, 0.0, 80.0, 40.0));
    let c = diagram.scene.add_node("C", Rect::new(300.0, 200.0, 80.0, 40.0));
    let port_a = diagram
        .scene
        .add_box_port(a, BoxPort::new(segment).with_spread(true))?;
    let port_b = diagram.scene.add_box_port(b, BoxPort::new(segment))?;
    let port_c = diagram.scene.add_box_port(c, BoxPort::new(segment))?;

    let mut tool = LinkingTool::new(LinkStyle::orthogonal());

    tool.start_new_link(&mut diagram, port_a, Point::new(40.0, 20.0))?;
    tool.on_pointer_move(&mut diagram, Point::new(200.0, 20.0))?;
    tool.on_pointer_move(&mut diagram, Point::new(335.0, 20.0))?;
    let created = tool.on_pointer_up(&mut diagram, Point::new(340.0, 20.0))?;
    tracing::info!("Gesture 1: {}", created);

    let Some(link) = created.link() else {
        anyhow::bail!("no link was created");
    };
    if let Some(path) = diagram.scene.link_path(link) {
        tracing::info!("Route: {:?}", path);
    }

    tool.start_relink(&mut diagram, link, LinkEnd::To, Point::new(300.0, 20.0))?;
    let relinked = tool.on_pointer_up(&mut diagram, Point::new(340.0, 215.0))?;
    tracing::info!("Gesture 2: {}", relinked);

    tool.start_relink(&mut diagram, link, LinkEnd::To, Point::new(340.0, 200.0))?;
    tool.on_pointer_move(&mut diagram, Point::new(700.0, 700.0))?;
    let cancelled = tool.on_cancel(&mut diagram)?;
    tracing::info!(
        "Gesture 3: {} (link still ends at {:?}, expected {})",
        cancelled,
        diagram.scene.link(link).and_then(|l| l.to_port()),
        port_c
    );

    while diagram.undo()? {
        tracing::info!(
            "Undo: {} document link(s), port B has {} attachment(s)",
            diagram.scene.document_link_count(),
            diagram.scene.port(port_b).map_or(0, |p| p.link_count())
        );
    }

    Ok(())
}
