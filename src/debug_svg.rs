//! Pictures of an elimination run.

use kurbo::Rect;
use svg::{
    node::element::{path::Data, Circle, Path},
    Document,
};

use crate::positions::{PosVec, Positions};

/// Draws every line and ring as it was before simplification, with the
/// surviving positions in black and the deleted ones in red.
pub fn dump(positions: &Positions, deleted: &PosVec<bool>) -> Document {
    let coords = positions.coords();
    let mut bbox: Option<Rect> = None;
    for (_, p) in coords.iter() {
        let p = p.to_kurbo();
        bbox = Some(match bbox {
            Some(b) => b.union_pt(p),
            None => Rect::from_points(p, p),
        });
    }
    let Some(bbox) = bbox else {
        return Document::new();
    };
    let (min_x, max_x, min_y, max_y) = (bbox.x0, bbox.x1, bbox.y0, bbox.y1);

    let size = (max_x - min_x).max(max_y - min_y).max(f64::MIN_POSITIVE);
    let stroke_width = size / 512.0;
    let pad = size / 32.0;
    // SVG's y axis points down.
    let flip = |y: f64| min_y + max_y - y;

    let mut document = Document::new().set(
        "viewBox",
        (
            min_x - pad,
            min_y - pad,
            max_x - min_x + 2.0 * pad,
            max_y - min_y + 2.0 * pad,
        ),
    );

    let (_, next) = positions.links();
    let mut data = Data::new();
    for (idx, p) in coords.iter() {
        if let Some(n) = next[idx] {
            let q = coords[n];
            data = data.move_to((p.x, flip(p.y))).line_to((q.x, flip(q.y)));
        }
    }
    let path = Path::new()
        .set("stroke", "black")
        .set("stroke-width", stroke_width)
        .set("stroke-linecap", "round")
        .set("opacity", 0.3)
        .set("fill", "none")
        .set("d", data);
    document = document.add(path);

    for (idx, p) in coords.iter() {
        let color = if deleted[idx] { "red" } else { "black" };
        let circle = Circle::new()
            .set("cx", p.x)
            .set("cy", flip(p.y))
            .set("r", stroke_width * 2.0)
            .set("fill", color);
        document = document.add(circle);
    }
    document
}
