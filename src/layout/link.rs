use serde::Serialize;

use super::node_link::Orientation;
use super::Point;

/// How a parent–child edge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LinkShape {
    Straight,
    /// Cubic Bézier with both control points halfway along the depth axis.
    #[default]
    Curved,
}

/// One segment of an edge path, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point),
}

/// Path from `from` to `to`. Pure function of the endpoints.
pub fn link_path(
    from: Point,
    to: Point,
    shape: LinkShape,
    orientation: Orientation,
) -> Vec<PathCommand> {
    let end = match shape {
        LinkShape::Straight => PathCommand::LineTo(to),
        LinkShape::Curved => match orientation {
            Orientation::Vertical => {
                let mid = (from.y + to.y) / 2.0;
                PathCommand::CubicTo(Point::new(from.x, mid), Point::new(to.x, mid), to)
            }
            Orientation::Horizontal => {
                let mid = (from.x + to.x) / 2.0;
                PathCommand::CubicTo(Point::new(mid, from.y), Point::new(mid, to.y), to)
            }
        },
    };
    vec![PathCommand::MoveTo(from), end]
}

/// SVG `d` attribute for a command list.
pub fn to_svg_path(commands: &[PathCommand]) -> String {
    let mut d = String::new();
    for cmd in commands {
        let segment = match cmd {
            PathCommand::MoveTo(p) => format!("M{},{}", p.x, p.y),
            PathCommand::LineTo(p) => format!("L{},{}", p.x, p.y),
            PathCommand::CubicTo(c1, c2, p) => {
                format!("C{},{} {},{} {},{}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
            }
        };
        d.push_str(&segment);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_curve_bends_at_mid_depth() {
        let path = link_path(
            Point::new(0.0, 0.0),
            Point::new(100.0, 80.0),
            LinkShape::Curved,
            Orientation::Vertical,
        );
        assert_eq!(to_svg_path(&path), "M0,0C0,40 100,40 100,80");
    }

    #[test]
    fn horizontal_curve_bends_at_mid_x() {
        let path = link_path(
            Point::new(0.0, 10.0),
            Point::new(80.0, 30.0),
            LinkShape::Curved,
            Orientation::Horizontal,
        );
        assert_eq!(to_svg_path(&path), "M0,10C40,10 40,30 80,30");
    }

    #[test]
    fn straight_link_is_a_single_line() {
        let path = link_path(
            Point::new(1.5, 2.0),
            Point::new(3.0, 4.0),
            LinkShape::Straight,
            Orientation::Vertical,
        );
        assert_eq!(
            path,
            [
                PathCommand::MoveTo(Point::new(1.5, 2.0)),
                PathCommand::LineTo(Point::new(3.0, 4.0))
            ]
        );
        assert_eq!(to_svg_path(&path), "M1.5,2L3,4");
    }
}
