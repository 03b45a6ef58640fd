//! The GeoJSON object tree.
//!
//! A [`GeoJson`] is one of nine kinds, distinguished by the `"type"` member.
//! Leaves hold nested coordinate arrays; `Feature`, `FeatureCollection` and
//! `GeometryCollection` hold further `GeoJson` values.

use std::str::FromStr;

use kurbo::Rect;
use serde_json::{Map, Value};

use crate::{error::Result, geom::Position, kind::Kind, Error};

/// A line: an open sequence of positions.
pub type Line = Vec<Position>;

/// A closed ring: the last position repeats the first.
pub type Ring = Vec<Position>;

/// A GeoJSON object.
///
/// Deep copies are plain [`Clone`]s: everything in the tree is owned, so a
/// clone shares nothing with the original.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    /// A single position. Never simplified.
    Point {
        /// The position.
        coordinates: Position,
    },
    /// Several unconnected positions. Never simplified.
    MultiPoint {
        /// The positions.
        coordinates: Vec<Position>,
    },
    /// An open polyline.
    LineString {
        /// The line's positions, including both endpoints.
        coordinates: Line,
    },
    /// Several open polylines.
    MultiLineString {
        /// The lines.
        coordinates: Vec<Line>,
    },
    /// An exterior ring followed by any number of interior rings (holes).
    Polygon {
        /// The rings, exterior first.
        coordinates: Vec<Ring>,
    },
    /// Several polygons.
    MultiPolygon {
        /// The polygons, each given by its rings.
        coordinates: Vec<Vec<Ring>>,
    },
    /// A heterogeneous collection of geometries.
    GeometryCollection {
        /// The member geometries.
        geometries: Vec<GeoJson>,
    },
    /// A geometry with properties attached.
    Feature {
        /// An optional identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        /// The wrapped geometry, which may be `null`.
        #[serde(default)]
        geometry: Option<Box<GeoJson>>,
        /// Arbitrary properties, which may be `null`.
        #[serde(default)]
        properties: Option<Map<String, Value>>,
    },
    /// A collection of features.
    FeatureCollection {
        /// The member features.
        features: Vec<GeoJson>,
    },
}

impl GeoJson {
    /// Converts a parsed JSON value into a GeoJSON tree.
    ///
    /// Values that aren't objects, or objects whose `type` isn't one of the nine
    /// GeoJSON kinds, are rejected with a type error before anything else is
    /// looked at.
    pub fn from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Object(obj) => {
                if Kind::of(&value).is_none() {
                    let tag = obj.get("type").map(|t| match t {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                    return Err(Error::UnknownType(tag));
                }
            }
            other => return Err(Error::NotAnObject(describe_value(other))),
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Converts this tree back into a JSON value.
    pub fn to_value(&self) -> Value {
        // Serializing our own types into a `Value` can't fail: all map keys are strings.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Which of the nine kinds this object is.
    pub fn kind(&self) -> Kind {
        match self {
            GeoJson::Point { .. } => Kind::Point,
            GeoJson::MultiPoint { .. } => Kind::MultiPoint,
            GeoJson::LineString { .. } => Kind::LineString,
            GeoJson::MultiLineString { .. } => Kind::MultiLineString,
            GeoJson::Polygon { .. } => Kind::Polygon,
            GeoJson::MultiPolygon { .. } => Kind::MultiPolygon,
            GeoJson::GeometryCollection { .. } => Kind::GeometryCollection,
            GeoJson::Feature { .. } => Kind::Feature,
            GeoJson::FeatureCollection { .. } => Kind::FeatureCollection,
        }
    }

    /// Wraps a geometry in a feature with no properties.
    pub fn feature(geometry: GeoJson) -> Self {
        GeoJson::Feature {
            id: None,
            geometry: Some(Box::new(geometry)),
            properties: None,
        }
    }

    /// Calls `f` on every position in this tree, in traversal order.
    ///
    /// This visits ring closing positions too.
    pub fn for_each_position(&self, f: &mut impl FnMut(Position)) {
        match self {
            GeoJson::Point { coordinates } => f(*coordinates),
            GeoJson::MultiPoint { coordinates } | GeoJson::LineString { coordinates } => {
                coordinates.iter().copied().for_each(f)
            }
            GeoJson::MultiLineString { coordinates } | GeoJson::Polygon { coordinates } => {
                coordinates.iter().flatten().copied().for_each(f)
            }
            GeoJson::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().for_each(f)
            }
            GeoJson::GeometryCollection { geometries: children }
            | GeoJson::FeatureCollection { features: children } => {
                for child in children {
                    child.for_each_position(f);
                }
            }
            GeoJson::Feature { geometry, .. } => {
                if let Some(geometry) = geometry {
                    geometry.for_each_position(f);
                }
            }
        }
    }

    /// The total number of positions in this tree, ring closing positions included.
    pub fn position_count(&self) -> usize {
        let mut count = 0;
        self.for_each_position(&mut |_| count += 1);
        count
    }

    /// The smallest rectangle containing every position, or `None` if there aren't any.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut bbox: Option<Rect> = None;
        self.for_each_position(&mut |p| {
            let p = p.to_kurbo();
            bbox = Some(match bbox {
                Some(b) => b.union_pt(p),
                None => Rect::from_points(p, p),
            });
        });
        bbox
    }

    /// Checks that every position is finite.
    pub(crate) fn check_finite(&self) -> Result<()> {
        // `Rect::union_pt` uses `f64::min`/`max`, which would drop NaNs on the floor.
        let mut nan = false;
        self.for_each_position(&mut |p| nan |= p.x.is_nan() || p.y.is_nan());
        if nan {
            return Err(Error::NaN);
        }

        if let Some(bbox) = self.bounding_box() {
            let min = bbox.min_x().min(bbox.min_y());
            let max = bbox.max_x().max(bbox.max_y());
            if min.is_infinite() || max.is_infinite() {
                return Err(Error::Infinity);
            }
        }
        Ok(())
    }
}

impl FromStr for GeoJson {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GeoJson::from_value(serde_json::from_str(s)?)
    }
}

impl TryFrom<Value> for GeoJson {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        GeoJson::from_value(value)
    }
}

fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
