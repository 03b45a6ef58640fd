//! Classifying raw JSON values into GeoJSON kinds.
//!
//! These predicates look only at the `"type"` member; they don't check that
//! the rest of the object is well formed.

use serde_json::Value;

/// The nine kinds of GeoJSON object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `"Point"`
    Point,
    /// `"MultiPoint"`
    MultiPoint,
    /// `"LineString"`
    LineString,
    /// `"MultiLineString"`
    MultiLineString,
    /// `"Polygon"`
    Polygon,
    /// `"MultiPolygon"`
    MultiPolygon,
    /// `"GeometryCollection"`
    GeometryCollection,
    /// `"Feature"`
    Feature,
    /// `"FeatureCollection"`
    FeatureCollection,
}

impl Kind {
    /// All the kinds, in the order they're listed in RFC 7946.
    pub const ALL: [Kind; 9] = [
        Kind::Point,
        Kind::MultiPoint,
        Kind::LineString,
        Kind::MultiLineString,
        Kind::Polygon,
        Kind::MultiPolygon,
        Kind::GeometryCollection,
        Kind::Feature,
        Kind::FeatureCollection,
    ];

    /// The value of the `"type"` member for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Point => "Point",
            Kind::MultiPoint => "MultiPoint",
            Kind::LineString => "LineString",
            Kind::MultiLineString => "MultiLineString",
            Kind::Polygon => "Polygon",
            Kind::MultiPolygon => "MultiPolygon",
            Kind::GeometryCollection => "GeometryCollection",
            Kind::Feature => "Feature",
            Kind::FeatureCollection => "FeatureCollection",
        }
    }

    /// Classifies a JSON value, returning `None` if it isn't an object with a
    /// recognised `"type"`.
    pub fn of(value: &Value) -> Option<Kind> {
        let tag = value.as_object()?.get("type")?.as_str()?;
        Kind::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is(value: &Value, kind: Kind) -> bool {
    Kind::of(value) == Some(kind)
}

/// Is this a `Point`?
pub fn is_point(value: &Value) -> bool {
    is(value, Kind::Point)
}

/// Is this a `MultiPoint`?
pub fn is_multi_point(value: &Value) -> bool {
    is(value, Kind::MultiPoint)
}

/// Is this a `LineString`?
pub fn is_line_string(value: &Value) -> bool {
    is(value, Kind::LineString)
}

/// Is this a `MultiLineString`?
pub fn is_multi_line_string(value: &Value) -> bool {
    is(value, Kind::MultiLineString)
}

/// Is this a `Polygon`?
pub fn is_polygon(value: &Value) -> bool {
    is(value, Kind::Polygon)
}

/// Is this a `MultiPolygon`?
pub fn is_multi_polygon(value: &Value) -> bool {
    is(value, Kind::MultiPolygon)
}

/// Is this a `GeometryCollection`?
pub fn is_geometry_collection(value: &Value) -> bool {
    is(value, Kind::GeometryCollection)
}

/// Is this a `Feature`?
pub fn is_feature(value: &Value) -> bool {
    is(value, Kind::Feature)
}

/// Is this a `FeatureCollection`?
pub fn is_feature_collection(value: &Value) -> bool {
    is(value, Kind::FeatureCollection)
}
