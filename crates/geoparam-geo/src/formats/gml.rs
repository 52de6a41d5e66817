//! GML (Geography Markup Language) geometry reader
//!
//! Supports the GML 2 and GML 3 simple geometry elements. Namespace prefixes
//! are ignored, so `gml:Point` and `Point` read the same. The `srsName` of the
//! root element is reported as the embedded spatial reference; it is taken as
//! is, without any axis order handling.

use geo::{
    Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon, Rect,
};
use geoparam_core::error::{GeoparamError, Result};
use geoparam_core::models::Format;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::formats::{GeometryReader, SourceGeometry};

/// GML geometry reader
pub struct GmlReader;

impl GeometryReader for GmlReader {
    fn read(&self, data: &str) -> Result<SourceGeometry> {
        let root = parse_tree(data)?;
        let geometry = read_geometry(&root, srs_dimension(&root)?.unwrap_or(2))?;
        let srs = root.attribute("srsName").map(str::to_string);

        Ok(SourceGeometry { geometry, srs })
    }

    fn format(&self) -> Format {
        Format::Gml
    }
}

/// Deepest element nesting accepted in a document
const MAX_DEPTH: usize = 64;

fn malformed(reason: impl Into<String>) -> GeoparamError {
    GeoparamError::malformed(Format::Gml.name(), reason)
}

/// Minimal element tree built from the XML event stream
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        for attr in start.attributes() {
            let attr =
                attr.map_err(|e| malformed(format!("Invalid attribute in <{}>: {}", name, e)))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| malformed(format!("Invalid attribute value in <{}>: {}", name, e)))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a Element> {
        self.children
            .iter()
            .filter(move |c| names.contains(&c.name.as_str()))
    }
}

fn parse_tree(data: &str) -> Result<Element> {
    let mut reader = Reader::from_str(data);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if stack.len() >= MAX_DEPTH {
                    return Err(malformed(format!(
                        "GML nesting too deep (more than {} levels)",
                        MAX_DEPTH
                    )));
                }
                stack.push(Element::from_start(&start)?);
            }
            Ok(Event::Empty(start)) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| malformed("Unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| malformed(format!("Invalid text: {}", e)))?;
                if let Some(current) = stack.last_mut() {
                    push_text(current, &text);
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(current) = stack.last_mut() {
                    push_text(current, &String::from_utf8_lossy(&cdata));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "Failed to parse XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("Unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| malformed("Document has no geometry element"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(malformed("Multiple root elements"));
    }
    Ok(())
}

fn push_text(element: &mut Element, text: &str) {
    if !element.text.is_empty() {
        element.text.push(' ');
    }
    element.text.push_str(text);
}

/// `srsDimension` (or the GML 3.0 `dimension`) declared on an element
fn srs_dimension(element: &Element) -> Result<Option<usize>> {
    let Some(value) = element
        .attribute("srsDimension")
        .or_else(|| element.attribute("dimension"))
    else {
        return Ok(None);
    };

    match value.trim().parse::<usize>() {
        Ok(dim) if dim >= 2 => Ok(Some(dim)),
        _ => Err(malformed(format!("Invalid srsDimension: {}", value))),
    }
}

fn read_geometry(element: &Element, dim: usize) -> Result<Geometry<f64>> {
    let dim = srs_dimension(element)?.unwrap_or(dim);

    let geometry = match element.name.as_str() {
        "Point" => Geometry::Point(read_point(element, dim)?),
        "LineString" => Geometry::LineString(read_line_string(element, dim)?),
        "LinearRing" => Geometry::LineString(read_ring(element, dim)?),
        "Polygon" => Geometry::Polygon(read_polygon(element, dim)?),
        "MultiPoint" => {
            let points = members(element, &["pointMember", "pointMembers"])
                .map(|member| {
                    expect_name(member, &["Point"]).and_then(|m| read_point(m, dim))
                })
                .collect::<Result<Vec<_>>>()?;
            Geometry::MultiPoint(MultiPoint::new(points))
        }
        "MultiLineString" | "MultiCurve" => {
            let properties = ["lineStringMember", "curveMember", "curveMembers"];
            let lines = members(element, &properties)
                .map(|member| {
                    expect_name(member, &["LineString"]).and_then(|m| read_line_string(m, dim))
                })
                .collect::<Result<Vec<_>>>()?;
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        "MultiPolygon" | "MultiSurface" => {
            let properties = ["polygonMember", "surfaceMember", "surfaceMembers"];
            let polygons = members(element, &properties)
                .map(|member| {
                    expect_name(member, &["Polygon"]).and_then(|m| read_polygon(m, dim))
                })
                .collect::<Result<Vec<_>>>()?;
            Geometry::MultiPolygon(MultiPolygon::new(polygons))
        }
        "MultiGeometry" => {
            let geometries = members(element, &["geometryMember", "geometryMembers"])
                .map(|member| read_geometry(member, dim))
                .collect::<Result<Vec<_>>>()?;
            Geometry::GeometryCollection(geometries.into_iter().collect())
        }
        "Box" | "Envelope" => Geometry::Polygon(read_envelope(element, dim)?.to_polygon()),
        other => return Err(malformed(format!("Unsupported GML geometry element: {}", other))),
    };

    Ok(geometry)
}

/// Geometries held by the member properties of a multi geometry
fn members<'a>(
    element: &'a Element,
    properties: &'a [&'a str],
) -> impl Iterator<Item = &'a Element> {
    element
        .children_named(properties)
        .flat_map(|property| property.children.iter())
}

fn expect_name<'a>(element: &'a Element, names: &[&str]) -> Result<&'a Element> {
    if names.contains(&element.name.as_str()) {
        Ok(element)
    } else {
        Err(malformed(format!(
            "Unexpected member <{}>, expected {}",
            element.name,
            names.join(" or ")
        )))
    }
}

fn read_point(element: &Element, dim: usize) -> Result<Point<f64>> {
    let coords = read_coords(element, dim)?;
    match coords.as_slice() {
        [coord] => Ok(Point::from(*coord)),
        _ => Err(malformed(format!(
            "Point must have exactly one position, found {}",
            coords.len()
        ))),
    }
}

fn read_line_string(element: &Element, dim: usize) -> Result<LineString<f64>> {
    let coords = read_coords(element, dim)?;
    if coords.len() < 2 {
        return Err(malformed(format!(
            "LineString must have at least 2 positions, found {}",
            coords.len()
        )));
    }
    Ok(LineString::new(coords))
}

fn read_ring(element: &Element, dim: usize) -> Result<LineString<f64>> {
    let coords = read_coords(element, dim)?;
    if coords.len() < 3 {
        return Err(malformed(format!(
            "LinearRing must have at least 3 positions, found {}",
            coords.len()
        )));
    }
    Ok(LineString::new(coords))
}

/// Ring held by an `exterior`/`interior` (GML 3) or boundary (GML 2) property
fn read_boundary(property: &Element, dim: usize) -> Result<LineString<f64>> {
    let ring = property
        .child("LinearRing")
        .ok_or_else(|| malformed(format!("<{}> must contain a LinearRing", property.name)))?;
    read_ring(ring, srs_dimension(ring)?.unwrap_or(dim))
}

fn read_polygon(element: &Element, dim: usize) -> Result<Polygon<f64>> {
    let exterior = element
        .children_named(&["exterior", "outerBoundaryIs"])
        .next()
        .ok_or_else(|| malformed("Polygon has no exterior ring"))?;
    let exterior = read_boundary(exterior, dim)?;

    let interiors = element
        .children_named(&["interior", "innerBoundaryIs"])
        .map(|property| read_boundary(property, dim))
        .collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

fn read_envelope(element: &Element, dim: usize) -> Result<Rect<f64>> {
    let corners = (element.child("lowerCorner"), element.child("upperCorner"));
    if let (Some(lower), Some(upper)) = corners {
        return Ok(Rect::new(read_position(lower)?, read_position(upper)?));
    }

    let coords = read_coords(element, dim)?;
    match coords.as_slice() {
        [lower, upper] => Ok(Rect::new(*lower, *upper)),
        _ => Err(malformed(format!(
            "<{}> must have exactly two corners, found {}",
            element.name,
            coords.len()
        ))),
    }
}

/// Coordinates of a geometry element, whichever GML encoding carries them
fn read_coords(element: &Element, dim: usize) -> Result<Vec<Coord<f64>>> {
    if let Some(pos_list) = element.child("posList") {
        let dim = srs_dimension(pos_list)?.unwrap_or(dim);
        let values = parse_numbers(&pos_list.text)?;
        if values.len() % dim != 0 {
            return Err(malformed(format!(
                "posList has {} values, not a multiple of dimension {}",
                values.len(),
                dim
            )));
        }
        return Ok(values
            .chunks(dim)
            .map(|c| Coord { x: c[0], y: c[1] })
            .collect());
    }

    if let Some(coordinates) = element.child("coordinates") {
        return parse_coordinates(coordinates);
    }

    let positions: Vec<&Element> = element.children_named(&["pos"]).collect();
    if !positions.is_empty() {
        return positions.into_iter().map(read_position).collect();
    }

    let coords: Vec<&Element> = element.children_named(&["coord"]).collect();
    if !coords.is_empty() {
        return coords.into_iter().map(read_coord).collect();
    }

    element
        .children_named(&["pointProperty", "pointRep"])
        .filter_map(|property| property.child("Point"))
        .map(|point| read_point(point, dim).map(|p| p.0))
        .collect()
}

/// Single `pos`, `lowerCorner` or `upperCorner`; extra ordinates are dropped
fn read_position(element: &Element) -> Result<Coord<f64>> {
    match parse_numbers(&element.text)?.as_slice() {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(malformed(format!("<{}> needs at least two ordinates", element.name))),
    }
}

/// GML 2 `<coord><X/><Y/></coord>`
fn read_coord(element: &Element) -> Result<Coord<f64>> {
    let ordinate = |name: &str| -> Result<f64> {
        let child = element
            .child(name)
            .ok_or_else(|| malformed(format!("<coord> has no {}", name)))?;
        parse_number(&child.text)
    };
    Ok(Coord {
        x: ordinate("X")?,
        y: ordinate("Y")?,
    })
}

/// GML 2 `<coordinates>` honouring the `cs`, `ts` and `decimal` attributes
fn parse_coordinates(element: &Element) -> Result<Vec<Coord<f64>>> {
    let cs = element.attribute("cs").unwrap_or(",");
    let ts = element.attribute("ts").unwrap_or(" ");
    let decimal = element.attribute("decimal").unwrap_or(".");

    let tuples: Vec<&str> = if ts.trim().is_empty() {
        element.text.split_whitespace().collect()
    } else {
        element
            .text
            .split(ts)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    };

    tuples
        .into_iter()
        .map(|tuple| {
            let values = tuple
                .split(cs)
                .map(|v| {
                    if decimal == "." {
                        parse_number(v)
                    } else {
                        parse_number(&v.replace(decimal, "."))
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            match values.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(malformed(format!(
                    "Coordinate tuple '{}' needs two ordinates",
                    tuple
                ))),
            }
        })
        .collect()
}

fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace().map(parse_number).collect()
}

fn parse_number(text: &str) -> Result<f64> {
    let text = text.trim();
    text.parse()
        .map_err(|_| malformed(format!("Invalid number: '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoparam_core::error::ErrorKind;

    fn read(data: &str) -> SourceGeometry {
        GmlReader.read(data).unwrap()
    }

    #[test]
    fn test_point_pos() {
        let source = read(
            r#"<gml:Point xmlns:gml="http://www.opengis.net/gml" srsName="EPSG:4326">
                <gml:pos>1.0 2.0</gml:pos>
            </gml:Point>"#,
        );
        assert_eq!(source.geometry, Geometry::Point(Point::new(1.0, 2.0)));
        assert_eq!(source.srs.as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn test_point_gml2_coordinates() {
        let source = read(
            r#"<gml:Point xmlns:gml="http://www.opengis.net/gml">
                <gml:coordinates>10,20</gml:coordinates>
            </gml:Point>"#,
        );
        assert_eq!(source.geometry, Geometry::Point(Point::new(10.0, 20.0)));
        assert!(source.srs.is_none());
    }

    #[test]
    fn test_point_gml2_coord() {
        let source = read("<Point><coord><X>3</X><Y>4</Y></coord></Point>");
        assert_eq!(source.geometry, Geometry::Point(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_line_string_pos_list() {
        let source = read(
            r#"<gml:LineString xmlns:gml="http://www.opengis.net/gml">
                <gml:posList>0 0 10 0 10 10</gml:posList>
            </gml:LineString>"#,
        );
        let Geometry::LineString(line) = source.geometry else {
            panic!("Expected LineString geometry");
        };
        assert_eq!(line.0.len(), 3);
        assert_eq!(line.0[2], Coord { x: 10.0, y: 10.0 });
    }

    #[test]
    fn test_pos_list_with_3d_dimension() {
        let source = read(
            r#"<gml:LineString xmlns:gml="http://www.opengis.net/gml" srsDimension="3">
                <gml:posList>0 0 5 1 1 5</gml:posList>
            </gml:LineString>"#,
        );
        let Geometry::LineString(line) = source.geometry else {
            panic!("Expected LineString geometry");
        };
        assert_eq!(
            line.0,
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }]
        );
    }

    #[test]
    fn test_coordinates_custom_separators() {
        let source = read(
            r#"<LineString>
                <coordinates cs=" " ts=";" decimal=",">0,5 1,5;2,5 3,5</coordinates>
            </LineString>"#,
        );
        let Geometry::LineString(line) = source.geometry else {
            panic!("Expected LineString geometry");
        };
        assert_eq!(
            line.0,
            vec![Coord { x: 0.5, y: 1.5 }, Coord { x: 2.5, y: 3.5 }]
        );
    }

    #[test]
    fn test_polygon_with_hole() {
        let source = read(
            r#"<gml:Polygon xmlns:gml="http://www.opengis.net/gml">
                <gml:exterior><gml:LinearRing>
                    <gml:posList>0 0 20 0 20 20 0 20 0 0</gml:posList>
                </gml:LinearRing></gml:exterior>
                <gml:interior><gml:LinearRing>
                    <gml:posList>5 5 15 5 15 15 5 15 5 5</gml:posList>
                </gml:LinearRing></gml:interior>
            </gml:Polygon>"#,
        );
        let Geometry::Polygon(polygon) = source.geometry else {
            panic!("Expected Polygon geometry");
        };
        assert_eq!(polygon.exterior().0.len(), 5);
        assert_eq!(polygon.interiors().len(), 1);
    }

    #[test]
    fn test_gml2_polygon() {
        let source = read(
            r#"<gml:Polygon xmlns:gml="http://www.opengis.net/gml"
                    srsName="http://www.opengis.net/gml/srs/epsg.xml#4326">
                <gml:outerBoundaryIs><gml:LinearRing>
                    <gml:coordinates>0,0 1,0 1,1 0,1 0,0</gml:coordinates>
                </gml:LinearRing></gml:outerBoundaryIs>
            </gml:Polygon>"#,
        );
        assert!(matches!(source.geometry, Geometry::Polygon(_)));
        assert_eq!(
            source.srs.as_deref(),
            Some("http://www.opengis.net/gml/srs/epsg.xml#4326")
        );
    }

    #[test]
    fn test_multi_point() {
        let source = read(
            r#"<gml:MultiPoint xmlns:gml="http://www.opengis.net/gml">
                <gml:pointMember><gml:Point><gml:pos>1 1</gml:pos></gml:Point></gml:pointMember>
                <gml:pointMember><gml:Point><gml:pos>2 2</gml:pos></gml:Point></gml:pointMember>
            </gml:MultiPoint>"#,
        );
        let Geometry::MultiPoint(points) = source.geometry else {
            panic!("Expected MultiPoint geometry");
        };
        assert_eq!(points.0.len(), 2);
    }

    #[test]
    fn test_multi_surface() {
        let source = read(
            r#"<gml:MultiSurface xmlns:gml="http://www.opengis.net/gml">
                <gml:surfaceMember><gml:Polygon><gml:exterior><gml:LinearRing>
                    <gml:posList>0 0 5 0 5 5 0 0</gml:posList>
                </gml:LinearRing></gml:exterior></gml:Polygon></gml:surfaceMember>
                <gml:surfaceMember><gml:Polygon><gml:exterior><gml:LinearRing>
                    <gml:posList>10 10 15 10 15 15 10 10</gml:posList>
                </gml:LinearRing></gml:exterior></gml:Polygon></gml:surfaceMember>
            </gml:MultiSurface>"#,
        );
        let Geometry::MultiPolygon(polygons) = source.geometry else {
            panic!("Expected MultiPolygon geometry");
        };
        assert_eq!(polygons.0.len(), 2);
    }

    #[test]
    fn test_multi_geometry() {
        let source = read(
            r#"<MultiGeometry>
                <geometryMember><Point><pos>1 2</pos></Point></geometryMember>
                <geometryMember><LineString><posList>0 0 1 1</posList></LineString></geometryMember>
            </MultiGeometry>"#,
        );
        let Geometry::GeometryCollection(collection) = source.geometry else {
            panic!("Expected GeometryCollection geometry");
        };
        assert_eq!(collection.0.len(), 2);
    }

    #[test]
    fn test_envelope() {
        let source = read(
            r#"<gml:Envelope xmlns:gml="http://www.opengis.net/gml" srsName="EPSG:3857">
                <gml:lowerCorner>1 5</gml:lowerCorner>
                <gml:upperCorner>3 9</gml:upperCorner>
            </gml:Envelope>"#,
        );
        let Geometry::Polygon(polygon) = source.geometry else {
            panic!("Expected Polygon geometry");
        };
        assert!(polygon.exterior().0.contains(&Coord { x: 3.0, y: 9.0 }));
    }

    #[test]
    fn test_malformed_xml() {
        let err = GmlReader
            .read("<gml:Point><gml:pos>1 2</gml:Point>")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("gml"));
    }

    #[test]
    fn test_empty_document() {
        assert!(GmlReader.read("").is_err());
        assert!(GmlReader.read("   ").is_err());
    }

    #[test]
    fn test_unsupported_element() {
        let err = GmlReader.read("<gml:Curve/>").unwrap_err();
        assert!(err.to_string().contains("Curve"));
    }

    #[test]
    fn test_point_without_position() {
        assert!(GmlReader.read("<gml:Point></gml:Point>").is_err());
    }

    #[test]
    fn test_invalid_number() {
        assert!(GmlReader.read("<Point><pos>1 abc</pos></Point>").is_err());
    }

    #[test]
    fn test_pos_list_dimension_mismatch() {
        assert!(GmlReader
            .read(r#"<LineString srsDimension="3"><posList>0 0 1 1</posList></LineString>"#)
            .is_err());
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let depth = 5000;
        let data = format!(
            "{}<Point><pos>1 2</pos></Point>{}",
            "<MultiGeometry><geometryMember>".repeat(depth),
            "</geometryMember></MultiGeometry>".repeat(depth)
        );
        let err = GmlReader.read(&data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        assert!(err.to_string().contains("nesting too deep"));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let depth = 10;
        let data = format!(
            "{}<Point><pos>1 2</pos></Point>{}",
            "<MultiGeometry><geometryMember>".repeat(depth),
            "</geometryMember></MultiGeometry>".repeat(depth)
        );
        assert!(matches!(read(&data).geometry, Geometry::GeometryCollection(_)));
    }
}
