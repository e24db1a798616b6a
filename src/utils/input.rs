use crate::error::{Result, VectorError};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Raw material a vector can be coerced from.
///
/// `Value` carries anything dynamic: objects using one of the recognised
/// field-naming conventions, arrays, or garbage that coercion will reject.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorInput {
    /// No arguments at all; coerces to the origin.
    Empty,
    /// An explicit `(x, y)` pair.
    Pair(f64, f64),
    Value(Value),
}

/// A recognised input, reduced to the representation it names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Shape {
    Cartesian { x: f64, y: f64 },
    Polar { d: f64, a: f64 },
}

/// Object field pairs in the order they are tried; the flag marks polar pairs.
const OBJECT_SHAPES: [(&str, &str, bool); 5] = [
    ("x", "y", false),
    ("d", "a", true),
    ("left", "top", false),
    ("0", "1", false),
    ("width", "height", false),
];

impl VectorInput {
    pub(crate) fn shape(&self) -> Result<Shape> {
        match self {
            VectorInput::Empty => Ok(Shape::Cartesian { x: 0.0, y: 0.0 }),
            VectorInput::Pair(x, y) => Ok(Shape::Cartesian { x: *x, y: *y }),
            VectorInput::Value(value) => shape_of(value),
        }
    }
}

pub(crate) fn shape_of(value: &Value) -> Result<Shape> {
    let shape = match value {
        Value::Object(fields) => object_shape(fields),
        Value::Array(items) => match (number(items.first()), number(items.get(1))) {
            (Some(x), Some(y)) => Some(Shape::Cartesian { x, y }),
            _ => None,
        },
        _ => {
            log::debug!("Rejecting non-object vector input: {}", value);
            return Err(VectorError::InvalidArgument(format!(
                "expected an object or array, got: {}",
                value
            )));
        }
    };

    shape.ok_or_else(|| {
        log::debug!("No vector properties found in: {}", value);
        VectorError::InvalidArgument(format!(
            "object has no vector properties: {}",
            value
        ))
    })
}

fn object_shape(fields: &Map<String, Value>) -> Option<Shape> {
    OBJECT_SHAPES.iter().find_map(|&(first, second, polar)| {
        let first = number(fields.get(first))?;
        let second = number(fields.get(second))?;
        Some(if polar {
            Shape::Polar { d: first, a: second }
        } else {
            Shape::Cartesian { x: first, y: second }
        })
    })
}

fn number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

/// Lenient coercion of a single argument: anything that is not a number is 0.
pub(crate) fn number_or_zero(value: Option<&Value>) -> f64 {
    number(value).unwrap_or(0.0)
}

impl From<(f64, f64)> for VectorInput {
    fn from((x, y): (f64, f64)) -> Self {
        VectorInput::Pair(x, y)
    }
}

impl From<Value> for VectorInput {
    fn from(value: Value) -> Self {
        VectorInput::Value(value)
    }
}

impl From<Option<Value>> for VectorInput {
    fn from(value: Option<Value>) -> Self {
        value.map_or(VectorInput::Empty, VectorInput::Value)
    }
}

/// `x,y` becomes a [`VectorInput::Pair`]; text starting with `{` or `[` is
/// read as JSON. The shape itself is only checked on coercion.
impl FromStr for VectorInput {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with('{') || s.starts_with('[') {
            return serde_json::from_str(s)
                .map(VectorInput::Value)
                .map_err(|e| VectorError::InvalidArgument(format!("{}: {}", s, e)));
        }

        let (x, y) = s.split_once(',').ok_or_else(|| {
            VectorError::InvalidArgument(format!("expected x,y, got: {}", s))
        })?;
        let x: f64 = x
            .trim()
            .parse()
            .map_err(|_| VectorError::InvalidArgument(format!("Invalid x: {}", x)))?;
        let y: f64 = y
            .trim()
            .parse()
            .map_err(|_| VectorError::InvalidArgument(format!("Invalid y: {}", y)))?;

        Ok(VectorInput::Pair(x, y))
    }
}
