use super::input::{self, Shape, VectorInput};
use crate::error::{Result, VectorError};
use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::cell::Cell;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Which representations are currently valid. At least one always is.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Repr {
    Cartesian { x: f64, y: f64 },
    Polar { d: f64, a: f64 },
    Both { x: f64, y: f64, d: f64, a: f64 },
}

/// Angle is measured as `atan2(x, y)`, i.e. clockwise from the positive y axis.
fn polar_of(x: f64, y: f64) -> (f64, f64) {
    let a = x.atan2(y);
    let d = if x == 0.0 {
        y.abs()
    } else if y == 0.0 {
        x.abs()
    } else {
        (x * x + y * y).sqrt()
    };
    (d, a)
}

fn cartesian_of(d: f64, a: f64) -> (f64, f64) {
    (a.sin() * d, a.cos() * d)
}

/// A 2D vector readable and writable as cartesian `(x, y)` or polar `(d, a)`.
///
/// Writes go to the representation owning the field and invalidate the other
/// one; reads derive a missing representation on demand and cache it. The
/// cache lives in a `Cell`, so a vector can be shared between threads only
/// behind external synchronisation.
#[derive(Debug, Clone)]
pub struct Vector2D {
    repr: Cell<Repr>,
}

impl Vector2D {
    /// Number of indexable components.
    pub const LENGTH: usize = 2;

    pub fn new(x: f64, y: f64) -> Self {
        Self::from_repr(Repr::Cartesian { x, y })
    }

    pub fn from_polar(d: f64, a: f64) -> Self {
        Self::from_repr(Repr::Polar { d, a })
    }

    fn from_repr(repr: Repr) -> Self {
        Self {
            repr: Cell::new(repr),
        }
    }

    /// Lenient constructor over dynamic arguments.
    ///
    /// Takes `args[0]` as `x` and `args[1]` as `y`; anything missing or
    /// non-numeric becomes 0. Never fails.
    pub fn from_args(args: &[Value]) -> Self {
        Self::new(
            input::number_or_zero(args.first()),
            input::number_or_zero(args.get(1)),
        )
    }

    /// Strict coercion from any supported input shape.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidArgument`] when the input matches none of
    /// the recognised shapes.
    pub fn coerce(input: impl Into<VectorInput>) -> Result<Self> {
        input.into().shape().map(Self::from_shape)
    }

    /// Strict coercion from an object or array.
    ///
    /// Recognised forms, tried in order: `{x, y}`, `{d, a}`, `{left, top}`,
    /// `[x, y]` (or `{"0", "1"}`), `{width, height}`. The polar form keeps
    /// polar storage; everything else is stored as cartesian.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::InvalidArgument`] for any other value.
    pub fn from_object(value: &Value) -> Result<Self> {
        input::shape_of(value).map(Self::from_shape)
    }

    fn from_shape(shape: Shape) -> Self {
        match shape {
            Shape::Cartesian { x, y } => Self::new(x, y),
            Shape::Polar { d, a } => Self::from_polar(d, a),
        }
    }

    fn cached_cartesian(&self) -> Option<(f64, f64)> {
        match self.repr.get() {
            Repr::Cartesian { x, y } | Repr::Both { x, y, .. } => Some((x, y)),
            Repr::Polar { .. } => None,
        }
    }

    fn cached_polar(&self) -> Option<(f64, f64)> {
        match self.repr.get() {
            Repr::Polar { d, a } | Repr::Both { d, a, .. } => Some((d, a)),
            Repr::Cartesian { .. } => None,
        }
    }

    fn cartesian(&self) -> (f64, f64) {
        match self.repr.get() {
            Repr::Cartesian { x, y } | Repr::Both { x, y, .. } => (x, y),
            Repr::Polar { d, a } => {
                let (x, y) = cartesian_of(d, a);
                log::trace!("Derived cartesian ({}, {}) from polar ({}, {})", x, y, d, a);
                self.repr.set(Repr::Both { x, y, d, a });
                (x, y)
            }
        }
    }

    fn polar(&self) -> (f64, f64) {
        match self.repr.get() {
            Repr::Polar { d, a } | Repr::Both { d, a, .. } => (d, a),
            Repr::Cartesian { x, y } => {
                let (d, a) = polar_of(x, y);
                log::trace!("Derived polar ({}, {}) from cartesian ({}, {})", d, a, x, y);
                self.repr.set(Repr::Both { x, y, d, a });
                (d, a)
            }
        }
    }

    pub fn x(&self) -> f64 {
        self.cartesian().0
    }

    pub fn y(&self) -> f64 {
        self.cartesian().1
    }

    /// Distance from the origin.
    pub fn d(&self) -> f64 {
        self.polar().0
    }

    /// Angle in radians.
    pub fn a(&self) -> f64 {
        self.polar().1
    }

    /// Index access: 0 is `x`, 1 is `y`.
    pub fn component(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.x()),
            1 => Some(self.y()),
            _ => None,
        }
    }

    // Writing a value equal to the cached one is a no-op. Otherwise the
    // written representation is completed (deriving it if necessary) and
    // replaces the whole state, dropping the other representation.

    pub fn set_x(&mut self, x: f64) {
        if matches!(self.cached_cartesian(), Some((cached, _)) if cached == x) {
            return;
        }
        let (_, y) = self.cartesian();
        self.repr.set(Repr::Cartesian { x, y });
    }

    pub fn set_y(&mut self, y: f64) {
        if matches!(self.cached_cartesian(), Some((_, cached)) if cached == y) {
            return;
        }
        let (x, _) = self.cartesian();
        self.repr.set(Repr::Cartesian { x, y });
    }

    pub fn set_d(&mut self, d: f64) {
        if matches!(self.cached_polar(), Some((cached, _)) if cached == d) {
            return;
        }
        let (_, a) = self.polar();
        self.repr.set(Repr::Polar { d, a });
    }

    pub fn set_a(&mut self, a: f64) {
        if matches!(self.cached_polar(), Some((_, cached)) if cached == a) {
            return;
        }
        let (d, _) = self.polar();
        self.repr.set(Repr::Polar { d, a });
    }

    /// Returns a new vector holding the cartesian sum.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, other: &Vector2D) -> Vector2D {
        Vector2D::new(self.x() + other.x(), self.y() + other.y())
    }

    /// Returns a new vector holding the cartesian difference.
    pub fn subtract(&self, other: &Vector2D) -> Vector2D {
        Vector2D::new(self.x() - other.x(), self.y() - other.y())
    }

    /// `add` with a dynamic operand built by [`Vector2D::from_args`].
    ///
    /// Non-numeric arguments are not rejected; they count as 0.
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::MissingArgument`] when `args` is empty.
    pub fn add_args(&self, args: &[Value]) -> Result<Vector2D> {
        if args.is_empty() {
            return Err(VectorError::MissingArgument("add"));
        }
        Ok(self.add(&Vector2D::from_args(args)))
    }

    /// `subtract` with a dynamic operand built by [`Vector2D::from_args`].
    ///
    /// # Errors
    ///
    /// Returns [`VectorError::MissingArgument`] when `args` is empty.
    pub fn subtract_args(&self, args: &[Value]) -> Result<Vector2D> {
        if args.is_empty() {
            return Err(VectorError::MissingArgument("subtract"));
        }
        Ok(self.subtract(&Vector2D::from_args(args)))
    }

    /// Exact cartesian comparison; an absent operand is never equal.
    pub fn equals(&self, other: Option<&Vector2D>) -> bool {
        other.is_some_and(|other| self.x() == other.x() && self.y() == other.y())
    }

    pub fn equals_args(&self, args: &[Value]) -> bool {
        !args.is_empty() && self.equals(Some(&Vector2D::from_args(args)))
    }

    pub fn to_cartesian(&self) -> [f64; 2] {
        let (x, y) = self.cartesian();
        [x, y]
    }

    pub fn to_polar(&self) -> [f64; 2] {
        let (d, a) = self.polar();
        [d, a]
    }
}

impl Default for Vector2D {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl PartialEq for Vector2D {
    fn eq(&self, other: &Self) -> bool {
        self.equals(Some(other))
    }
}

/// Formats one component the way `x,y` text is exchanged: negative zero prints
/// as `0`, magnitudes below `1e-6` or from `1e21` up use exponent form with an
/// explicit sign, and non-finite values print as `NaN` / `Infinity`.
fn format_component(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return n.to_string();
    }

    let exp = format!("{:e}", n);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}

impl fmt::Display for Vector2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.cartesian();
        write!(f, "{},{}", format_component(x), format_component(y))
    }
}

/// Parses either JSON in any strictly coercible shape or a plain `x,y` pair.
impl FromStr for Vector2D {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::coerce(s.parse::<VectorInput>()?)
    }
}

// Serialized as the plain cartesian pair
impl Serialize for Vector2D {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_cartesian().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vector2D {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_object(&value).map_err(de::Error::custom)
    }
}

// Addition
impl Add<&Vector2D> for &Vector2D {
    type Output = Vector2D;

    fn add(self, other: &Vector2D) -> Vector2D {
        Vector2D::add(self, other)
    }
}

// Subtraction
impl Sub<&Vector2D> for &Vector2D {
    type Output = Vector2D;

    fn sub(self, other: &Vector2D) -> Vector2D {
        self.subtract(other)
    }
}

// Conversion from (f64, f64)
impl From<(f64, f64)> for Vector2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

// Conversion from (i32, i32)
impl From<(i32, i32)> for Vector2D {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x as f64, y as f64)
    }
}

impl From<[f64; 2]> for Vector2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<&Vector2D> for [f64; 2] {
    fn from(vector: &Vector2D) -> Self {
        vector.to_cartesian()
    }
}

impl TryFrom<&Value> for Vector2D {
    type Error = VectorError;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::f64::consts::PI;

    fn round(n: f64) -> f64 {
        (n * 1e12).round() / 1e12
    }

    #[test]
    fn test_creation() {
        assert_eq!(Vector2D::default().to_string(), "0,0");
        assert_eq!(Vector2D::new(1.0, 2.0).to_string(), "1,2");
        assert_eq!(Vector2D::new(1.5, -2.25).to_cartesian(), [1.5, -2.25]);
        assert_eq!(Vector2D::coerce(VectorInput::Empty).unwrap().to_cartesian(), [0.0, 0.0]);
        assert_eq!(Vector2D::coerce((3.0, 4.0)).unwrap().to_cartesian(), [3.0, 4.0]);
        assert_eq!(Vector2D::from((1_i32, 2_i32)).to_cartesian(), [1.0, 2.0]);
        assert_eq!(Vector2D::from([5.0, 6.0]).to_cartesian(), [5.0, 6.0]);
    }

    #[test]
    fn test_from_object() {
        let expected = Vector2D::new(1.0, 2.0);
        for value in [
            json!({"x": 1, "y": 2}),
            json!([1, 2]),
            json!({"left": 1, "top": 2}),
            json!({"width": 1, "height": 2}),
        ] {
            let v = Vector2D::from_object(&value).unwrap();
            assert_eq!(v, expected, "input: {}", value);
        }

        let polar = Vector2D::from_object(&json!({"d": 2, "a": 1})).unwrap();
        assert!(matches!(polar.repr.get(), Repr::Polar { .. }));
        assert_eq!(polar.to_polar(), [2.0, 1.0]);
        assert!((polar.x() - 1.682941969615793).abs() < 1e-12);
        assert!((polar.y() - 1.0806046117362795).abs() < 1e-12);

        let err = Vector2D::from_object(&json!({"foo": 9})).unwrap_err();
        assert!(matches!(err, VectorError::InvalidArgument(_)));
        assert!(Vector2D::coerce(json!("hello")).is_err());
    }

    #[test]
    fn test_lazy_reads_of_origin() {
        let v = Vector2D::default();
        assert_eq!(v.y(), 0.0);
        assert_eq!(v.x(), 0.0);
        assert_eq!(v.a(), 0.0);
        assert_eq!(v.d(), 0.0);
    }

    #[test]
    fn test_mutations() {
        let mut v = Vector2D::new(0.0, 0.0);

        v.set_y(1.0);
        assert_eq!(v.y(), 1.0);
        assert_eq!(v.x(), 0.0);
        assert_eq!(v.a(), 0.0);
        assert_eq!(v.d(), 1.0);

        v.set_d(2.0);
        assert_eq!(v.y(), 2.0);
        assert_eq!(v.x(), 0.0);
        assert_eq!(v.a(), 0.0);
        assert_eq!(v.d(), 2.0);

        v.set_a(PI / 2.0);
        assert_eq!(round(v.y()), 0.0);
        assert_eq!(round(v.x()), 2.0);
        assert_eq!(v.a(), PI / 2.0);
        assert_eq!(v.d(), 2.0);

        v.set_a(PI);
        v.set_x(3.0);
        v.set_y(-4.0);
        assert_eq!(v.x(), 3.0);
        assert_eq!(v.y(), -4.0);
        assert_eq!(v.a(), 3.0_f64.atan2(-4.0));
        assert_eq!(v.d(), 5.0);
    }

    #[test]
    fn test_write_completes_representation_from_polar() {
        // y must come from the polar data, not default to 0
        let mut v = Vector2D::from_polar(2.0, 0.0);
        v.set_x(1.0);
        assert_eq!(v.repr.get(), Repr::Cartesian { x: 1.0, y: 2.0 });
        assert_eq!(v.to_cartesian(), [1.0, 2.0]);

        let mut v = Vector2D::new(0.0, 3.0);
        v.set_a(PI);
        assert_eq!(v.d(), 3.0);
        assert!((v.y() + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_write_invalidates_other_representation() {
        let mut v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.d(), 5.0);
        assert!(matches!(v.repr.get(), Repr::Both { .. }));

        v.set_x(0.0);
        assert_eq!(v.repr.get(), Repr::Cartesian { x: 0.0, y: 4.0 });
        assert_eq!(v.d(), 4.0);

        v.set_d(8.0);
        assert!(matches!(v.repr.get(), Repr::Polar { .. }));
        assert_eq!(v.y(), 8.0);
    }

    #[test]
    fn test_idempotent_writes() {
        let mut v = Vector2D::new(3.0, 4.0);
        let [d, a] = v.to_polar();

        for _ in 0..100 {
            v.set_x(3.0);
            v.set_y(4.0);
            let current = v.d();
            v.set_d(current);
            let current = v.a();
            v.set_a(current);
        }

        assert_eq!(v.repr.get(), Repr::Both { x: 3.0, y: 4.0, d, a });
        assert_eq!(v.d().to_bits(), d.to_bits());
        assert_eq!(v.a().to_bits(), a.to_bits());

        // Polar source stays exact under no-op cartesian writes
        let mut v = Vector2D::from_polar(2.0, 1.0);
        for _ in 0..100 {
            let x = v.x();
            v.set_x(x);
        }
        assert_eq!(v.to_polar(), [2.0, 1.0]);
    }

    #[test]
    fn test_round_trip() {
        let values = [-7.5, -1.0, -0.25, 0.0, 0.5, 2.0, 13.0, 1e6];

        for &x in &values {
            for &y in &values {
                if x == 0.0 && y == 0.0 {
                    continue;
                }
                let [d, a] = Vector2D::new(x, y).to_polar();
                let back = Vector2D::from_polar(d, a);
                let eps = 1e-9 * d.max(1.0);
                assert!((back.x() - x).abs() < eps, "x mismatch for ({}, {})", x, y);
                assert!((back.y() - y).abs() < eps, "y mismatch for ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_polar_formulas() {
        // Angle is atan2(x, y), not atan2(y, x)
        let v = Vector2D::new(1.0, 0.0);
        assert_eq!(v.a(), PI / 2.0);
        assert_eq!(v.d(), 1.0);

        let v = Vector2D::new(0.0, -2.0);
        assert_eq!(v.a(), PI);
        assert_eq!(v.d(), 2.0);

        let v = Vector2D::new(-6.0, 0.0);
        assert_eq!(v.d(), 6.0);
    }

    #[test]
    fn test_components() {
        let v = Vector2D::from_polar(1.0, PI / 2.0);
        assert_eq!(v.component(0), Some(v.x()));
        assert_eq!(v.component(1), Some(v.y()));
        assert_eq!(v.component(2), None);
        assert_eq!(Vector2D::LENGTH, 2);
    }

    #[test]
    fn test_operations() {
        let v1 = Vector2D::new(1.0, 2.0);
        let v2 = Vector2D::new(3.0, 4.0);

        let sum = v1.add(&v2);
        assert_eq!(sum.to_cartesian(), [4.0, 6.0]);
        assert!(!std::ptr::eq(&sum, &v1));
        assert!(!std::ptr::eq(&sum, &v2));
        assert_eq!(v1.to_cartesian(), [1.0, 2.0]);
        assert_eq!(v2.to_cartesian(), [3.0, 4.0]);

        assert_eq!(v2.subtract(&v1).to_cartesian(), [2.0, 2.0]);
        assert_eq!((&v1 + &v2).to_cartesian(), [4.0, 6.0]);
        assert_eq!((&v2 - &v1).to_cartesian(), [2.0, 2.0]);

        // Polar operands are summed through their cartesian form
        let polar = Vector2D::from_polar(2.0, 0.0);
        assert_eq!(polar.add(&v1).to_cartesian(), [1.0, 4.0]);
    }

    #[test]
    fn test_dynamic_operands() {
        let v = Vector2D::new(1.0, 1.0);

        assert_eq!(v.add_args(&[json!(2), json!(3)]).unwrap().to_cartesian(), [3.0, 4.0]);
        assert_eq!(
            v.subtract_args(&[json!(1), json!(1)]).unwrap().to_cartesian(),
            [0.0, 0.0]
        );

        assert_eq!(v.add_args(&[]).unwrap_err(), VectorError::MissingArgument("add"));
        assert_eq!(
            v.subtract_args(&[]).unwrap_err(),
            VectorError::MissingArgument("subtract")
        );

        // Garbage coerces to zero rather than failing
        assert_eq!(v.add_args(&[json!("string")]).unwrap().to_cartesian(), [1.0, 1.0]);
        assert_eq!(v.subtract_args(&[json!(2)]).unwrap().to_cartesian(), [-1.0, 1.0]);
        assert_eq!(Vector2D::from_args(&[json!(null), json!(4)]).to_cartesian(), [0.0, 4.0]);
    }

    #[test]
    fn test_equals() {
        assert!(Vector2D::new(1.0, 1.0).equals(Some(&Vector2D::new(1.0, 1.0))));
        assert!(!Vector2D::new(0.0, 0.0).equals(Some(&Vector2D::new(1.0, 1.0))));
        assert!(!Vector2D::new(0.0, 0.0).equals(None));
        assert_eq!(Vector2D::default(), Vector2D::new(0.0, 0.0));

        assert!(Vector2D::new(2.0, 5.0).equals_args(&[json!(2), json!(5)]));
        assert!(!Vector2D::new(0.0, 0.0).equals_args(&[]));
        assert!(Vector2D::new(0.0, 0.0).equals_args(&[json!("string")]));
    }

    #[test]
    fn test_display_edge_values() {
        assert_eq!(Vector2D::new(-0.0, 0.0).to_string(), "0,0");
        assert_eq!(Vector2D::from_polar(2.0, PI).to_string(), "2.4492935982947064e-16,-2");
        assert_eq!(Vector2D::new(1e21, 1.5e-7).to_string(), "1e+21,1.5e-7");
        assert_eq!(Vector2D::new(-2.5e22, 0.000001).to_string(), "-2.5e+22,0.000001");
        assert_eq!(Vector2D::new(f64::NAN, f64::NEG_INFINITY).to_string(), "NaN,-Infinity");

        // edge output parses back to the same vector
        let v = Vector2D::new(1e21, -3.25e-9);
        assert_eq!(v.to_string().parse::<Vector2D>().unwrap(), v);
    }

    #[test]
    fn test_to_polar() {
        let v = Vector2D::new(3.0, 4.0);
        assert_eq!(v.to_polar(), [5.0, 3.0_f64.atan2(4.0)]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("1,2".parse::<Vector2D>().unwrap(), Vector2D::new(1.0, 2.0));
        assert_eq!(" -1.5 , 3 ".parse::<Vector2D>().unwrap(), Vector2D::new(-1.5, 3.0));
        assert_eq!(
            r#"{"left": 4, "top": 5}"#.parse::<Vector2D>().unwrap(),
            Vector2D::new(4.0, 5.0)
        );
        assert_eq!("[7, 8]".parse::<Vector2D>().unwrap(), Vector2D::new(7.0, 8.0));

        let polar: Vector2D = r#"{"d": 2, "a": 0}"#.parse().unwrap();
        assert_eq!(polar.to_polar(), [2.0, 0.0]);

        assert!("invalid".parse::<Vector2D>().is_err());
        assert!("1,x".parse::<Vector2D>().is_err());
        assert!(r#"{"foo": 9}"#.parse::<Vector2D>().is_err());
        assert!("{not json".parse::<Vector2D>().is_err());
    }

    #[test]
    fn test_serde() {
        let v = Vector2D::new(4.0, 6.0);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[4.0,6.0]");
        assert_eq!(serde_json::to_value(&v).unwrap(), json!([4.0, 6.0]));

        let back: Vector2D = serde_json::from_str("[4.0,6.0]").unwrap();
        assert_eq!(back, v);

        let sized: Vector2D = serde_json::from_str(r#"{"width": 4, "height": 6}"#).unwrap();
        assert_eq!(sized, v);

        assert!(serde_json::from_str::<Vector2D>(r#"{"foo": 9}"#).is_err());
        assert!(Vector2D::try_from(&json!({"x": 1})).is_err());
    }
}
