//! Element attribute access and conversion.

use nalgebra::Vector3;

use crate::error::{Result, XodeError};

/// The attributes of one start tag, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Raw value of an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `name` attribute, used to register nodes.
    pub fn name(&self) -> Option<String> {
        self.get("name").map(str::to_string)
    }

    /// Required raw value.
    pub fn require(&self, element: &str, attribute: &'static str) -> Result<&str> {
        self.get(attribute)
            .ok_or_else(|| XodeError::missing_attribute(attribute, element))
    }

    /// Required number.
    pub fn f64(&self, element: &str, attribute: &'static str) -> Result<f64> {
        parse_f64(element, attribute, self.require(element, attribute)?)
    }

    /// Optional number.
    pub fn f64_opt(&self, element: &str, attribute: &'static str) -> Result<Option<f64>> {
        self.get(attribute)
            .map(|value| parse_f64(element, attribute, value))
            .transpose()
    }

    /// Number with a default for when the attribute is absent.
    pub fn f64_or(&self, element: &str, attribute: &'static str, default: f64) -> Result<f64> {
        Ok(self.f64_opt(element, attribute)?.unwrap_or(default))
    }

    /// Required integer.
    pub fn i32(&self, element: &str, attribute: &'static str) -> Result<i32> {
        parse_i32(element, attribute, self.require(element, attribute)?)
    }

    /// Integer with a default for when the attribute is absent.
    pub fn i32_or(&self, element: &str, attribute: &'static str, default: i32) -> Result<i32> {
        self.get(attribute)
            .map_or(Ok(default), |value| parse_i32(element, attribute, value))
    }

    /// Required non-negative integer.
    pub fn usize(&self, element: &str, attribute: &'static str) -> Result<usize> {
        let value = self.require(element, attribute)?;
        value.trim().parse().map_err(|_| {
            XodeError::invalid_attribute(attribute, element, "expected a non-negative integer")
        })
    }

    /// A vector from the required `x`, `y` and `z` attributes.
    pub fn vector3(&self, element: &str) -> Result<Vector3<f64>> {
        Ok(Vector3::new(
            self.f64(element, "x")?,
            self.f64(element, "y")?,
            self.f64(element, "z")?,
        ))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn parse_f64(element: &str, attribute: &'static str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse()
        .map_err(|_| XodeError::invalid_attribute(attribute, element, "expected a number"))
}

fn parse_i32(element: &str, attribute: &'static str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| XodeError::invalid_attribute(attribute, element, "expected an integer"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vector3() {
        let attrs: Attributes = [("x", "1.0"), ("y", " 2 "), ("z", "3e0")].into_iter().collect();
        let v = attrs.vector3("torque").expect("should parse");
        assert_relative_eq!(v, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_vector3_missing_component() {
        let attrs: Attributes = [("x", "1")].into_iter().collect();
        let err = attrs.vector3("torque").unwrap_err();
        assert!(matches!(
            err,
            XodeError::MissingAttribute { attribute: "y", .. }
        ));
    }

    #[test]
    fn test_vector3_not_a_number() {
        let attrs: Attributes = [("x", "1"), ("y", "two"), ("z", "3")].into_iter().collect();
        let err = attrs.vector3("force").unwrap_err();
        assert!(matches!(
            err,
            XodeError::InvalidAttribute { attribute: "y", .. }
        ));
    }

    #[test]
    fn test_defaults() {
        let attrs = Attributes::new();
        assert_relative_eq!(attrs.f64_or("transform", "scale", 1.0).unwrap(), 1.0);
        assert_eq!(attrs.i32_or("body", "gravitymode", 1).unwrap(), 1);
        assert_eq!(attrs.f64_opt("mass_shape", "density").unwrap(), None);
        assert_eq!(attrs.name(), None);
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let attrs: Attributes = [("mode", "1.5")].into_iter().collect();
        assert!(attrs.i32("finiteRotation", "mode").is_err());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let mut attrs = Attributes::new();
        attrs.insert("name", "a");
        attrs.insert("name", "b");
        assert_eq!(attrs.get("name"), Some("a"));
    }
}
