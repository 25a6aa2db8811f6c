//! Registry of custom object types the decoder may construct.
//!
//! Decoding never instantiates a type it has not been told about: a tagged
//! object whose `(class, module)` pair is not registered is rejected with
//! `DecodeError::UnknownType`.

use crate::model::value::{Fields, ObjectRef, Value};
use crate::utils::error::DecodeError;
use std::collections::HashMap;
use std::fmt;

/// A Rust type that can be stored as a custom object
///
/// **Public** - implement this to persist domain objects inside events
pub trait Record: Sized {
    const CLASS: &'static str;
    const MODULE: &'static str;

    /// Public attributes of this value
    fn to_fields(&self) -> Fields;

    /// Rebuild a value from decoded attributes
    ///
    /// # Errors
    /// * `DecodeError::InvalidAttribute` - missing or ill-typed attribute
    fn from_fields(fields: &Fields) -> Result<Self, DecodeError>;

    /// Wrap this value as a custom object
    fn to_value(&self) -> Value {
        Value::Object(ObjectRef::new(Self::CLASS, Self::MODULE, self.to_fields()))
    }
}

/// Type identity of a custom object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub class: String,
    pub module: String,
}

impl TypeTag {
    pub fn new(class: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            module: module.into(),
        }
    }
}

type Validator = fn(&Fields) -> Result<(), DecodeError>;

/// Explicit set of decodable custom types
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeTag, Validator>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a `Record` type; its attributes are validated on decode
    pub fn register<T: Record>(&mut self) -> &mut Self {
        self.types
            .insert(TypeTag::new(T::CLASS, T::MODULE), |fields| T::from_fields(fields).map(|_| ()));
        self
    }

    /// Allow a type by tag only, accepting any attributes
    pub fn register_open(&mut self, class: impl Into<String>, module: impl Into<String>) -> &mut Self {
        self.types.insert(TypeTag::new(class, module), |_| Ok(()));
        self
    }

    pub fn contains(&self, class: &str, module: &str) -> bool {
        self.types.contains_key(&TypeTag::new(class, module))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Construct a registered custom object from its attributes
    ///
    /// **Private** - called by the decoder for every tagged value
    ///
    /// # Errors
    /// * `DecodeError::UnknownType` - the tag is not registered
    /// * `DecodeError::InvalidAttribute` - the type rejected the attributes
    pub(crate) fn resolve(&self, tag: TypeTag, fields: Fields) -> Result<Value, DecodeError> {
        match self.types.get(&tag) {
            Some(validate) => {
                validate(&fields)?;
                Ok(Value::Object(ObjectRef::new(tag.class, tag.module, fields)))
            }
            None => Err(DecodeError::UnknownType {
                class: tag.class,
                module: tag.module,
            }),
        }
    }
}

impl ObjectRef {
    /// Convert this object back into a `Record` type
    ///
    /// # Errors
    /// * `DecodeError::UnknownType` - the object has a different type tag
    /// * `DecodeError::InvalidAttribute` - attributes do not fit `T`
    pub fn to_record<T: Record>(&self) -> Result<T, DecodeError> {
        let object = self.borrow();
        if object.class != T::CLASS || object.module != T::MODULE {
            return Err(DecodeError::UnknownType {
                class: object.class.clone(),
                module: object.module.clone(),
            });
        }
        T::from_fields(&object.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::fields;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    impl Record for Point {
        const CLASS: &'static str = "Point";
        const MODULE: &'static str = "geometry";

        fn to_fields(&self) -> Fields {
            fields([("x", self.x), ("y", self.y)])
        }

        fn from_fields(fields: &Fields) -> Result<Self, DecodeError> {
            let coord = |name: &str| {
                fields.get(name).and_then(Value::as_i64).ok_or_else(|| DecodeError::InvalidAttribute {
                    class: Self::CLASS.to_string(),
                    reason: format!("missing integer '{}'", name),
                })
            };
            Ok(Self { x: coord("x")?, y: coord("y")? })
        }
    }

    #[test]
    fn test_unregistered_type_is_rejected() {
        let registry = TypeRegistry::new();
        let result = registry.resolve(TypeTag::new("Point", "geometry"), Fields::new());
        assert!(matches!(result, Err(DecodeError::UnknownType { class, .. }) if class == "Point"));
    }

    #[test]
    fn test_record_round_trip() {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>();
        assert!(registry.contains("Point", "geometry"));

        let point = Point { x: 1, y: -2 };
        let value = registry
            .resolve(TypeTag::new("Point", "geometry"), point.to_fields())
            .unwrap();
        let Value::Object(object) = value else {
            panic!("expected an object");
        };
        assert_eq!(object.to_record::<Point>().unwrap(), point);
    }

    #[test]
    fn test_record_validation() {
        let mut registry = TypeRegistry::new();
        registry.register::<Point>().register_open("Dummy", "tests");
        assert_eq!(registry.len(), 2);

        let result = registry.resolve(TypeTag::new("Point", "geometry"), fields([("x", 1)]));
        assert!(matches!(result, Err(DecodeError::InvalidAttribute { .. })));
        assert!(registry.resolve(TypeTag::new("Dummy", "tests"), Fields::new()).is_ok());
    }
}
