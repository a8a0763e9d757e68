//! Static types as resolved by the front-end.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The resolved (underlying) type of an expression or declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Uint,
    Byte,
    Bool,
    String,
    Slice(Box<Type>),
    Array(usize, Box<Type>),
    Struct(StructType),
    Map(Box<Type>, Box<Type>),
    Interface,
    /// Results of a multi-value call.
    Tuple(Vec<Type>),
    /// Result of a call that returns nothing.
    Void,
    Func,
}

/// Struct layout: fields are indexed 0..N-1 in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructType {
    #[serde(default)]
    pub name: Option<TypeName>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName {
    pub package: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

impl Type {
    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    /// `[]byte` or `[N]byte`.
    pub fn is_byte_array(&self) -> bool {
        match self {
            Type::Slice(elem) | Type::Array(_, elem) => matches!(**elem, Type::Byte),
            _ => false,
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            Type::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Number of stack values an expression of this type produces.
    pub fn value_count(&self) -> usize {
        match self {
            Type::Void => 0,
            Type::Tuple(types) => types.len(),
            _ => 1,
        }
    }
}

impl StructType {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Uint => write!(f, "uint"),
            Type::Byte => write!(f, "byte"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Array(len, elem) => write!(f, "[{}]{}", len, elem),
            Type::Struct(StructType {
                name: Some(name), ..
            }) => write!(f, "{}", name),
            Type::Struct(StructType { name: None, fields }) => {
                write!(f, "struct {{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ";")?;
                    }
                    write!(f, " {} {}", field.name, field.ty)?;
                }
                write!(f, " }}")
            }
            Type::Map(key, value) => write!(f, "map[{}]{}", key, value),
            Type::Interface => write!(f, "interface{{}}"),
            Type::Tuple(types) => {
                write!(f, "(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
            Type::Void => write!(f, "()"),
            Type::Func => write!(f, "func"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Type {
        Type::Struct(StructType {
            name: Some(TypeName {
                package: "main".into(),
                name: "Point".into(),
            }),
            fields: vec![
                Field {
                    name: "X".into(),
                    ty: Type::Int,
                },
                Field {
                    name: "Y".into(),
                    ty: Type::Int,
                },
            ],
        })
    }

    #[test]
    fn test_field_index_follows_declaration_order() {
        let ty = point();
        let s = ty.as_struct().unwrap();
        assert_eq!(s.field_index("X"), Some(0));
        assert_eq!(s.field_index("Y"), Some(1));
        assert_eq!(s.field_index("Z"), None);
    }

    #[test]
    fn test_byte_arrays() {
        assert!(Type::Slice(Box::new(Type::Byte)).is_byte_array());
        assert!(Type::Array(4, Box::new(Type::Byte)).is_byte_array());
        assert!(!Type::Slice(Box::new(Type::Int)).is_byte_array());
        assert!(!Type::String.is_byte_array());
    }

    #[test]
    fn test_display() {
        assert_eq!(point().to_string(), "main.Point");
        assert_eq!(
            Type::Map(Box::new(Type::String), Box::new(Type::Slice(Box::new(Type::Byte))))
                .to_string(),
            "map[string][]byte"
        );
        assert_eq!(
            Type::Tuple(vec![Type::Int, Type::Bool]).to_string(),
            "(int, bool)"
        );
    }

    #[test]
    fn test_value_count() {
        assert_eq!(Type::Void.value_count(), 0);
        assert_eq!(Type::Int.value_count(), 1);
        assert_eq!(Type::Tuple(vec![Type::Int, Type::Int]).value_count(), 2);
    }
}
