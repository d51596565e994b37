use crate::types::{ClassName, TypeName};
use crate::util::upcase;

/// Zero-value convenience for a collection-typed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyOption {
    /// Convenience method name, e.g. `emptyNotes`
    pub method: String,
    /// `java.util.Collections` factory producing the empty value
    pub factory: &'static str,
}

impl EmptyOption {
    /// Empty option for a parameter of type `ty`, if its raw type has one
    pub fn for_type(ty: &TypeName, parameter: &str) -> Option<Self> {
        let class = ty.raw_class()?;
        let factory = match (class.package.as_str(), class.nesting().as_str()) {
            ("java.util", "List") | ("java.util", "Collection") | ("java.lang", "Iterable") => {
                "emptyList"
            }
            ("java.util", "Set") => "emptySet",
            _ => return None,
        };
        Some(Self::named(parameter, factory))
    }

    /// Empty option that carries no initializer of its own, for lone getters
    pub fn clearing(parameter: &str) -> Self {
        Self::named(parameter, "")
    }

    fn named(parameter: &str, factory: &'static str) -> Self {
        Self {
            method: format!("empty{}", upcase(parameter)),
            factory,
        }
    }

    /// The `Collections` class the factory lives on
    pub fn collections() -> TypeName {
        TypeName::class(ClassName::new("java.util", ["Collections"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeScope;

    fn ty(s: &str) -> TypeName {
        TypeName::parse(s, &TypeScope::new("p")).unwrap()
    }

    #[test]
    fn test_collection_types() {
        let list = EmptyOption::for_type(&ty("List<String>"), "notes").unwrap();
        assert_eq!(list.method, "emptyNotes");
        assert_eq!(list.factory, "emptyList");
        assert_eq!(
            EmptyOption::for_type(&ty("Iterable<String>"), "x").unwrap().factory,
            "emptyList"
        );
        assert_eq!(
            EmptyOption::for_type(&ty("Set<Long>"), "ids").unwrap().factory,
            "emptySet"
        );
    }

    #[test]
    fn test_other_types_have_none() {
        assert!(EmptyOption::for_type(&ty("ArrayList<String>"), "x").is_none());
        assert!(EmptyOption::for_type(&ty("String"), "x").is_none());
        assert!(EmptyOption::for_type(&ty("int"), "x").is_none());
    }
}
