//! Member classification.
//!
//! A method's RVA locates its body inside the module image. The sentinel RVA `0`
//! means the module carries no body for it: the method is implemented elsewhere
//! (P/Invoke, runtime-provided) or is abstract. Edits that rewrite a body must
//! skip such methods.

use insider_types::MethodDefinition;

/// RVA value marking "no body in this module".
pub const NO_BODY_RVA: u32 = 0;

/// Where a method's implementation lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLocation {
    /// No body in this module.
    External,
    /// Body at the given RVA.
    Rva(u32),
}

pub fn body_location(method: &MethodDefinition) -> BodyLocation {
    match method.rva {
        NO_BODY_RVA => BodyLocation::External,
        rva => BodyLocation::Rva(rva),
    }
}

/// True when `method` has no implementation body in this module.
pub fn is_external(method: &MethodDefinition) -> bool {
    body_location(method) == BodyLocation::External
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_rva_is_external() {
        let method = MethodDefinition::new("Invoke", NO_BODY_RVA);
        assert!(is_external(&method));
        assert_eq!(body_location(&method), BodyLocation::External);
    }

    #[test]
    fn test_method_with_body() {
        let method = MethodDefinition::new("Run", 0x2050);
        assert!(!is_external(&method));
        assert_eq!(body_location(&method), BodyLocation::Rva(0x2050));
    }

    #[test]
    fn test_missing_rva_in_image_is_external() {
        let method: MethodDefinition = serde_json::from_str(r#"{"name": "Extern"}"#).unwrap();
        assert!(is_external(&method));
    }
}
