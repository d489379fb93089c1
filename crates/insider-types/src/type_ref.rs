//! Metadata-level type references.
//!
//! A [`TypeReference`] names a type the way the metadata tables do: a namespace, a
//! simple name (generic definitions carry their arity as a backtick suffix, e.g.
//! ``List`1``), the module the reference was read from, and the *declaring scope*
//! the reference points at. The owning module and the declaring scope usually
//! differ: a reference read from `Acme.App` to `Acme.Core.Box` is owned by
//! `Acme.App` but scoped to `Acme.Core`.
//!
//! Module images write references in an ILAsm-like text form:
//!
//! ```text
//! [Acme.Core]Acme.Core.Box`1<[Acme.Models]Acme.Models.Item>
//! ```
//!
//! An omitted `[Scope]` prefix means "defined in the containing module". A trailing
//! `[]` marks a single-dimension array and `[,]` a two-dimension one.
//!
//! # Example
//!
//! ```
//! use insider_types::TypeReference;
//!
//! let r = TypeReference::parse("[Acme.Core]Acme.Core.Box`1<Acme.App.Item>").unwrap();
//! assert_eq!(r.qualified_name(), "Acme.Core.Box`1");
//! assert_eq!(r.full_name(), "Acme.Core.Box`1<Acme.App.Item>");
//! assert!(r.is_generic_instance());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Join a namespace and a simple name.
///
/// Types in the global namespace have no leading dot.
pub fn qualified_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Metadata-level descriptor of a type, possibly a generic instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeReference {
    pub namespace: String,
    pub name: String,
    /// Name of the module the reference was read from.
    pub module: String,
    /// Name of the declaring scope (the module the reference points at).
    pub scope: String,
    /// Non-empty when the reference is a generic instantiation.
    pub generic_arguments: Vec<TypeReference>,
    /// Array dimensions; 0 for a non-array type.
    pub array_rank: usize,
}

impl TypeReference {
    /// Create an unbound reference to `namespace.name`.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            module: String::new(),
            scope: String::new(),
            generic_arguments: Vec::new(),
            array_rank: 0,
        }
    }

    /// Set the declaring scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the owning module.
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Turn this reference into a generic instantiation over `arguments`.
    pub fn with_generic_arguments(mut self, arguments: Vec<TypeReference>) -> Self {
        self.generic_arguments = arguments;
        self
    }

    /// Turn this reference into an array of `rank` dimensions.
    pub fn with_array_rank(mut self, rank: usize) -> Self {
        self.array_rank = rank;
        self
    }

    /// Parse the ILAsm-like text form. The result is unbound (empty module).
    pub fn parse(text: &str) -> Result<Self, TypeNameError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TypeNameError::Empty);
        }

        let (scope, rest) = match text.strip_prefix('[') {
            Some(after) => {
                let close = after
                    .find(']')
                    .ok_or_else(|| TypeNameError::UnterminatedScope(text.to_string()))?;
                (after[..close].trim().to_string(), after[close + 1..].trim())
            }
            None => (String::new(), text),
        };

        let (rest, array_rank) = split_array_suffix(rest)
            .ok_or_else(|| TypeNameError::InvalidCharacter(text.to_string()))?;

        let (base, args_str) = match rest.find('<') {
            Some(angle) => (&rest[..angle], Some(&rest[angle..])),
            None => (rest, None),
        };
        let base = base.trim();
        if base.is_empty() {
            return Err(TypeNameError::MissingName(text.to_string()));
        }
        if base.contains(|c: char| matches!(c, '>' | ',' | '[' | ']')) {
            return Err(TypeNameError::InvalidCharacter(text.to_string()));
        }

        let (namespace, name) = match base.rfind('.') {
            Some(dot) => (&base[..dot], &base[dot + 1..]),
            None => ("", base),
        };
        if name.is_empty() {
            return Err(TypeNameError::MissingName(text.to_string()));
        }

        let generic_arguments = match args_str {
            Some(args) => parse_generic_arguments(args, text)?,
            None => Vec::new(),
        };

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            module: String::new(),
            scope,
            generic_arguments,
            array_rank,
        })
    }

    /// Attach the reference (and its generic arguments) to the module it was read
    /// from. An empty scope becomes the owning module.
    pub fn bind(&mut self, module: &str) {
        self.module = module.to_string();
        if self.scope.is_empty() {
            self.scope = module.to_string();
        }
        for argument in &mut self.generic_arguments {
            argument.bind(module);
        }
    }

    /// `Namespace.Name` of the referenced definition, ignoring generic arguments
    /// and array dimensions.
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.namespace, &self.name)
    }

    /// Full metadata name, including generic arguments and array dimensions.
    pub fn full_name(&self) -> String {
        let mut out = self.qualified_name();
        if !self.generic_arguments.is_empty() {
            let args: Vec<String> = self.generic_arguments.iter().map(|a| a.full_name()).collect();
            out = format!("{}<{}>", out, args.join(","));
        }
        out.push_str(&array_suffix(self.array_rank));
        out
    }

    pub fn is_generic_instance(&self) -> bool {
        !self.generic_arguments.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// The open definition behind this reference: generic arguments and array
    /// dimensions are dropped.
    pub fn element_type(&self) -> TypeReference {
        TypeReference {
            generic_arguments: Vec::new(),
            array_rank: 0,
            ..self.clone()
        }
    }

    /// Whether the reference points at the module it was read from.
    pub fn is_local(&self) -> bool {
        self.scope.is_empty() || self.scope == self.module
    }
}

/// Text suffix for an array of `rank` dimensions: `[]`, `[,]`, ...
pub fn array_suffix(rank: usize) -> String {
    match rank {
        0 => String::new(),
        _ => format!("[{}]", ",".repeat(rank - 1)),
    }
}

/// Split one trailing rank suffix off `text`. `None` when the brackets hold
/// anything but commas.
fn split_array_suffix(text: &str) -> Option<(&str, usize)> {
    let Some(body) = text.strip_suffix(']') else {
        return Some((text, 0));
    };
    let open = body.rfind('[')?;
    let dims = &body[open + 1..];
    if !dims.chars().all(|c| c == ',' || c.is_whitespace()) {
        return None;
    }
    Some((body[..open].trim_end(), dims.matches(',').count() + 1))
}

/// Parse generic arguments like `<A, B<C>, D[,]>`, respecting nested brackets.
fn parse_generic_arguments(args: &str, whole: &str) -> Result<Vec<TypeReference>, TypeNameError> {
    let inner = args
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| TypeNameError::UnbalancedGenerics(whole.to_string()))?;
    if inner.trim().is_empty() {
        return Err(TypeNameError::UnbalancedGenerics(whole.to_string()));
    }

    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut brackets = 0i32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '[' => brackets += 1,
            ']' => brackets -= 1,
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return Err(TypeNameError::UnbalancedGenerics(whole.to_string()));
                }
            }
            ',' if depth == 0 && brackets == 0 => {
                out.push(TypeReference::parse(&inner[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(TypeNameError::UnbalancedGenerics(whole.to_string()));
    }
    out.push(TypeReference::parse(&inner[start..])?);
    Ok(out)
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_local() {
            write!(f, "[{}]", self.scope)?;
        }
        write!(f, "{}", self.qualified_name())?;
        if !self.generic_arguments.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.generic_arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        write!(f, "{}", array_suffix(self.array_rank))
    }
}

impl TryFrom<String> for TypeReference {
    type Error = TypeNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeReference::parse(&value)
    }
}

impl From<TypeReference> for String {
    fn from(value: TypeReference) -> Self {
        value.to_string()
    }
}

/// Failure to parse the text form of a type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNameError {
    Empty,
    UnterminatedScope(String),
    MissingName(String),
    InvalidCharacter(String),
    UnbalancedGenerics(String),
}

impl fmt::Display for TypeNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNameError::Empty => write!(f, "empty type name"),
            TypeNameError::UnterminatedScope(s) => write!(f, "unterminated scope in '{}'", s),
            TypeNameError::MissingName(s) => write!(f, "missing type name in '{}'", s),
            TypeNameError::InvalidCharacter(s) => write!(f, "invalid character in '{}'", s),
            TypeNameError::UnbalancedGenerics(s) => {
                write!(f, "unbalanced generic arguments in '{}'", s)
            }
        }
    }
}

impl std::error::Error for TypeNameError {}
