//! Shared utility functions
//!
//! Name manipulation used across analysis and generation.

use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").ok());

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// Uppercase the first character
///
/// # Examples
/// ```
/// use stepgen::util::upcase;
/// assert_eq!(upcase("width"), "Width");
/// assert_eq!(upcase(""), "");
/// ```
pub fn upcase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character
///
/// # Examples
/// ```
/// use stepgen::util::downcase;
/// assert_eq!(downcase("BusinessAnalyst"), "businessAnalyst");
/// ```
pub fn downcase(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Return `name`, altered if it would shadow `other`
///
/// # Examples
/// ```
/// use stepgen::util::distinct_from;
/// assert_eq!(distinct_from("string", "notes"), "string");
/// assert_eq!(distinct_from("string", "string"), "string_");
/// ```
pub fn distinct_from(name: &str, other: &str) -> String {
    unused_name(name, &[other])
}

/// Return `name`, suffixed with `_` until no name in `taken` equals it
pub fn unused_name(name: &str, taken: &[&str]) -> String {
    let mut name = name.to_string();
    while taken.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// Whether `s` may be used as a Java identifier
///
/// # Examples
/// ```
/// use stepgen::util::is_java_identifier;
/// assert!(is_java_identifier("fooBar"));
/// assert!(!is_java_identifier("class"));
/// assert!(!is_java_identifier("1up"));
/// ```
pub fn is_java_identifier(s: &str) -> bool {
    let well_formed = IDENTIFIER.as_ref().is_some_and(|re| re.is_match(s));
    well_formed && !KEYWORDS.contains(&s)
}

/// Property name for a getter: `getFooBar` and `isFooBar` both give `fooBar`
///
/// # Examples
/// ```
/// use stepgen::util::property_name;
/// assert_eq!(property_name("getNotes"), Some("notes".to_string()));
/// assert_eq!(property_name("isActive"), Some("active".to_string()));
/// assert_eq!(property_name("size"), None);
/// ```
pub fn property_name(getter: &str) -> Option<String> {
    let rest = getter
        .strip_prefix("get")
        .or_else(|| getter.strip_prefix("is"))?;
    if rest.chars().next().is_some_and(|c| c.is_uppercase()) {
        Some(downcase(rest))
    } else {
        None
    }
}
