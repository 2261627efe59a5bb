//! Identifier conventions used by generated sources
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `computeSum` | [`to_upper_snake`] | `COMPUTE_SUM` |
//! | `Point` | [`decapitalize`] | `point` |
//! | `point` | [`capitalize`] | `Point` |
//! | `a.B$C` | [`mangle_jni`] | `a_B_00024C` |

/// Convert a camelCase identifier to UPPER_SNAKE_CASE.
///
/// # Examples
///
/// ```
/// use isobridge_emit::names::to_upper_snake;
///
/// assert_eq!(to_upper_snake("computeSum"), "COMPUTE_SUM");
/// assert_eq!(to_upper_snake("parseURLValue"), "PARSE_URL_VALUE");
/// ```
pub fn to_upper_snake(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (idx, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && idx > 0 {
            let prev = chars[idx - 1];
            let next_is_lower = chars.get(idx + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                result.push('_');
            }
        }
        result.extend(c.to_uppercase());
    }
    result
}

/// Lower-case the first letter of a string.
///
/// # Examples
///
/// ```
/// use isobridge_emit::names::decapitalize;
///
/// assert_eq!(decapitalize("Point"), "point");
/// assert_eq!(decapitalize(""), "");
/// ```
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Escape a binary class or method name for use in a JNI symbol.
///
/// # Examples
///
/// ```
/// use isobridge_emit::names::mangle_jni;
///
/// assert_eq!(mangle_jni("com.acme.CalculatorGen$ManagedToNativeStartPoint"),
///            "com_acme_CalculatorGen_00024ManagedToNativeStartPoint");
/// assert_eq!(mangle_jni("add_0"), "add_10");
/// ```
pub fn mangle_jni(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => result.push(c),
            '.' | '/' => result.push('_'),
            '_' => result.push_str("_1"),
            ';' => result.push_str("_2"),
            '[' => result.push_str("_3"),
            other => result.push_str(&format!("_0{:04x}", other as u32)),
        }
    }
    result
}
