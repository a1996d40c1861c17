//! Identifier transformation utilities for generated projects

/// Converts a string to snake_case.
///
/// Handles camelCase, PascalCase, kebab-case and space-separated input.
///
/// # Examples
/// ```
/// use apiforge::core::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("userProfile"), "user_profile");
/// assert_eq!(to_snake_case("order-items"), "order_items");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            // Underscore only on a lower -> upper boundary
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if (ch == '-' || ch == '_' || ch == ' ') && !result.is_empty() && !result.ends_with('_')
        {
            result.push('_');
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}

/// Converts a string to kebab-case, used for mount paths such as `/api/order-items`.
///
/// # Examples
/// ```
/// use apiforge::core::utils::to_kebab_case;
///
/// assert_eq!(to_kebab_case("globalQuery"), "global-query");
/// assert_eq!(to_kebab_case("userRoutes"), "user-routes");
/// ```
pub fn to_kebab_case(s: &str) -> String {
    to_snake_case(s).replace('_', "-")
}

/// Converts a string to PascalCase by capitalizing each snake_case word.
///
/// # Examples
/// ```
/// use apiforge::core::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("order_item"), "OrderItem");
/// assert_eq!(to_proper_case("stripe-events"), "StripeEvents");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(capitalize_first)
        .collect()
}

/// Converts a string to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_proper_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Upper-cases the first character as-is and leaves the rest untouched.
///
/// Non-letters stay what they are, so `"2fa"` stays `"2fa"`.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Converts a string to SCREAMING_SNAKE_CASE, used for environment variable names.
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}
