/// Upcase the first character, leaving the rest untouched.
pub fn upcase_first_letter(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Map a UML basic type name to its USE OCL spelling.
///
/// Only `float` needs renaming; every other type is capitalized as-is.
pub fn basic_type_to_ocl(name: &str) -> String {
    if name == "float" {
        return "Real".to_string();
    }
    upcase_first_letter(name)
}

pub fn indented(line: &str) -> String {
    format!("\t{line}")
}
