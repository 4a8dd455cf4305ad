/// Whether `name` is usable as a Java field or method name.
///
/// Follows `Character.isJavaIdentifierStart` / `isJavaIdentifierPart` closely
/// enough for mapping files; keywords are not rejected.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_identifier_start(first) && chars.all(is_identifier_part)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_numeric()
}
