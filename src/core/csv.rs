/// Split one line of the circuit file into trimmed fields.
///
/// A `"` toggles quoted mode and is never part of a field. Commas inside quotes
/// are kept as text. There is no escape for embedded quotes, and an unbalanced
/// quote simply leaves the rest of the line in quoted mode.
///
/// An empty line yields a single empty field, so callers filter blank lines.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}
