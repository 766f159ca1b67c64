// URL-safe identifiers derived from display names.

/// Lowercase `value`, collapse every run of characters outside `[a-z0-9]`
/// into a single `-`, and strip leading/trailing hyphens.
///
/// `"Mean Mug"` becomes `"mean-mug"`; `"  A & B!! "` becomes `"a-b"`.
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_hyphen = false;

    for c in value.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name() {
        assert_eq!(slugify("Mean Mug"), "mean-mug");
    }

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(slugify("  A & B!! "), "a-b");
        assert_eq!(slugify("--Vulpes   Coffee--"), "vulpes-coffee");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Route 66 Diner"), "route-66-diner");
    }

    #[test]
    fn non_ascii_letters_are_separators() {
        assert_eq!(slugify("Café Olé"), "caf-ol");
    }

    #[test]
    fn nothing_left() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }
}
