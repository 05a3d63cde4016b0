//! Filename sanitization for upstream-supplied names.

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Makes `name` safe to join onto a directory.
///
/// - Path separators, NUL, control characters and whitespace become `_`
/// - Runs of `_` collapse to one
/// - Leading/trailing dots, spaces and underscores are trimmed
/// - Result is cut to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let mapped = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if mapped == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(mapped);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_' || c == ' ');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_become_underscores() {
        assert_eq!(sanitize_filename("a/b\\c.txt"), "a_b_c.txt");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename("  ..  file.txt  ..  "), "file.txt");
    }

    #[test]
    fn collapses_runs() {
        assert_eq!(sanitize_filename("my   summer\tphoto.jpg"), "my_summer_photo.jpg");
        assert_eq!(sanitize_filename("file\x00\x01name.txt"), "file_name.txt");
    }

    #[test]
    fn keeps_unicode_and_limits_length() {
        assert_eq!(sanitize_filename("café.png"), "café.png");
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= NAME_MAX);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
