//! Parse HTTP response header lines into ResponseHead.

use super::ResponseHead;

/// Parse collected header lines. With redirects libcurl reports one header
/// block per hop; each status line starts a new block, so only the last
/// response's status and length survive.
pub(crate) fn parse_head(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead {
                status: line
                    .split_whitespace()
                    .nth(1)
                    .and_then(|code| code.parse().ok()),
                content_length: None,
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                head.content_length = value.trim().parse::<u64>().ok();
            }
        }
    }

    head
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn status_and_length() {
        let h = parse_head(&lines(&["HTTP/1.1 200 OK", "Content-Length: 12345", ""]));
        assert_eq!(h.status, Some(200));
        assert_eq!(h.content_length, Some(12345));
        assert!(h.is_success());
    }

    #[test]
    fn missing_or_garbage_length_is_unknown() {
        let h = parse_head(&lines(&["HTTP/1.1 200 OK", "Content-Type: image/png"]));
        assert_eq!(h.content_length, None);
        let h = parse_head(&lines(&["HTTP/1.1 200 OK", "content-length: lots"]));
        assert_eq!(h.content_length, None);
    }

    #[test]
    fn last_redirect_hop_wins() {
        let h = parse_head(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: https://cdn.example.com/file.zip",
            "Content-Length: 0",
            "",
            "HTTP/2 200",
            "content-length: 2048",
            "",
        ]));
        assert_eq!(h.status, Some(200));
        assert_eq!(h.content_length, Some(2048));
    }

    #[test]
    fn error_status_is_not_success() {
        let h = parse_head(&lines(&["HTTP/1.1 404 Not Found"]));
        assert_eq!(h.status, Some(404));
        assert!(!h.is_success());
        assert!(!ResponseHead::default().is_success());
    }
}
