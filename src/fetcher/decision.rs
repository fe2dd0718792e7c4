//! Classification of a static fetch response.
//!
//! `decide_action` is a pure function of `(body, status_code)`; the engine
//! relies on that for the sticky dynamic-host flags to be reproducible.

/// What to do with a static response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchAction {
    /// Body is usable as-is.
    UseStatic,
    /// Body is suspiciously small; render once in the browser without
    /// flagging the host.
    RetryOneOff,
    /// The host serves a JavaScript wall; flag it and render dynamically
    /// from now on.
    MarkDynamic,
}

/// Substrings that identify a bot challenge or an explicit JS requirement.
const DYNAMIC_MARKERS: &[&str] = &[
    "challenge-platform",
    "Cloudflare",
    "You need to enable JavaScript",
    "This site requires Javascript",
];

/// Bodies shorter than this are assumed to be a stub shell.
const MIN_STATIC_BODY_BYTES: usize = 500;

/// Classify a static response. Rules short-circuit in order; the first
/// match wins.
#[must_use]
pub fn decide_action(body: &[u8], status_code: u16) -> FetchAction {
    // Dynamic rendering won't fix an HTTP error.
    if status_code >= 400 {
        return FetchAction::UseStatic;
    }

    let text = String::from_utf8_lossy(body);
    if DYNAMIC_MARKERS.iter().any(|marker| text.contains(marker)) {
        return FetchAction::MarkDynamic;
    }

    if body.len() < MIN_STATIC_BODY_BYTES {
        return FetchAction::RetryOneOff;
    }

    FetchAction::UseStatic
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler_html(len: usize) -> Vec<u8> {
        let mut body = b"<html><body>".to_vec();
        while body.len() < len {
            body.extend_from_slice(b"<p>lorem ipsum dolor sit amet</p>");
        }
        body
    }

    #[test]
    fn large_ok_body_is_static() {
        assert_eq!(decide_action(&filler_html(5_000), 200), FetchAction::UseStatic);
    }

    #[test]
    fn http_errors_never_escalate() {
        assert_eq!(decide_action(b"Not Found", 404), FetchAction::UseStatic);
        assert_eq!(
            decide_action(b"challenge-platform", 503),
            FetchAction::UseStatic
        );
    }

    #[test]
    fn challenge_markers_mark_dynamic() {
        for marker in [
            "challenge-platform",
            "Cloudflare",
            "You need to enable JavaScript",
            "This site requires Javascript",
        ] {
            let body = format!("<html><body>...{marker}...</body></html>");
            assert_eq!(
                decide_action(body.as_bytes(), 200),
                FetchAction::MarkDynamic,
                "marker {marker:?} should escalate"
            );
        }
    }

    #[test]
    fn marker_beats_length_rule() {
        // Tiny body containing a marker is MarkDynamic, not RetryOneOff.
        assert_eq!(decide_action(b"Cloudflare", 200), FetchAction::MarkDynamic);
    }

    #[test]
    fn short_body_retries_once() {
        assert_eq!(decide_action(b"<html></html>", 200), FetchAction::RetryOneOff);
        assert_eq!(decide_action(b"", 200), FetchAction::RetryOneOff);
    }

    #[test]
    fn boundary_at_500_bytes() {
        assert_eq!(decide_action(&vec![b'a'; 499], 200), FetchAction::RetryOneOff);
        assert_eq!(decide_action(&vec![b'a'; 500], 200), FetchAction::UseStatic);
    }
}
