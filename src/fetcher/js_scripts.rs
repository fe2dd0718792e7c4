//! JavaScript snippets injected during dynamic fetches.

/// Pre-load stealth script, registered before any document script runs.
///
/// Unsets the standard automation indicator and provides the benign
/// `chrome` object headless builds lack.
pub const STEALTH_PRELOAD_SCRIPT: &str = r"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined
    });
    if (!window.chrome) {
        window.chrome = { runtime: {} };
    }
";

/// Link shim: re-publish every resolved `a[href]` inside a hidden
/// container so that downstream static HTML parsing sees URLs that were
/// computed by page JavaScript.
pub const LINK_SHIM_SCRIPT: &str = r"
    (() => {
        const shim = document.createElement('div');
        shim.id = 'crawler-shim';
        shim.style.display = 'none';
        for (const anchor of document.querySelectorAll('a[href]')) {
            if (!anchor.href) continue;
            const copy = document.createElement('a');
            copy.href = anchor.href;
            shim.appendChild(copy);
        }
        document.body.appendChild(shim);
        return shim.childElementCount;
    })()
";

/// Smooth scroll by a pixel amount chosen per fetch.
#[must_use]
pub fn smooth_scroll_script(pixels: u32) -> String {
    format!("window.scrollBy({{ top: {pixels}, left: 0, behavior: 'smooth' }});")
}
