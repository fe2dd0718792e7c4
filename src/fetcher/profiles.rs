//! Desktop browser fingerprint pool for dynamic fetches.
//!
//! Each profile pairs a user-agent string with the matching `sec-ch-ua`
//! client-hint tuple; mismatched pairs are a common bot-detection signal.

use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct BrowserProfile {
    pub user_agent: &'static str,
    pub sec_ch_ua: &'static str,
}

/// Fixed pool of plausible Linux desktop Chrome builds.
pub const DESKTOP_PROFILES: &[BrowserProfile] = &[
    BrowserProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/131.0.0.0 Safari/537.36",
        sec_ch_ua: r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#,
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/130.0.0.0 Safari/537.36",
        sec_ch_ua: r#""Google Chrome";v="130", "Chromium";v="130", "Not?A_Brand";v="99""#,
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/129.0.0.0 Safari/537.36",
        sec_ch_ua: r#""Google Chrome";v="129", "Chromium";v="129", "Not=A?Brand";v="8""#,
    },
    BrowserProfile {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                     Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
        sec_ch_ua: r#""Microsoft Edge";v="131", "Chromium";v="131", "Not_A Brand";v="24""#,
    },
];

/// Pick one profile uniformly at random.
#[must_use]
pub fn random_profile() -> &'static BrowserProfile {
    let idx = rand::rng().random_range(0..DESKTOP_PROFILES.len());
    &DESKTOP_PROFILES[idx]
}
