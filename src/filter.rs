//! Pluggable URL predicates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::DataSource;
use crate::urlutil::{host_of, registrable_domain};

/// Decides whether an extracted link is of interest.
///
/// The filter is applied to each individual link, never to the page the
/// link was found on.
pub trait UrlFilter: Send + Sync {
    fn filter(&self, source: DataSource, link: &str) -> bool;
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFilter;

impl UrlFilter for AlwaysFilter {
    fn filter(&self, _source: DataSource, _link: &str) -> bool {
        true
    }
}

/// Keeps traversal inside the seed's registrable domain.
#[derive(Debug, Clone)]
pub struct InDomainFilter {
    domain: String,
}

impl InDomainFilter {
    /// `seed` is the starting URL; its host with any leading `www.`
    /// stripped becomes the containment key.
    #[must_use]
    pub fn new(seed: &str) -> Option<Self> {
        let host = host_of(seed)?;
        Some(Self {
            domain: registrable_domain(&host),
        })
    }
}

impl UrlFilter for InDomainFilter {
    fn filter(&self, _source: DataSource, link: &str) -> bool {
        host_of(link).is_some_and(|host| host.contains(&self.domain))
    }
}

static AMAZON_PRODUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/dp/([A-Z0-9]{10})").expect("valid amazon product pattern")
});
static NEWEGG_PRODUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/p/([A-Z0-9]+)").expect("valid newegg product pattern")
});
static BESTBUY_PRODUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{7})\.p").expect("valid bestbuy product pattern")
});

/// Matches product-detail URLs on the supported sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilter;

impl ProductFilter {
    fn pattern(source: DataSource) -> Option<&'static Regex> {
        match source {
            DataSource::Amazon => Some(&AMAZON_PRODUCT),
            DataSource::Newegg => Some(&NEWEGG_PRODUCT),
            DataSource::BestBuy => Some(&BESTBUY_PRODUCT),
            DataSource::None => None,
        }
    }
}

impl UrlFilter for ProductFilter {
    fn filter(&self, source: DataSource, link: &str) -> bool {
        Self::pattern(source).is_some_and(|re| re.is_match(link))
    }
}

/// Rebuild the clean product URL from the extracted identifier.
///
/// Idempotent: feeding a canonical URL back in yields the same URL.
/// Returns `None` when the link doesn't match the site's pattern.
#[must_use]
pub fn get_product_url(source: DataSource, link: &str) -> Option<String> {
    let re = ProductFilter::pattern(source)?;
    let id = re.captures(link)?.get(1)?.as_str();
    let clean = match source {
        DataSource::Amazon => format!("https://www.amazon.com/dp/{id}"),
        DataSource::Newegg => format!("https://www.newegg.com/p/{id}"),
        DataSource::BestBuy => format!("https://www.bestbuy.com/site/{id}.p"),
        DataSource::None => return None,
    };
    Some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_domain_filter_strips_www_and_ignores_case() {
        let filter = InDomainFilter::new("https://www.Example.com/start").expect("seed parses");
        assert!(filter.filter(DataSource::None, "https://example.com/page"));
        assert!(filter.filter(DataSource::None, "https://blog.EXAMPLE.com/post"));
        assert!(!filter.filter(DataSource::None, "https://other.org/"));
    }

    #[test]
    fn newegg_product_urls_match_and_canonicalize() {
        let link = "https://www.newegg.com/p/N82E16820236783?foo=bar";
        assert!(ProductFilter.filter(DataSource::Newegg, link));
        assert_eq!(
            get_product_url(DataSource::Newegg, link).as_deref(),
            Some("https://www.newegg.com/p/N82E16820236783")
        );
        assert!(!ProductFilter.filter(DataSource::Newegg, "https://www.newegg.com/search"));
    }

    #[test]
    fn amazon_product_ids_are_ten_chars() {
        assert!(ProductFilter.filter(
            DataSource::Amazon,
            "https://www.amazon.com/gp/x/dp/B08N5WRWNW/ref=sr_1_1"
        ));
        assert!(!ProductFilter.filter(DataSource::Amazon, "https://www.amazon.com/s?k=ssd"));
    }

    #[test]
    fn bestbuy_matches_seven_digit_sku() {
        let link = "https://www.bestbuy.com/site/some-product/6418599.p?skuId=6418599";
        assert!(ProductFilter.filter(DataSource::BestBuy, link));
        assert_eq!(
            get_product_url(DataSource::BestBuy, link).as_deref(),
            Some("https://www.bestbuy.com/site/6418599.p")
        );
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for (source, link) in [
            (DataSource::Amazon, "https://www.amazon.com/gp/x/dp/B08N5WRWNW"),
            (DataSource::Newegg, "https://www.newegg.com/p/N82E16820236783?x=1"),
            (DataSource::BestBuy, "https://www.bestbuy.com/site/p/6418599.p"),
        ] {
            let once = get_product_url(source, link).expect("matches");
            let twice = get_product_url(source, &once).expect("canonical still matches");
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn unknown_sources_never_match() {
        assert!(!ProductFilter.filter(DataSource::None, "https://example.com/p/ABC123"));
        assert_eq!(get_product_url(DataSource::None, "https://example.com/p/ABC123"), None);
    }
}
