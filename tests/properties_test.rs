//! Property tests for the pure building blocks.

use proptest::prelude::*;

use webscout::fetcher::decision::decide_action;
use webscout::filter::get_product_url;
use webscout::models::DataSource;
use webscout::visited::VisitedSet;

proptest! {
    /// The decision oracle is a pure function: same input, same verdict.
    #[test]
    fn decision_is_deterministic(body in proptest::collection::vec(any::<u8>(), 0..2048), status in 0u16..1000) {
        prop_assert_eq!(decide_action(&body, status), decide_action(&body, status));
    }

    /// HTTP errors always short-circuit to the static verdict, whatever
    /// the body claims.
    #[test]
    fn http_errors_always_use_static(body in ".*", status in 400u16..600) {
        prop_assert_eq!(
            decide_action(body.as_bytes(), status),
            webscout::fetcher::decision::FetchAction::UseStatic
        );
    }

    /// Canonical product URLs survive re-canonicalization unchanged.
    #[test]
    fn amazon_canonicalization_is_idempotent(id in "[A-Z0-9]{10}", junk in "[a-z0-9=&?]{0,20}") {
        let link = format!("https://www.amazon.com/widget/dp/{id}?{junk}");
        let once = get_product_url(DataSource::Amazon, &link).expect("product link matches");
        let twice = get_product_url(DataSource::Amazon, &once).expect("canonical link matches");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn newegg_canonicalization_is_idempotent(id in "[A-Z0-9]{1,20}") {
        let link = format!("https://www.newegg.com/p/{id}?cm_sp=x");
        let once = get_product_url(DataSource::Newegg, &link).expect("product link matches");
        let twice = get_product_url(DataSource::Newegg, &once).expect("canonical link matches");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn bestbuy_canonicalization_is_idempotent(id in "[0-9]{7}") {
        let link = format!("https://www.bestbuy.com/site/thing/{id}.p?skuId={id}");
        let once = get_product_url(DataSource::BestBuy, &link).expect("product link matches");
        let twice = get_product_url(DataSource::BestBuy, &once).expect("canonical link matches");
        prop_assert_eq!(once, twice);
    }

    /// Feeding any URL sequence through the visited set yields exactly
    /// one claim per distinct URL.
    #[test]
    fn visited_claims_equal_distinct_count(urls in proptest::collection::vec("[a-d]{1,3}", 0..200)) {
        let visited = VisitedSet::new();
        let claims = urls.iter().filter(|url| !visited.seen_or_insert(url)).count();
        let distinct: std::collections::HashSet<_> = urls.iter().collect();
        prop_assert_eq!(claims, distinct.len());
    }
}
