use sha2::{Digest, Sha256};

// Markup-based detection breaks on every redesign; keyword matching only
// needs the storefront to keep saying these things somewhere on the page.
const UNAVAILABILITY_MARKERS: [&str; 3] = ["out of stock", "currently unavailable", "sold out"];
const PURCHASABILITY_MARKERS: [&str; 3] = ["add to cart", "purchase", "buy now"];

/// Lexical purchasability verdict for raw page content.
///
/// The page counts as purchasable when no unavailability marker appears
/// and at least one purchasability marker does. The check is biased
/// toward false negatives; a page that says "buy now" in an ad block
/// without ever saying "sold out" will still read as in stock.
pub fn appears_purchasable(content: &str) -> bool {
    let haystack = content.to_lowercase();
    if UNAVAILABILITY_MARKERS.iter().any(|m| haystack.contains(m)) {
        return false;
    }
    PURCHASABILITY_MARKERS.iter().any(|m| haystack.contains(m))
}

const FINGERPRINT_BYTES: usize = 8;

/// Short stable digest of the exact page bytes, 16 hex characters.
/// Included in notification bodies so an operator can correlate an alert
/// with a page snapshot; never feeds into any decision.
pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchasable_when_only_buy_marker_present() {
        assert!(appears_purchasable("Limited stock - Add to Cart today"));
    }

    #[test]
    fn not_purchasable_when_both_marker_kinds_present() {
        assert!(!appears_purchasable("Buy now! (sold out)"));
    }

    #[test]
    fn not_purchasable_when_no_marker_present() {
        assert!(!appears_purchasable("Product details and reviews"));
    }

    #[test]
    fn empty_content_is_not_purchasable() {
        assert!(!appears_purchasable(""));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(!appears_purchasable("CURRENTLY UNAVAILABLE. BUY NOW"));
        assert!(appears_purchasable("BUY NOW"));
    }

    #[test]
    fn ignores_marker_context() {
        // "buy now" in unrelated page chrome still flips the verdict when
        // the page never says it is out of stock. Accepted bias.
        let page = "Other customers also bought... Buy now with 1-Click";
        assert!(appears_purchasable(page));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint("same content"), fingerprint("same content"));
    }

    #[test]
    fn fingerprint_differs_for_distinct_content() {
        assert_ne!(fingerprint("page a"), fingerprint("page b"));
    }

    #[test]
    fn fingerprint_length_is_fixed() {
        assert_eq!(fingerprint("").len(), 16);
        assert_eq!(fingerprint(&"x".repeat(100_000)).len(), 16);
    }
}
