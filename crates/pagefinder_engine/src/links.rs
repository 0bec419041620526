use url::Url;

use crate::extract::Anchor;

/// Resolve `reference` against `base`, dropping any fragment. Fragment-only
/// and `javascript:` references are not links.
pub fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    let mut url = base.join(trimmed).ok()?;
    url.set_fragment(None);
    Some(url)
}

pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Exact host and port equality; subdomains are different hosts.
pub fn same_host(url: &Url, seed: &Url) -> bool {
    match (url.host_str(), seed.host_str()) {
        (Some(host), Some(seed_host)) => {
            host.eq_ignore_ascii_case(seed_host)
                && url.port_or_known_default() == seed.port_or_known_default()
        }
        _ => false,
    }
}

/// Absolute http(s) links from `anchors` that stay on the seed's host, in
/// document order.
pub fn same_domain_links(anchors: &[Anchor], page_url: &Url, seed: &Url) -> Vec<Url> {
    anchors
        .iter()
        .filter_map(|anchor| resolve_url(&anchor.href, page_url))
        .filter(|url| is_http(url) && same_host(url, seed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(hrefs: &[&str]) -> Vec<Anchor> {
        hrefs
            .iter()
            .map(|href| Anchor {
                href: href.to_string(),
            })
            .collect()
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn foreign_hosts_are_dropped() {
        let seed = url("https://example.com");
        let links = same_domain_links(
            &anchors(&["https://example.com/a", "https://other.com/b"]),
            &seed,
            &seed,
        );
        assert_eq!(links, vec![url("https://example.com/a")]);
    }

    #[test]
    fn subdomains_are_not_same_domain() {
        let seed = url("https://example.com");
        let links = same_domain_links(
            &anchors(&["https://www.example.com/", "https://blog.example.com/x"]),
            &seed,
            &seed,
        );
        assert!(links.is_empty());
    }

    #[test]
    fn relative_links_resolve_against_page() {
        let seed = url("https://example.com/");
        let page = url("https://example.com/docs/intro");
        let links = same_domain_links(
            &anchors(&["next", "/about", "../top#section", "#local", "mailto:a@example.com"]),
            &page,
            &seed,
        );
        assert_eq!(
            links,
            vec![
                url("https://example.com/docs/next"),
                url("https://example.com/about"),
                url("https://example.com/top"),
            ]
        );
    }

    #[test]
    fn port_is_part_of_the_host_identity() {
        let seed = url("http://127.0.0.1:8080/");
        assert!(same_host(&url("http://127.0.0.1:8080/a"), &seed));
        assert!(!same_host(&url("http://127.0.0.1:9090/a"), &seed));
    }

    #[test]
    fn javascript_links_are_ignored() {
        let base = url("https://example.com/");
        assert_eq!(resolve_url("javascript:void(0)", &base), None);
        assert_eq!(resolve_url("   ", &base), None);
    }
}
