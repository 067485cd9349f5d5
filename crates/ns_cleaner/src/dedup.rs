use std::collections::HashSet;

use ns_core::{CleanArticle, DedupStrategy, Section};
use sha2::{Digest, Sha256};

/// SHA-256 of the lowercased headline and body.
pub fn content_fingerprint(headline: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(headline.to_lowercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(body.to_lowercase().as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Tracks which articles have been seen; the first occurrence wins.
#[derive(Debug, Default)]
pub struct Deduplicator {
    strategy: DedupStrategy,
    identifiers: HashSet<String>,
    headlines: HashSet<(Section, String)>,
    fingerprints: HashSet<String>,
}

impl Deduplicator {
    pub fn new(strategy: DedupStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Returns true the first time an article is offered, false for
    /// duplicates.
    pub fn admit(&mut self, article: &CleanArticle) -> bool {
        if self.identifiers.contains(&article.identifier) {
            return false;
        }
        if self.strategy == DedupStrategy::IdentifierOrContent {
            let headline_key = (article.section, article.headline.to_lowercase());
            let fingerprint = content_fingerprint(&article.headline, &article.body);
            if self.headlines.contains(&headline_key) || self.fingerprints.contains(&fingerprint) {
                return false;
            }
            self.headlines.insert(headline_key);
            self.fingerprints.insert(fingerprint);
        }
        self.identifiers.insert(article.identifier.clone());
        true
    }
}
