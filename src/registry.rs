use crate::error::RegistryError;
use crate::model::{LinkStats, ShortLink, Totals};
use crate::utils::{generate_code, is_valid_url};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

pub const CODE_LENGTH: usize = 6;
pub const MAX_CODE_ATTEMPTS: usize = 16;

pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

pub struct RandomCodes {
    length: usize,
}

impl RandomCodes {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new(CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodes {
    fn generate(&self) -> String {
        generate_code(self.length)
    }
}

struct Record {
    code: String,
    target_url: String,
    clicks: AtomicU64,
    created_at: DateTime<Utc>,
}

impl Record {
    fn snapshot(&self) -> ShortLink {
        ShortLink {
            code: self.code.clone(),
            target_url: self.target_url.clone(),
            click_count: self.clicks.load(Ordering::Relaxed),
            created_at: self.created_at,
        }
    }
}

#[derive(Default)]
struct Links {
    // insertion order, never reordered or removed from
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Links {
    fn get(&self, code: &str) -> Option<&Record> {
        self.index.get(code).map(|&position| &self.records[position])
    }
}

/// Inserts take the write side of the mapping lock. Clicks only need the
/// read side: each record carries its own atomic counter, so concurrent
/// redirects of the same code never lose an increment and never block
/// listings.
pub struct Registry {
    links: RwLock<Links>,
    codes: Box<dyn CodeGenerator>,
    max_attempts: usize,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_generator(RandomCodes::default(), MAX_CODE_ATTEMPTS)
    }

    pub fn with_generator<G>(codes: G, max_attempts: usize) -> Self
    where
        G: CodeGenerator + 'static,
    {
        Self {
            links: RwLock::new(Links::default()),
            codes: Box::new(codes),
            max_attempts,
        }
    }

    pub fn shorten(&self, target_url: &str) -> Result<ShortLink, RegistryError> {
        if !is_valid_url(target_url) {
            tracing::debug!("Rejected url without http(s) scheme: {:?}", target_url);
            return Err(RegistryError::InvalidUrl);
        }
        let mut links = self.links.write();
        for _ in 0..self.max_attempts {
            let code = self.codes.generate();
            if links.index.contains_key(&code) {
                tracing::warn!("Short code collision on {}, drawing again", code);
                continue;
            }
            let record = Record {
                code: code.clone(),
                target_url: target_url.to_string(),
                clicks: AtomicU64::new(0),
                created_at: Utc::now(),
            };
            let link = record.snapshot();
            let position = links.records.len();
            links.records.push(record);
            links.index.insert(code, position);
            tracing::info!("Shortened {} to {}", target_url, link.code);
            return Ok(link);
        }
        tracing::error!(
            "Could not allocate a short code. Exhausted all {} attempts",
            self.max_attempts
        );
        Err(RegistryError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    pub fn resolve(&self, code: &str) -> Result<String, RegistryError> {
        let links = self.links.read();
        let record = links.get(code).ok_or_else(|| {
            tracing::debug!("Unknown short code: {}", code);
            RegistryError::NotFound
        })?;
        record.clicks.fetch_add(1, Ordering::Relaxed);
        Ok(record.target_url.clone())
    }

    pub fn stats(&self, code: &str) -> Result<LinkStats, RegistryError> {
        let links = self.links.read();
        let record = links.get(code).ok_or(RegistryError::NotFound)?;
        Ok(LinkStats {
            target_url: record.target_url.clone(),
            click_count: record.clicks.load(Ordering::Relaxed),
        })
    }

    // oldest first
    pub fn list_all(&self) -> Vec<ShortLink> {
        self.links.read().records.iter().map(Record::snapshot).collect()
    }

    pub fn recent(&self, limit: usize) -> Vec<ShortLink> {
        self.links
            .read()
            .records
            .iter()
            .rev()
            .take(limit)
            .map(Record::snapshot)
            .collect()
    }

    pub fn totals(&self) -> Totals {
        let links = self.links.read();
        Totals {
            links: links.records.len(),
            clicks: links
                .records
                .iter()
                .map(|record| record.clicks.load(Ordering::Relaxed))
                .sum(),
        }
    }

    pub fn len(&self) -> usize {
        self.links.read().records.len()
    }
}
