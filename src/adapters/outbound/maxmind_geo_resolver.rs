//! MaxMind GeoIP Resolver
//!
//! Implements GeoResolver using a MaxMind GeoLite2/GeoIP2 Country database.

use crate::domain::entities::GeoMetadata;
use crate::domain::ports::GeoResolver;
use isocountry::CountryCode;
use maxminddb::Reader;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;

/// MaxMind GeoIP resolver.
///
/// Uses the MaxMind database to resolve IP addresses to a country code and
/// its English name.
pub struct MaxMindGeoResolver {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeoResolver {
    /// Load a GeoIP database from a file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Load a GeoIP database from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> anyhow::Result<Self> {
        let reader = Reader::from_source(bytes)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

impl GeoResolver for MaxMindGeoResolver {
    fn resolve(&self, ip: IpAddr) -> Option<GeoMetadata> {
        #[derive(Debug, Deserialize)]
        struct Country {
            iso_code: Option<String>,
            names: Option<BTreeMap<String, String>>,
        }

        #[derive(Debug, Deserialize)]
        struct CountryResp {
            country: Option<Country>,
        }

        let resp: CountryResp = self.reader.lookup(ip).ok()?;
        let country = resp.country?;
        let iso = country.iso_code?;

        let name = country
            .names
            .and_then(|mut names| names.remove("en"))
            .or_else(|| {
                CountryCode::for_alpha2(&iso)
                    .ok()
                    .map(|c| c.name().to_string())
            });

        Some(GeoMetadata {
            country_code: Some(iso),
            country_name: name,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_nonexistent() {
        let result = MaxMindGeoResolver::from_file("/nonexistent/path/GeoLite2.mmdb");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_bytes_garbage() {
        let result = MaxMindGeoResolver::from_bytes(b"definitely not an mmdb".to_vec());
        assert!(result.is_err());
    }

    #[test]
    fn test_from_bytes_empty() {
        assert!(MaxMindGeoResolver::from_bytes(Vec::new()).is_err());
    }

    #[test]
    fn test_resolver_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MaxMindGeoResolver>();
    }

    #[test]
    fn test_usable_as_trait_object() {
        fn accepts(_: Option<Arc<dyn GeoResolver>>) {}
        accepts(None);
    }
}
