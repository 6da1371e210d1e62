use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use crate::error::FlowError;

pub const DEFAULT_COUNTRY: &str = "UG";

static CALLING_CODES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    BTreeMap::from([
        ("BI", "257"),
        ("CD", "243"),
        ("DE", "49"),
        ("ET", "251"),
        ("FR", "33"),
        ("GB", "44"),
        ("GH", "233"),
        ("IN", "91"),
        ("KE", "254"),
        ("NG", "234"),
        ("RW", "250"),
        ("SS", "211"),
        ("TZ", "255"),
        ("UG", "256"),
        ("US", "1"),
        ("ZA", "27"),
    ])
});

/// Selected country shared between sessions and whatever UI picks it. Clones
/// observe the same selection. Only phone masks read it; it is never part of
/// a record.
#[derive(Debug, Clone)]
pub struct CountryContext {
    selected: Arc<RwLock<String>>,
}

impl Default for CountryContext {
    fn default() -> Self {
        Self {
            selected: Arc::new(RwLock::new(DEFAULT_COUNTRY.to_string())),
        }
    }
}

impl CountryContext {
    pub fn new(iso: &str) -> Result<Self, FlowError> {
        let context = Self::default();
        context.select(iso)?;
        Ok(context)
    }

    /// Switches the selected country. Unknown ISO codes are rejected and the
    /// previous selection stays in place.
    pub fn select(&self, iso: &str) -> Result<(), FlowError> {
        let iso = iso.trim().to_ascii_uppercase();
        if !CALLING_CODES.contains_key(iso.as_str()) {
            return Err(FlowError::UnknownCountry(iso));
        }
        let mut selected = self.selected.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = %*selected, to = %iso, "country selection changed");
        *selected = iso;
        Ok(())
    }

    pub fn selected(&self) -> String {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calling code of the selected country, digits only.
    pub fn calling_code(&self) -> Option<&'static str> {
        calling_code(&self.selected())
    }
}

pub fn calling_code(iso: &str) -> Option<&'static str> {
    CALLING_CODES.get(iso).copied()
}

pub fn known_countries() -> impl Iterator<Item = (&'static str, &'static str)> {
    CALLING_CODES.iter().map(|(iso, code)| (*iso, *code))
}
