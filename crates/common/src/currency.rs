use std::collections::BTreeMap;

/// Symbols recognised out of the box, as rendered by storefronts
const DEFAULT_SYMBOLS: [(&str, &str); 21] = [
    ("₹", "INR"),
    ("$", "USD"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("C$", "CAD"),
    ("A$", "AUD"),
    ("CHF", "CHF"),
    ("HK$", "HKD"),
    ("S$", "SGD"),
    ("₩", "KRW"),
    ("R$", "BRL"),
    ("RUB", "RUB"),
    ("₱", "PHP"),
    ("MX$", "MXN"),
    ("NZ$", "NZD"),
    ("ZAR", "ZAR"),
    ("₺", "TRY"),
    ("₪", "ILS"),
    ("د.إ", "AED"),
    ("kr", "SEK"),
];

/// Maps the currency glyph next to a price to an ISO currency code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    entries: BTreeMap<String, String>,
}

impl SymbolTable {
    /// Default table extended (or overridden) by `extra`
    pub fn with_overrides<'a>(extra: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut table = Self::default();
        for (symbol, code) in extra {
            table.insert(symbol, code);
        }
        table
    }

    pub fn insert(&mut self, symbol: &str, code: &str) {
        self.entries
            .insert(symbol.trim().to_string(), code.trim().to_ascii_uppercase());
    }

    /// Exact lookup of a trimmed symbol
    pub fn code_for(&self, symbol: &str) -> Option<&str> {
        self.entries.get(symbol.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        let entries = DEFAULT_SYMBOLS
            .iter()
            .map(|(symbol, code)| (symbol.to_string(), code.to_string()))
            .collect();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_lookup() {
        let table = SymbolTable::default();
        assert_eq!(table.len(), DEFAULT_SYMBOLS.len());
        assert_eq!(table.code_for("₹"), Some("INR"));
        assert_eq!(table.code_for(" $ "), Some("USD"));
        assert_eq!(table.code_for("HK$"), Some("HKD"));
        assert_eq!(table.code_for("د.إ"), Some("AED"));
    }

    #[test]
    fn test_unmapped_symbols() {
        let table = SymbolTable::default();
        assert!(table.code_for("zł").is_none());
        assert!(table.code_for("").is_none());
        // Lookups are exact, not case-folded
        assert!(table.code_for("KR").is_none());
    }

    #[test]
    fn test_overrides_extend_and_replace() {
        let mut extra = BTreeMap::new();
        extra.insert("zł".to_string(), "pln".to_string());
        extra.insert("$".to_string(), "CAD".to_string());

        let table = SymbolTable::with_overrides(&extra);
        assert_eq!(table.code_for("zł"), Some("PLN"));
        assert_eq!(table.code_for("$"), Some("CAD"));
        assert_eq!(table.len(), DEFAULT_SYMBOLS.len() + 1);
    }
}
