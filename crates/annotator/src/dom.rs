use hours_common::PriceObservation;
use serde::{Deserialize, Serialize};

/// One price found on a page.
///
/// `whole`, `fraction` and `symbol` hold the text of the `price-whole`
/// element and its optional `price-fraction` / `price-symbol` siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceElement {
    pub id: usize,
    pub whole: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl PriceElement {
    pub fn observation(&self) -> PriceObservation {
        PriceObservation::new(
            self.symbol.clone().unwrap_or_default(),
            self.whole.clone(),
            self.fraction.clone(),
        )
    }
}

/// A label inserted right after a price element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub after: usize,
    pub text: String,
}

/// Page access needed by the annotator.
///
/// Implementations must leave the original price markup untouched;
/// `insert_after` only adds a new sibling node.
pub trait PriceDom {
    fn price_elements(&self) -> Vec<PriceElement>;
    fn insert_after(&mut self, element_id: usize, text: String);
}

/// Serializable snapshot of a page's price markup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub elements: Vec<PriceElement>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl SnapshotDom {
    pub fn new(elements: Vec<PriceElement>) -> Self {
        Self {
            url: None,
            elements,
            annotations: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Labels inserted after `element_id`, in insertion order
    pub fn annotations_for(&self, element_id: usize) -> Vec<&str> {
        self.annotations
            .iter()
            .filter(|a| a.after == element_id)
            .map(|a| a.text.as_str())
            .collect()
    }
}

impl PriceDom for SnapshotDom {
    fn price_elements(&self) -> Vec<PriceElement> {
        self.elements.clone()
    }

    fn insert_after(&mut self, element_id: usize, text: String) {
        self.annotations.push(Annotation {
            after: element_id,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let dom = SnapshotDom::from_json(
            r#"{
                "url": "https://shop.example/item",
                "elements": [
                    { "id": 0, "whole": "1,299.", "fraction": "00", "symbol": "₹" },
                    { "id": 1, "whole": "15" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(dom.elements.len(), 2);
        assert!(dom.annotations.is_empty());
        assert_eq!(dom.elements[1].symbol, None);
        assert_eq!(dom.elements[0].observation().price(), Some(1299.0));
    }

    #[test]
    fn test_insert_after_keeps_elements() {
        let original = vec![PriceElement {
            id: 7,
            whole: "10".into(),
            fraction: None,
            symbol: Some("$".into()),
        }];
        let mut dom = SnapshotDom::new(original.clone());

        dom.insert_after(7, " (1.00 hrs)".into());

        assert_eq!(dom.elements, original);
        assert_eq!(dom.annotations_for(7), vec![" (1.00 hrs)"]);
        assert!(dom.annotations_for(8).is_empty());
    }

    #[test]
    fn test_missing_symbol_observes_empty() {
        let element = PriceElement {
            id: 0,
            whole: "5".into(),
            fraction: Some("50".into()),
            symbol: None,
        };
        let observation = element.observation();
        assert_eq!(observation.symbol, "");
        assert_eq!(observation.price(), Some(5.5));
    }
}
