use crate::dom::PriceDom;
use hours_common::SymbolTable;
use hours_rates::CurrencyConverter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatorOptions {
    /// Leave prices without a known rate unannotated instead of comparing
    /// their face value against the wage
    pub skip_unconverted: bool,
}

/// Outcome of one annotation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub annotated: usize,
    /// Annotated at face value because no rate was available
    pub unconverted: usize,
    pub skipped: usize,
}

/// Label text inserted after a price
pub fn hours_label(hours: f64) -> String {
    format!(" ({:.2} hrs)", hours)
}

/// Adds an "hours of work" label next to every price on a page
pub struct PriceAnnotator {
    converter: Arc<CurrencyConverter>,
    symbols: SymbolTable,
    options: AnnotatorOptions,
}

impl PriceAnnotator {
    pub fn new(converter: Arc<CurrencyConverter>, symbols: SymbolTable) -> Self {
        Self {
            converter,
            symbols,
            options: AnnotatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AnnotatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Annotate every price element of `dom` against a wage already
    /// expressed in the base currency.
    ///
    /// Prices are converted one at a time. A symbol missing from the table
    /// is taken to be the base currency.
    pub async fn annotate<D>(&self, dom: &mut D, normalized_wage: f64) -> AnnotationReport
    where
        D: PriceDom + ?Sized,
    {
        let elements = dom.price_elements();
        let mut report = AnnotationReport::default();

        if !normalized_wage.is_finite() || normalized_wage <= 0.0 {
            warn!("Refusing to annotate against a wage of {}", normalized_wage);
            report.skipped = elements.len();
            return report;
        }

        for element in elements {
            let observation = element.observation();
            let Some(mut price) = observation.price() else {
                debug!("Skipping price element {} with unreadable text {:?}", element.id, element.whole);
                report.skipped += 1;
                continue;
            };

            let foreign = self
                .symbols
                .code_for(&observation.symbol)
                .filter(|code| !self.converter.is_base(code));

            if let Some(code) = foreign {
                match self.converter.convert_from_base(1.0, code).await {
                    Some(per_base_unit) => price /= per_base_unit,
                    None if self.options.skip_unconverted => {
                        report.skipped += 1;
                        continue;
                    }
                    None => report.unconverted += 1,
                }
            }

            let hours = price / normalized_wage;
            dom.insert_after(element.id, hours_label(hours));
            report.annotated += 1;
        }

        info!(
            "Annotated {} prices ({} unconverted, {} skipped)",
            report.annotated, report.unconverted, report.skipped
        );
        report
    }
}
