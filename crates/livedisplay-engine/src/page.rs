use crate::metrics::Fetcher;
use crate::{Error, Result};
use livedisplay_types::Icon;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// One row of a page: which producer to call and how to dress its value
#[derive(Clone)]
pub struct MetricDescriptor {
    fetcher: Arc<dyn Fetcher>,
    icon: Icon,
    args: Vec<Value>,
    prepend: String,
    append: String,
}

impl MetricDescriptor {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            icon: Icon::default(),
            args: Vec::new(),
            prepend: String::new(),
            append: String::new(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<Icon>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_prepend(mut self, prepend: impl Into<String>) -> Self {
        self.prepend = prepend.into();
        self
    }

    pub fn with_append(mut self, append: impl Into<String>) -> Self {
        self.append = append.into();
        self
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub fn fetcher_name(&self) -> &str {
        self.fetcher.name()
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn is_clock(&self) -> bool {
        self.fetcher.is_clock()
    }

    /// `prepend + value + append`
    pub fn decorate(&self, value: &str) -> String {
        format!("{}{}{}", self.prepend, value, self.append)
    }
}

impl fmt::Debug for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDescriptor")
            .field("fetcher", &self.fetcher.name())
            .field("icon", &self.icon)
            .field("args", &self.args)
            .field("prepend", &self.prepend)
            .field("append", &self.append)
            .finish()
    }
}

/// Descriptors for the first `rows` display rows; trailing rows are blank
#[derive(Debug, Clone)]
pub struct Page {
    metrics: Vec<MetricDescriptor>,
}

impl Page {
    pub fn new(mut metrics: Vec<MetricDescriptor>, rows: usize) -> Result<Self> {
        if metrics.is_empty() {
            return Err(Error::InvalidPage(
                "a page needs at least one metric".to_string(),
            ));
        }
        metrics.truncate(rows);
        Ok(Self { metrics })
    }

    pub fn get(&self, row: usize) -> Option<&MetricDescriptor> {
        self.metrics.get(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::StaticText;
    use serde_json::json;

    fn text(value: &str) -> MetricDescriptor {
        MetricDescriptor::new(Arc::new(StaticText)).with_args(vec![json!(value)])
    }

    #[test]
    fn test_empty_page_is_rejected() {
        assert!(matches!(Page::new(vec![], 4), Err(Error::InvalidPage(_))));
    }

    #[test]
    fn test_page_truncated_to_rows() -> Result<()> {
        let page = Page::new(vec![text("a"), text("b"), text("c")], 2)?;
        assert!(page.get(1).is_some());
        assert!(page.get(2).is_none());
        Ok(())
    }

    #[test]
    fn test_decorate_and_defaults() {
        let metric = text("x")
            .with_prepend("$")
            .with_append(" USD")
            .with_icon("WEATHER");
        assert_eq!(metric.decorate("12"), "$12 USD");
        assert!(metric.icon().is_weather());
        assert!(!metric.is_clock());
        assert_eq!(metric.fetcher_name(), "static");
    }
}
