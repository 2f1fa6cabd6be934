use crate::pool::CrawlSource;
use rand::Rng;
use std::sync::Arc;

/// Registered sources in registration order, with weighted random selection
#[derive(Debug, Clone, Default)]
pub struct SourceCollection {
    sources: Vec<Arc<CrawlSource>>,
}

impl SourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: Arc<CrawlSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CrawlSource>> {
        self.sources.iter()
    }

    /// Looks up a source by its id
    pub fn get(&self, id: usize) -> Option<&Arc<CrawlSource>> {
        self.sources.iter().find(|source| source.id() == id)
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.sources.iter().map(|source| source.weight()).sum()
    }

    /// Selects the source a draw in `[0, total_weight)` lands on
    ///
    /// Walks the sources in registration order and returns the first one whose
    /// cumulative weight exceeds `draw`. Each source thereby covers a slice of
    /// the range proportional to its weight.
    ///
    /// # Returns
    ///
    /// * `Some(source)` - The selected source
    /// * `None` - No sources, or `draw` outside `[0, total_weight)`
    pub fn pick(&self, draw: f64) -> Option<&Arc<CrawlSource>> {
        if draw.is_nan() || draw < 0.0 {
            return None;
        }

        let mut cumulative = 0.0;
        for source in &self.sources {
            cumulative += source.weight();
            if cumulative > draw {
                return Some(source);
            }
        }

        None
    }

    /// Selects a source with probability proportional to its weight
    ///
    /// Nothing is selected if the total weight is not a positive finite
    /// number.
    pub fn get_random(&self) -> Option<&Arc<CrawlSource>> {
        let total = self.total_weight();
        if !total.is_finite() || total <= 0.0 {
            if !self.sources.is_empty() {
                tracing::warn!("Cannot select a source, total weight is {}", total);
            }
            return None;
        }
        let draw = rand::rng().random::<f64>() * total;
        // rounding may push the draw onto the total
        self.pick(draw).or_else(|| self.sources.last())
    }
}
