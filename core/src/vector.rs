use std::collections::BTreeMap;

/// Sparse term weights with a cached total weight.
///
/// Entries live in a `BTreeMap` so iteration, and therefore every floating
/// point sum, happens in the same order on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    weights: BTreeMap<String, f64>,
    total: f64,
}

impl TermVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every distinct term gets weight 1.
    pub fn presence<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let weights = terms.into_iter().map(|t| (t.into(), 1.0)).collect();
        Self::from_weights(weights)
    }

    /// Each occurrence of a term adds 1 to its weight.
    pub fn frequencies<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut weights = BTreeMap::new();
        for term in terms {
            *weights.entry(term.into()).or_insert(0.0) += 1.0;
        }
        Self::from_weights(weights)
    }

    fn from_weights(weights: BTreeMap<String, f64>) -> Self {
        let mut v = Self { weights, total: 0.0 };
        v.recompute_total();
        v
    }

    pub fn add(&mut self, term: &str, delta: f64) {
        match self.weights.get_mut(term) {
            Some(w) => *w += delta,
            None => {
                self.weights.insert(term.to_string(), delta);
            }
        }
        self.recompute_total();
    }

    /// Add every entry of `source`, multiplied by `factor`.
    pub fn scale_and_merge(&mut self, source: &TermVector, factor: f64) {
        for (term, weight) in &source.weights {
            *self.weights.entry(term.clone()).or_insert(0.0) += weight * factor;
        }
        self.recompute_total();
    }

    /// Negative weights become zero. Entries are never removed.
    pub fn clip_negative(&mut self) {
        for w in self.weights.values_mut() {
            if *w < 0.0 {
                *w = 0.0;
            }
        }
        self.recompute_total();
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    /// Weight of `term`, 0 when absent.
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.weights.contains_key(term)
    }

    /// Sum of the weights of the given terms that occur in this vector.
    /// Callers pass distinct terms; a repeated term counts each time.
    pub fn score<'a, I>(&self, terms: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        terms.into_iter().filter_map(|t| self.weights.get(t)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Entries by descending weight, ties broken by term.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    fn recompute_total(&mut self) {
        self.total = self.weights.values().sum();
    }
}
