use crate::{FilterError, Result};
use std::collections::BTreeMap;

/// The two classes a relevance classifier separates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Nonrelevant = 0,
    Relevant = 1,
}

impl Class {
    const ALL: [Class; 2] = [Class::Nonrelevant, Class::Relevant];

    fn index(self) -> usize {
        self as usize
    }
}

/// Incrementally trained multinomial naive Bayes text model.
///
/// Every update adds `weight` to the class prior and `weight * count` to the
/// class-conditional count of each token. Probabilities use additive
/// (Laplace) smoothing with the configured pseudo-count. The model is never
/// rebuilt: it only grows through [`MultinomialModel::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct MultinomialModel {
    laplace: f64,
    class_weight: [f64; 2],
    words_per_class: [f64; 2],
    word_counts: BTreeMap<String, [f64; 2]>,
}

impl MultinomialModel {
    pub fn new(laplace: f64) -> Self {
        Self {
            laplace,
            class_weight: [0.0; 2],
            words_per_class: [0.0; 2],
            word_counts: BTreeMap::new(),
        }
    }

    /// Absorb one weighted training document. On error the model is untouched.
    pub fn update(&mut self, bag: &BTreeMap<String, f64>, class: Class, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(FilterError::ModelUpdate(format!("invalid instance weight {weight}")));
        }
        if let Some((token, count)) = bag.iter().find(|(_, c)| !c.is_finite() || **c < 0.0) {
            return Err(FilterError::ModelUpdate(format!("invalid count {count} for token {token:?}")));
        }
        let added: f64 = bag.values().map(|c| c * weight).sum();
        let c = class.index();
        if !(self.class_weight[c] + weight).is_finite() || !(self.words_per_class[c] + added).is_finite() {
            return Err(FilterError::ModelUpdate("class totals overflowed".into()));
        }

        self.class_weight[c] += weight;
        self.words_per_class[c] += added;
        for (token, count) in bag {
            self.word_counts.entry(token.clone()).or_insert([0.0; 2])[c] += count * weight;
        }
        Ok(())
    }

    /// Log posterior (up to a shared constant) for each class, indexed by
    /// `Class as usize`. Tokens the model has never seen are ignored.
    pub fn log_posteriors(&self, bag: &BTreeMap<String, f64>) -> Result<[f64; 2]> {
        let total: f64 = self.class_weight.iter().sum();
        if total <= 0.0 {
            return Err(FilterError::Classification("model has no training data".into()));
        }
        let vocabulary = self.word_counts.len() as f64;
        let mut scores = [0.0; 2];
        for class in Class::ALL {
            let c = class.index();
            let mut score = ((self.class_weight[c] + self.laplace) / (total + 2.0 * self.laplace)).ln();
            let denominator = self.words_per_class[c] + self.laplace * vocabulary;
            for (token, count) in bag {
                if let Some(counts) = self.word_counts.get(token) {
                    score += count * ((counts[c] + self.laplace) / denominator).ln();
                }
            }
            if !score.is_finite() {
                return Err(FilterError::Classification(format!("non-finite score for {class:?}")));
            }
            scores[c] = score;
        }
        Ok(scores)
    }

    /// Most probable class. Ties go to [`Class::Nonrelevant`].
    pub fn classify(&self, bag: &BTreeMap<String, f64>) -> Result<Class> {
        let scores = self.log_posteriors(bag)?;
        if scores[Class::Relevant.index()] > scores[Class::Nonrelevant.index()] {
            Ok(Class::Relevant)
        } else {
            Ok(Class::Nonrelevant)
        }
    }

    /// Sum of instance weights seen for `class`.
    pub fn class_weight(&self, class: Class) -> f64 {
        self.class_weight[class.index()]
    }

    /// Weighted occurrences of `token` in `class` documents.
    pub fn token_weight(&self, token: &str, class: Class) -> f64 {
        self.word_counts.get(token).map_or(0.0, |c| c[class.index()])
    }

    pub fn vocabulary_len(&self) -> usize {
        self.word_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_weight.iter().all(|w| *w == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::bag_of_words;

    #[test]
    fn empty_model_cannot_classify() {
        let model = MultinomialModel::new(1.0);
        assert!(matches!(
            model.classify(&bag_of_words("anything")),
            Err(FilterError::Classification(_))
        ));
    }

    #[test]
    fn learns_to_separate_vocabularies() {
        let mut model = MultinomialModel::new(1.0);
        model.update(&bag_of_words("apple harvest orchard"), Class::Relevant, 1.0).unwrap();
        model.update(&bag_of_words("football score match"), Class::Nonrelevant, 1.0).unwrap();
        assert_eq!(model.classify(&bag_of_words("the apple orchard")).unwrap(), Class::Relevant);
        assert_eq!(model.classify(&bag_of_words("match score today")).unwrap(), Class::Nonrelevant);
    }

    #[test]
    fn weights_scale_counts() {
        let mut model = MultinomialModel::new(1.0);
        model.update(&bag_of_words("apple apple"), Class::Relevant, 4.0).unwrap();
        assert_eq!(model.token_weight("apple", Class::Relevant), 8.0);
        assert_eq!(model.class_weight(Class::Relevant), 4.0);
        assert_eq!(model.token_weight("apple", Class::Nonrelevant), 0.0);
    }

    #[test]
    fn rejected_update_leaves_model_unchanged() {
        let mut model = MultinomialModel::new(1.0);
        model.update(&bag_of_words("apple"), Class::Relevant, 1.0).unwrap();
        let before = model.clone();
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(model.update(&bag_of_words("banana"), Class::Nonrelevant, weight).is_err());
        }
        assert_eq!(model, before);
    }
}
