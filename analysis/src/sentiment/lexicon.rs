//! # Lexicon Scorer
//!
//! Rule-based sentiment in the style of valence-aware lexicon scorers:
//! word valences on a -4..+4 scale, adjusted for boosters, negation,
//! capitalisation, contrastive "but" and exclamation marks, then squashed
//! into a compound score in [-1, 1].

use super::SentimentScorer;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Booster/dampener step applied to the next sentiment word.
const BOOST_INCREMENT: f64 = 0.293;
/// Extra valence for an ALL-CAPS sentiment word in otherwise mixed-case text.
const CAPS_INCREMENT: f64 = 0.733;
/// Negated valences flip sign and lose some strength.
const NEGATION_SCALAR: f64 = -0.74;
/// Per exclamation mark, counted up to four.
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
/// Normalisation constant of the compound score.
const ALPHA: f64 = 15.0;
/// How many preceding tokens can boost or negate a sentiment word.
const LOOKBACK: usize = 3;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("comfortable", 1.5),
    ("cool", 1.3),
    ("easy", 1.9),
    ("effective", 2.1),
    ("efficient", 1.8),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("fantastic", 2.6),
    ("fine", 0.8),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("impressed", 2.1),
    ("impressive", 2.3),
    ("improved", 2.1),
    ("interesting", 1.7),
    ("like", 1.5),
    ("liked", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("perfectly", 3.2),
    ("pleased", 1.9),
    ("recommend", 1.5),
    ("recommended", 1.6),
    ("reliable", 1.9),
    ("responsive", 1.5),
    ("satisfied", 1.8),
    ("smooth", 1.3),
    ("solid", 1.4),
    ("strong", 2.3),
    ("super", 2.9),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("useful", 1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worth", 0.9),
    ("wow", 2.8),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("broke", -1.8),
    ("broken", -1.6),
    ("complaint", -1.7),
    ("corroded", -1.4),
    ("crap", -1.6),
    ("damage", -2.2),
    ("damaged", -1.9),
    ("dead", -3.3),
    ("defective", -1.9),
    ("died", -2.6),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("dislike", -1.6),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("faulty", -1.8),
    ("frustrated", -2.4),
    ("frustrating", -1.9),
    ("garbage", -2.1),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("junk", -1.9),
    ("leak", -1.4),
    ("leaking", -1.5),
    ("lost", -1.3),
    ("mess", -1.5),
    ("overpriced", -1.6),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("regret", -1.9),
    ("sad", -2.1),
    ("scam", -2.7),
    ("stuck", -1.3),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("unhappy", -1.8),
    ("unreliable", -1.8),
    ("useless", -1.8),
    ("waste", -1.8),
    ("weak", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
];

const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", BOOST_INCREMENT),
    ("completely", BOOST_INCREMENT),
    ("especially", BOOST_INCREMENT),
    ("extremely", BOOST_INCREMENT),
    ("highly", BOOST_INCREMENT),
    ("incredibly", BOOST_INCREMENT),
    ("really", BOOST_INCREMENT),
    ("so", BOOST_INCREMENT),
    ("totally", BOOST_INCREMENT),
    ("very", BOOST_INCREMENT),
    ("barely", -BOOST_INCREMENT),
    ("kinda", -BOOST_INCREMENT),
    ("marginally", -BOOST_INCREMENT),
    ("partly", -BOOST_INCREMENT),
    ("slightly", -BOOST_INCREMENT),
    ("somewhat", -BOOST_INCREMENT),
];

const NEGATIONS: &[&str] = &[
    "aint", "cannot", "cant", "dont", "doesnt", "didnt", "hardly", "isnt", "lack", "lacks",
    "neither", "never", "no", "nobody", "none", "nor", "not", "nothing", "nowhere", "wasnt",
    "without", "wont", "wouldnt",
];

struct Token<'a> {
    raw: &'a str,
    lower: String,
}

impl Token<'_> {
    fn is_shouted(&self) -> bool {
        self.raw.chars().filter(|c| c.is_alphabetic()).count() > 1
            && !self.raw.chars().any(|c| c.is_lowercase())
    }
}

/// Built-in lexicon scorer.
pub struct LexiconScorer {
    valences: HashMap<&'static str, f64>,
    boosters: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
    token_pattern: Regex,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            valences: POSITIVE_WORDS
                .iter()
                .chain(NEGATIVE_WORDS.iter())
                .copied()
                .collect(),
            boosters: BOOSTERS.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
            token_pattern: Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*")
                .expect("token pattern is a valid regex"),
        }
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        self.token_pattern
            .find_iter(text)
            .map(|m| Token {
                raw: m.as_str(),
                lower: m.as_str().to_lowercase().replace('’', "'"),
            })
            .collect()
    }

    fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word.replace('\'', "").as_str()) || word.ends_with("n't")
    }

    /// Sum of the adjusted valences, before normalisation.
    fn raw_sum(&self, text: &str) -> f64 {
        let tokens = self.tokenize(text);
        let shouted = tokens.iter().filter(|t| t.is_shouted()).count();
        let caps_differ = shouted > 0 && shouted < tokens.len();

        let mut valences: Vec<f64> = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.valences.get(token.lower.as_str()) else {
                valences.push(0.0);
                continue;
            };

            let direction = base.signum();
            let mut valence = base;
            if caps_differ && token.is_shouted() {
                valence += direction * CAPS_INCREMENT;
            }

            for distance in 1..=LOOKBACK.min(i) {
                let previous = &tokens[i - distance];
                if let Some(&step) = self.boosters.get(previous.lower.as_str()) {
                    let mut scalar = step * direction;
                    if caps_differ && previous.is_shouted() {
                        scalar += direction * CAPS_INCREMENT;
                    }
                    // Modifiers further away count for less.
                    scalar *= match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    valence += scalar;
                }
                if self.is_negation(&previous.lower) {
                    valence *= NEGATION_SCALAR;
                }
            }
            valences.push(valence);
        }

        // "X but Y": Y carries the opinion.
        if let Some(pivot) = tokens.iter().position(|t| t.lower == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let sum: f64 = valences.iter().sum();
        let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64;
        let emphasis = exclamations * EXCLAMATION_INCREMENT;
        if sum > 0.0 {
            sum + emphasis
        } else if sum < 0.0 {
            sum - emphasis
        } else {
            sum
        }
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> f64 {
        let sum = self.raw_sum(text);
        if sum == 0.0 || !sum.is_finite() {
            return 0.0;
        }
        (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}
