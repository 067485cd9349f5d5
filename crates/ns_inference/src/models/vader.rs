//! Lexicon and rule based sentiment scoring with VADER (Hutto & Gilbert,
//! 2014), following the NLTK `SentimentIntensityAnalyzer`.
//!
//! Each token found in the lexicon contributes its valence, adjusted for
//! preceding boosters and dampeners, negations, ALL-CAPS emphasis and
//! "but" contrast. The sum is amplified by `!`/`?` runs and squashed into
//! [-1, 1].

use std::collections::{HashMap, HashSet};
use std::fmt;

use lazy_static::lazy_static;

use super::{PolarityScores, SentimentModel};

const B_INCR: f64 = 0.293;
const B_DECR: f64 = -0.293;
/// Added to the valence of an ALL-CAPS word in mixed-case text.
const C_INCR: f64 = 0.733;
const N_SCALAR: f64 = -0.74;
const NORMALIZE_ALPHA: f64 = 15.0;

/// The published VADER lexicon, embedded as distributed.
const LEXICON_TXT: &str = include_str!("vader_lexicon.txt");

/// Punctuation runs peeled off either end of a token.
const PUNC_LIST: &[&str] = &[
    ".", "!", "?", ",", ";", ":", "-", "'", "\"", "!!", "!!!", "??", "???", "?!?", "!?!", "?!?!",
    "!?!?",
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't", "aren't",
    "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt", "havent",
    "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't", "isn't",
    "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not", "nothing",
    "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent", "oughtn't", "shan't",
    "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont", "wouldnt", "won't", "wouldn't",
    "rarely", "seldom", "despite",
];

const BOOSTERS: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "considerably", "decidedly", "deeply",
    "effing", "enormously", "entirely", "especially", "exceptionally", "extremely", "fabulously",
    "flipping", "flippin", "fricking", "frickin", "frigging", "friggin", "fully", "fucking",
    "greatly", "hella", "highly", "hugely", "incredibly", "intensely", "majorly", "more", "most",
    "particularly", "purely", "quite", "really", "remarkably", "so", "substantially",
    "thoroughly", "totally", "tremendously", "uber", "unbelievably", "unusually", "utterly",
    "very",
];

const DAMPENERS: &[&str] = &[
    "almost", "barely", "hardly", "just enough", "kind of", "kinda", "kindof", "kind-of", "less",
    "little", "marginally", "occasionally", "partly", "scarcely", "slightly", "somewhat",
    "sort of", "sorta", "sortof", "sort-of",
];

lazy_static! {
    static ref LEXICON: HashMap<String, f64> = parse_lexicon(LEXICON_TXT);
    static ref NEGATE: HashSet<&'static str> = NEGATIONS.iter().copied().collect();
    static ref BOOSTER_DICT: HashMap<&'static str, f64> = BOOSTERS
        .iter()
        .map(|&w| (w, B_INCR))
        .chain(DAMPENERS.iter().map(|&w| (w, B_DECR)))
        .collect();
    static ref SPECIAL_CASE_IDIOMS: HashMap<&'static str, f64> = HashMap::from([
        ("the shit", 3.0),
        ("the bomb", 3.0),
        ("bad ass", 1.5),
        ("yeah right", -2.0),
        ("cut the mustard", 2.0),
        ("kiss of death", -1.5),
        ("hand to mouth", -2.0),
    ]);
}

/// Parses `token<TAB>valence[<TAB>...]` lines. Later duplicates win and
/// malformed lines are ignored.
fn parse_lexicon(raw: &str) -> HashMap<String, f64> {
    raw.lines()
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let token = fields.next().filter(|t| !t.is_empty())?;
            let valence = fields.next()?.trim().parse::<f64>().ok()?;
            Some((token.to_string(), valence))
        })
        .collect()
}

/// True when the word has cased letters and all of them are upper case.
fn is_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn is_negation(word: &str) -> bool {
    let lower = word.to_lowercase();
    NEGATE.contains(lower.as_str()) || lower.contains("n't")
}

/// Splits on whitespace, drops one-character tokens and peels a
/// punctuation run off a token when what remains is a word of the text.
/// Emoticons such as `:)` survive untouched.
fn tokenize(text: &str) -> Vec<&str> {
    let bare: String = text.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let words: HashSet<&str> = bare
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .collect();

    text.split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(|token| {
            let trailing = PUNC_LIST.iter().filter_map(|p| token.strip_suffix(p));
            let leading = PUNC_LIST.iter().filter_map(|p| token.strip_prefix(p));
            trailing.chain(leading).find(|w| words.contains(*w)).unwrap_or(token)
        })
        .collect()
}

fn normalize(score: f64) -> f64 {
    (score / (score * score + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn punctuation_amplifier(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64 * 0.292;
    let questions = match text.matches('?').count() {
        0 | 1 => 0.0,
        n @ 2..=3 => n as f64 * 0.18,
        _ => 0.96,
    };
    exclamations + questions
}

/// Booster or dampener contribution of `word` to a neighbouring valence.
fn scalar_inc_dec(word: &str, valence: f64, cap_differential: bool) -> f64 {
    let Some(&base) = BOOSTER_DICT.get(word.to_lowercase().as_str()) else {
        return 0.0;
    };
    let mut scalar = if valence < 0.0 { -base } else { base };
    if is_upper(word) && cap_differential {
        scalar += if valence > 0.0 { C_INCR } else { -C_INCR };
    }
    scalar
}

/// Tokenized text with the context the valence rules need.
struct SentiText<'a> {
    words: Vec<&'a str>,
    lower: Vec<String>,
    /// Some, but not all, words are in ALL CAPS.
    cap_differential: bool,
}

impl<'a> SentiText<'a> {
    fn new(text: &'a str) -> Self {
        let words = tokenize(text);
        let lower = words.iter().map(|w| w.to_lowercase()).collect();
        let caps = words.iter().filter(|w| is_upper(w)).count();
        let differential = words.len() - caps;
        Self {
            cap_differential: differential > 0 && differential < words.len(),
            words,
            lower,
        }
    }
}

/// VADER scorer over the embedded lexicon, optionally with per-word
/// valence overrides.
#[derive(Clone, Default)]
pub struct VaderModel {
    overrides: HashMap<String, f64>,
}

impl fmt::Debug for VaderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaderModel")
            .field("lexicon_size", &LEXICON.len())
            .field("overrides", &self.overrides.len())
            .finish()
    }
}

impl VaderModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores `word` with `valence` instead of its lexicon entry, adding
    /// it when the lexicon has none.
    pub fn with_overrides<'a>(overrides: impl IntoIterator<Item = (&'a String, &'a f64)>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(word, &valence)| (word.to_lowercase(), valence))
                .collect(),
        }
    }

    fn valence_of(&self, word: &str) -> Option<f64> {
        self.overrides.get(word).or_else(|| LEXICON.get(word)).copied()
    }

    fn in_lexicon(&self, word: &str) -> bool {
        self.valence_of(word).is_some()
    }

    fn word_valence(&self, text: &SentiText<'_>, i: usize) -> f64 {
        let lower = &text.lower;
        let Some(mut valence) = self.valence_of(&lower[i]) else {
            return 0.0;
        };

        if is_upper(text.words[i]) && text.cap_differential {
            valence += if valence > 0.0 { C_INCR } else { -C_INCR };
        }

        for start in 0..3 {
            if i > start && !self.in_lexicon(&lower[i - start - 1]) {
                let mut scalar = scalar_inc_dec(text.words[i - start - 1], valence, text.cap_differential);
                if start == 1 {
                    scalar *= 0.95;
                } else if start == 2 {
                    scalar *= 0.9;
                }
                valence += scalar;
                valence = negation_check(valence, &text.words, start, i);
                if start == 2 {
                    valence = idioms_check(valence, &text.words, i);
                }
            }
        }

        self.least_check(valence, lower, i)
    }

    /// "least" flips the valence unless it reads "at least" or "very least".
    fn least_check(&self, valence: f64, lower: &[String], i: usize) -> f64 {
        if i == 0 || lower[i - 1] != "least" || self.in_lexicon(&lower[i - 1]) {
            return valence;
        }
        if i > 1 && matches!(lower[i - 2].as_str(), "at" | "very") {
            valence
        } else {
            valence * N_SCALAR
        }
    }

    fn score_valence(sentiments: &[f64], text: &str) -> PolarityScores {
        if sentiments.is_empty() {
            return PolarityScores::default();
        }

        let amplifier = punctuation_amplifier(text);
        let mut sum: f64 = sentiments.iter().sum();
        if sum > 0.0 {
            sum += amplifier;
        } else if sum < 0.0 {
            sum -= amplifier;
        }
        let compound = normalize(sum);

        let mut pos_sum = 0.0;
        let mut neg_sum = 0.0;
        let mut neu_count = 0.0;
        for &s in sentiments {
            if s > 0.0 {
                pos_sum += s + 1.0;
            } else if s < 0.0 {
                neg_sum += s - 1.0;
            } else {
                neu_count += 1.0;
            }
        }
        if pos_sum > neg_sum.abs() {
            pos_sum += amplifier;
        } else if pos_sum < neg_sum.abs() {
            neg_sum -= amplifier;
        }

        let total = pos_sum + neg_sum.abs() + neu_count;
        PolarityScores {
            neg: round_to((neg_sum / total).abs(), 3),
            neu: round_to((neu_count / total).abs(), 3),
            pos: round_to((pos_sum / total).abs(), 3),
            compound: round_to(compound, 4),
        }
    }
}

fn negation_check(valence: f64, words: &[&str], start: usize, i: usize) -> f64 {
    let before = |n: usize| words[i - n];
    let so_or_this = |n: usize| matches!(before(n), "so" | "this");
    match start {
        0 if is_negation(before(1)) => valence * N_SCALAR,
        1 if before(2) == "never" && so_or_this(1) => valence * 1.25,
        1 if is_negation(before(2)) => valence * N_SCALAR,
        2 if (before(3) == "never" && so_or_this(2)) || so_or_this(1) => valence * 1.25,
        2 if is_negation(before(3)) => valence * N_SCALAR,
        _ => valence,
    }
}

/// Idioms around position `i` replace its valence; a dampening bigram
/// such as "kind of" in front of it lowers it.
fn idioms_check(valence: f64, words: &[&str], i: usize) -> f64 {
    let phrase = |from: usize, to: usize| words[from..to].join(" ");
    let mut valence = valence;

    let behind = [
        phrase(i - 1, i + 1),
        phrase(i - 2, i + 1),
        phrase(i - 2, i),
        phrase(i - 3, i),
        phrase(i - 3, i - 1),
    ];
    if let Some(&idiom) = behind.iter().find_map(|seq| SPECIAL_CASE_IDIOMS.get(seq.as_str())) {
        valence = idiom;
    }
    for len in [2, 3] {
        if i + len <= words.len() {
            if let Some(&idiom) = SPECIAL_CASE_IDIOMS.get(phrase(i, i + len).as_str()) {
                valence = idiom;
            }
        }
    }

    if BOOSTER_DICT.contains_key(phrase(i - 3, i - 1).as_str())
        || BOOSTER_DICT.contains_key(phrase(i - 2, i).as_str())
    {
        valence += B_DECR;
    }
    valence
}

impl SentimentModel for VaderModel {
    fn name(&self) -> &str {
        "vader"
    }

    fn polarity_scores(&self, text: &str) -> PolarityScores {
        let senti = SentiText::new(text);
        let lower = &senti.lower;

        let mut sentiments = Vec::with_capacity(lower.len());
        for i in 0..lower.len() {
            let is_modifier = BOOSTER_DICT.contains_key(lower[i].as_str())
                || (lower[i] == "kind" && lower.get(i + 1).map(String::as_str) == Some("of"));
            if is_modifier {
                sentiments.push(0.0);
            } else {
                sentiments.push(self.word_valence(&senti, i));
            }
        }

        // Contrast: what follows "but" outweighs what precedes it.
        if let Some(but) = lower.iter().position(|w| w == "but") {
            for (idx, sentiment) in sentiments.iter_mut().enumerate() {
                if idx < but {
                    *sentiment *= 0.5;
                } else if idx > but {
                    *sentiment *= 1.5;
                }
            }
        }

        Self::score_valence(&sentiments, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ns_core::SentimentLabel;
    use std::collections::BTreeMap;

    fn compound(text: &str) -> f64 {
        VaderModel::new().compound(text)
    }

    #[test]
    fn test_lexicon_is_embedded() {
        assert!(LEXICON.len() > 7000);
        assert_eq!(LEXICON.get("cheered"), Some(&2.3));
        assert_eq!(LEXICON.get("devastated"), Some(&-3.0));
        assert!(!LEXICON.contains_key("surge"));
    }

    #[test]
    fn test_parse_lexicon_skips_malformed_lines() {
        let lexicon = parse_lexicon("good\t1.9\t0.9\t[2, 2]\nbroken\n\nbad\tx\n:D\t2.3\ngood\t2.0\n");
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.get(":D"), Some(&2.3));
        assert_eq!(lexicon.get("good"), Some(&2.0));
    }

    #[test]
    fn test_tokenize_strips_edge_punctuation() {
        assert_eq!(tokenize("Wow, good!!! I'll see :) a"), vec!["Wow", "good", "I'll", "see", ":)"]);
        assert_eq!(tokenize("(good)"), vec!["(good)"]);
    }

    #[test]
    fn test_blank_text_is_neutral() {
        assert_eq!(compound(""), 0.0);
        assert_eq!(compound("   \n\t"), 0.0);
        assert_eq!(VaderModel::new().polarity_scores(""), PolarityScores::default());
    }

    #[test]
    fn test_matches_published_scores() {
        let cases = [
            ("The book was good.", 0.4404),
            ("VADER is smart, handsome, and funny.", 0.8316),
            ("VADER is smart, handsome, and funny!", 0.8439),
            ("VADER is very smart, handsome, and funny.", 0.8545),
            ("VADER is VERY SMART, handsome, and FUNNY.", 0.9227),
            ("VADER is VERY SMART, handsome, and FUNNY!!!", 0.9342),
            ("VADER is VERY SMART, uber handsome, and FRIGGIN FUNNY!!!", 0.9469),
            ("VADER is not smart, handsome, nor funny.", -0.7424),
            ("At least it isn't a horrible book.", 0.431),
            ("The book was only kind of good.", 0.3832),
            ("The plot was good, but the characters are uncompelling and the dialog is not great.", -0.7042),
            ("Today sux", -0.3612),
            ("Today sux!", -0.4199),
            ("Today SUX!", -0.5461),
            ("Today only kinda sux! But I'll get by, lol", 0.5249),
            ("Make sure you :) or :D today!", 0.8633),
            ("Not bad at all", 0.431),
            ("Is this good??", 0.504),
            ("the least successful year", -0.4717),
            ("The hostages were freed and families rejoiced", 0.6908),
            ("Officials raised concerns about corruption", 0.0),
            ("Shares tumbled as the bank collapsed", 0.0258),
            ("Markets surge after election", 0.0),
        ];
        let model = VaderModel::new();
        for (text, expected) in cases {
            let actual = model.compound(text);
            assert!((actual - expected).abs() < 1e-4, "{:?}: expected {}, got {}", text, expected, actual);
        }
    }

    #[test]
    fn test_overrides_extend_the_lexicon() {
        let overrides = BTreeMap::from([("Surge".to_string(), 1.2), ("good".to_string(), -1.0)]);
        let model = VaderModel::with_overrides(&overrides);
        // 1.2 / sqrt(1.2^2 + 15)
        assert_eq!(model.compound("Markets surge after election"), 0.296);
        assert!(model.compound("The book was good.") < 0.0);
        assert_eq!(VaderModel::new().compound("The book was good."), 0.4404);
    }

    #[test]
    fn test_headline_polarity() {
        assert!(compound("Investors cheered the outcome.") >= 0.05);
        assert!(compound("Economy faces uncertainty") <= -0.05);
        assert!(compound("Analysts warned of volatility.") <= -0.05);
    }

    #[test]
    fn test_negation_flips_sign() {
        assert!(compound("The plan is good") > 0.0);
        assert!(compound("The plan is not good") < 0.0);
        assert!(compound("The plan isn't very good") < 0.0);
        assert!(compound("The economy is never so good") > compound("The economy is good"));
    }

    #[test]
    fn test_boosters_dampeners_and_caps() {
        let plain = compound("The result was good");
        assert!(compound("The result was very good") > plain);
        assert!(compound("The result was slightly good") < plain);
        assert!(compound("The result was GOOD") > plain);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        assert!(compound("The food was good but the service was terrible") < 0.0);
        assert!(compound("The service was terrible but the food was good") > 0.0);
    }

    #[test]
    fn test_punctuation_amplifies() {
        assert!(compound("Great win!!!") > compound("Great win"));
        assert!(compound("Terrible loss!!") < compound("Terrible loss"));
    }

    #[test]
    fn test_least() {
        assert!(compound("the least successful year") < 0.0);
        assert!(compound("at least successful") > 0.0);
    }

    #[test]
    fn test_idioms() {
        // "the bomb" reads as praise despite the lexicon's negative "bomb".
        assert!(compound("Today was the bomb") > 0.5);
        assert!(compound("A bomb exploded") < 0.0);
    }

    #[test]
    fn test_scores_are_deterministic_and_bounded() {
        let model = VaderModel::new();
        let text = "War, crisis and terror!!! Deadly violence, tragic deaths and brutal attacks";
        let first = model.polarity_scores(text);
        assert_eq!(first, model.polarity_scores(text));
        assert!(first.compound >= -1.0 && first.compound < -0.9);
        assert_eq!(SentimentLabel::from_score(first.compound), SentimentLabel::Negative);
        assert!((first.neg + first.neu + first.pos - 1.0).abs() < 0.01);
    }
}
